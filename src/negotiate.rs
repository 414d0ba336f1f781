//! Response media type selection from an `Accept` header value.

use std::fmt;

/// Media types a report can be rendered as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    #[default]
    Json,
    Xml,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Json => "application/json",
            MediaType::Xml => "text/xml",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Choose the report media type for an `Accept` value.
///
/// Any mention of `xml`, in any case, selects XML; everything else, including
/// an absent header, gets JSON.
pub fn select(accept: Option<&str>) -> MediaType {
    match accept {
        Some(value) if value.to_ascii_lowercase().contains("xml") => MediaType::Xml,
        _ => MediaType::Json,
    }
}

/// Value of the `Accept` header among `headers`, matching the name in any case.
pub fn accept_header<'h, I>(headers: I) -> Option<&'h str>
where
    I: IntoIterator<Item = (&'h str, &'h str)>,
{
    headers
        .into_iter()
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("accept"))
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_json() {
        assert_eq!(select(None), MediaType::Json);
        assert_eq!(select(Some("")), MediaType::Json);
        assert_eq!(select(Some("*/*")), MediaType::Json);
        assert_eq!(select(Some("application/json")), MediaType::Json);
    }

    #[test]
    fn test_xml_indicator_selects_xml() {
        assert_eq!(select(Some("text/xml")), MediaType::Xml);
        assert_eq!(select(Some("application/XML")), MediaType::Xml);
        assert_eq!(
            select(Some("application/json;q=0.5, application/xhtml+xml")),
            MediaType::Xml
        );
    }

    #[test]
    fn test_media_type_strings() {
        assert_eq!(MediaType::Json.as_str(), "application/json");
        assert_eq!(MediaType::Xml.to_string(), "text/xml");
    }

    #[test]
    fn test_accept_header_lookup_ignores_case() {
        let headers = [("Content-Type", "text/plain"), ("ACCEPT", "text/xml")];
        assert_eq!(accept_header(headers), Some("text/xml"));

        let headers = [("accept", "application/json")];
        assert_eq!(select(accept_header(headers)), MediaType::Json);
    }

    #[test]
    fn test_missing_accept_header() {
        let headers = [("Host", "localhost")];
        assert_eq!(accept_header(headers), None);
        assert_eq!(select(accept_header(headers)), MediaType::Json);
    }
}
