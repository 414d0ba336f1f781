//! XHTML5 conformance through a Nu HTML Checker service.
//!
//! The XHTML embedded in an item is sent to the checker's JSON API and its
//! messages become findings. The checker is an external service; when it
//! cannot be reached the result is inconclusive rather than failed.

use async_trait::async_trait;
use libxml::tree::Node;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{StandardRunner, Target};
use crate::document::WrapperDocument;
use crate::http_client::AsyncHttpClient;
use crate::namespaces::{NamespaceQuery, XHTML_NS};
use crate::report::{Finding, Severity, ValidationResult};
use crate::standards::StandardName;

/// Locates XHTML content relative to the target
pub const HTML_QUERY: &str = ".//h:html";

/// Content type the checker expects for XHTML input
pub const XHTML_CONTENT_TYPE: &str = "application/xhtml+xml; charset=utf-8";

/// Response body of the checker's `out=json` API
#[derive(Debug, Deserialize)]
pub struct CheckerResponse {
    #[serde(default)]
    pub messages: Vec<CheckerMessage>,
}

#[derive(Debug, Deserialize)]
pub struct CheckerMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "subType")]
    pub sub_type: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "lastLine")]
    pub last_line: Option<u32>,
    #[serde(rename = "lastColumn")]
    pub last_column: Option<u32>,
}

pub struct HtmlRunner {
    http_client: AsyncHttpClient,
    endpoint: Option<String>,
}

impl HtmlRunner {
    pub fn new(http_client: AsyncHttpClient, endpoint: Option<String>) -> Self {
        Self {
            http_client,
            endpoint,
        }
    }

    /// The checker URL with JSON output requested
    pub fn request_url(endpoint: &str) -> String {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!("{endpoint}{separator}out=json")
    }
}

#[async_trait(?Send)]
impl StandardRunner for HtmlRunner {
    fn standard(&self) -> StandardName {
        StandardName::HTML
    }

    async fn run(&self, target: Target<'_>, item_id: Option<&str>) -> ValidationResult {
        let nodes = match target.select(HTML_QUERY) {
            Ok(nodes) => nodes,
            Err(e) => return ValidationResult::inconclusive(StandardName::HTML, item_id, e.to_string()),
        };
        let Some(html) = nodes.first() else {
            return ValidationResult::not_applicable(
                StandardName::HTML,
                item_id,
                "item contains no XHTML content",
            );
        };

        let Some(endpoint) = &self.endpoint else {
            return ValidationResult::inconclusive(
                StandardName::HTML,
                item_id,
                "no HTML checker endpoint configured",
            );
        };

        let body = checker_body(target.scope(), html);
        let url = Self::request_url(endpoint);
        debug!(url = %url, guid = item_id, bytes = body.len(), "posting XHTML to checker");

        let raw = match self
            .http_client
            .post_document(&url, &body, XHTML_CONTENT_TYPE)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(url = %url, error = %e, "HTML checker unavailable");
                return ValidationResult::inconclusive(StandardName::HTML, item_id, e.to_string());
            }
        };

        let response: CheckerResponse = match serde_json::from_slice(&raw) {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "unreadable HTML checker response");
                return ValidationResult::inconclusive(
                    StandardName::HTML,
                    item_id,
                    format!("unreadable checker response: {e}"),
                );
            }
        };

        match findings_from_response(&response) {
            Ok(findings) => ValidationResult::from_findings(StandardName::HTML, item_id, findings),
            Err(reason) => ValidationResult::inconclusive(StandardName::HTML, item_id, reason),
        }
    }
}

/// The document posted to the checker: a doctype followed by the XHTML
/// fragment, with prefixed XHTML moved onto the default namespace.
pub fn checker_body(scope: &NamespaceQuery<'_>, html: &Node) -> String {
    let prefixed = html
        .get_namespace()
        .is_some_and(|ns| !ns.get_prefix().is_empty());
    let xml = if prefixed {
        unprefixed_xhtml(scope, html).unwrap_or_else(|| scope.fragment_xml(html))
    } else {
        scope.fragment_xml(html)
    };
    format!("<!DOCTYPE html>\n{xml}")
}

fn unprefixed_xhtml(scope: &NamespaceQuery<'_>, html: &Node) -> Option<String> {
    let xml = scope.fragment_in_default_namespace(html, XHTML_NS);
    let standalone = WrapperDocument::load_str(&xml).ok()?;
    let root = standalone.root().ok()?;
    let default = root
        .get_namespace_declarations()
        .into_iter()
        .find(|ns| ns.get_prefix().is_empty() && ns.get_href() == XHTML_NS)?;

    let mut pending = vec![root.clone()];
    while let Some(mut element) = pending.pop() {
        if element
            .get_namespace()
            .is_some_and(|ns| ns.get_href() == XHTML_NS)
        {
            element.set_namespace(&default).ok()?;
        }
        pending.extend(element.get_child_elements());
    }

    Some(standalone.document().node_to_string(&root))
}

/// Map checker messages to findings.
///
/// A `non-document-error` means the checker itself could not process the
/// input; the whole check is then inconclusive and `Err` carries the reason.
pub fn findings_from_response(response: &CheckerResponse) -> Result<Vec<Finding>, String> {
    let mut findings = Vec::with_capacity(response.messages.len());

    for message in &response.messages {
        let text = message.message.as_deref().unwrap_or("").trim();
        let severity = match message.kind.as_str() {
            "error" => Severity::Error,
            "info" if message.sub_type.as_deref() == Some("warning") => Severity::Warning,
            "info" => Severity::Info,
            "non-document-error" => {
                return Err(if text.is_empty() {
                    "HTML checker could not process the document".to_string()
                } else {
                    format!("HTML checker could not process the document: {text}")
                });
            }
            other => {
                debug!(kind = other, "ignoring unknown checker message type");
                continue;
            }
        };

        findings.push(Finding::new(severity, text).at(message.last_line, message.last_column));
    }

    Ok(findings)
}
