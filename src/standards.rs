//! Standard names and request parameter parsing.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A conformance check that can be requested.
///
/// Variant order is the order in which results appear in a report.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StandardName {
    /// Wrapper document against the NewsML-G2 schema
    NewsML,
    /// XHTML5 markup of each item
    HTML,
    /// Microdata embedded in each item's XHTML
    Microdata,
    /// NITF content of each item
    NITF,
}

impl StandardName {
    /// Every recognized standard, in declaration order.
    pub const ALL: [StandardName; 4] = [
        StandardName::NewsML,
        StandardName::HTML,
        StandardName::Microdata,
        StandardName::NITF,
    ];

    /// Caller-facing name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardName::NewsML => "NewsML",
            StandardName::HTML => "HTML",
            StandardName::Microdata => "Microdata",
            StandardName::NITF => "NITF",
        }
    }

    /// Look up a caller-facing name. Surrounding whitespace is ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|standard| standard.as_str() == name)
    }

    /// Whether this standard runs once per embedded item rather than once per document.
    pub fn is_item_scoped(&self) -> bool {
        !matches!(self, StandardName::NewsML)
    }
}

impl fmt::Display for StandardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, duplicate-free set of requested standards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedStandards {
    standards: BTreeSet<StandardName>,
}

impl RequestedStandards {
    /// No standards at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// All recognized standards.
    pub fn all() -> Self {
        StandardName::ALL.into_iter().collect()
    }

    /// Keep the recognized names, silently dropping everything else.
    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter_map(StandardName::from_name)
            .collect()
    }

    /// Parse the comma-separated request parameter.
    ///
    /// An absent or blank parameter means every standard. A non-blank parameter
    /// naming only unknown standards yields an empty set.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(param) if !param.trim().is_empty() => Self::from_names(param.split(',')),
            _ => Self::all(),
        }
    }

    pub fn contains(&self, standard: StandardName) -> bool {
        self.standards.contains(&standard)
    }

    pub fn is_empty(&self) -> bool {
        self.standards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.standards.len()
    }

    /// Requested standards in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = StandardName> + '_ {
        self.standards.iter().copied()
    }

    /// Requested standards that run per item, in declaration order.
    pub fn item_scoped(&self) -> impl Iterator<Item = StandardName> + '_ {
        self.iter().filter(StandardName::is_item_scoped)
    }
}

impl FromIterator<StandardName> for RequestedStandards {
    fn from_iter<T: IntoIterator<Item = StandardName>>(iter: T) -> Self {
        Self {
            standards: iter.into_iter().collect(),
        }
    }
}
