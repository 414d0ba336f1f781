//! Report rendering
//!
//! Serializes a [`ValidationReport`] in the media type chosen by content
//! negotiation, and formats the one-line summary printed on stderr.

use crate::error::Result;
use crate::negotiate::MediaType;
use crate::report::{Outcome, ValidationReport};

/// Root element of the XML rendering
pub const XML_ROOT: &str = "validationReport";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Render `report` as `media_type`.
pub fn render(report: &ValidationReport, media_type: MediaType) -> Result<String> {
    match media_type {
        MediaType::Json => Ok(serde_json::to_string_pretty(report)?),
        MediaType::Xml => {
            let body = quick_xml::se::to_string_with_root(XML_ROOT, report)?;
            Ok(format!("{XML_DECLARATION}{body}"))
        }
    }
}

/// Outcome counts of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub inconclusive: usize,
    pub not_applicable: usize,
}

impl Summary {
    pub fn of(report: &ValidationReport) -> Self {
        let mut summary = Self::default();
        for result in report.iter() {
            match result.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Inconclusive => summary.inconclusive += 1,
                Outcome::NotApplicable => summary.not_applicable += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.inconclusive + self.not_applicable
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} checks: {} passed, {} failed, {} inconclusive, {} not applicable",
            self.total(),
            self.passed,
            self.failed,
            self.inconclusive,
            self.not_applicable
        )
    }
}
