//! Validation results and the ordered report.

use serde::{Deserialize, Serialize};

use crate::standards::StandardName;

/// Overall outcome of one runner invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The check ran and found no errors
    Passed,
    /// The check ran and found at least one error
    Failed,
    /// The check could not be completed
    Inconclusive,
    /// The target contains nothing this standard applies to
    NotApplicable,
}

/// Severity of a single finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single message produced by a runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Finding {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn at(mut self, line: Option<u32>, column: Option<u32>) -> Self {
        self.line = line;
        self.column = column;
        self
    }
}

/// A microdata item extracted from XHTML content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicrodataItem {
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub item_type: Vec<String>,
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(rename = "property", default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<MicrodataProperty>,
}

/// A named property value; either text or a nested item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicrodataProperty {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Box<MicrodataItem>>,
}

/// Result of running one standard over one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub standard: StandardName,
    /// Identifier of the item this result describes; absent for whole-document results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    pub outcome: Outcome,
    #[serde(rename = "finding", default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "item", default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<MicrodataItem>,
}

impl ValidationResult {
    /// Build a result from findings; any error-level finding fails the check.
    pub fn from_findings(
        standard: StandardName,
        guid: Option<&str>,
        findings: Vec<Finding>,
    ) -> Self {
        let outcome = if findings.iter().any(|f| f.severity == Severity::Error) {
            Outcome::Failed
        } else {
            Outcome::Passed
        };

        Self {
            standard,
            guid: guid.map(str::to_string),
            outcome,
            findings,
            note: None,
            items: Vec::new(),
        }
    }

    pub fn passed(standard: StandardName, guid: Option<&str>) -> Self {
        Self::from_findings(standard, guid, Vec::new())
    }

    pub fn inconclusive(standard: StandardName, guid: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            standard,
            guid: guid.map(str::to_string),
            outcome: Outcome::Inconclusive,
            findings: Vec::new(),
            note: Some(reason.into()),
            items: Vec::new(),
        }
    }

    pub fn not_applicable(
        standard: StandardName,
        guid: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            outcome: Outcome::NotApplicable,
            ..Self::inconclusive(standard, guid, reason)
        }
    }

    pub fn with_items(mut self, items: Vec<MicrodataItem>) -> Self {
        self.items = items;
        self
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    /// Passed or nothing to check
    pub fn is_acceptable(&self) -> bool {
        matches!(self.outcome, Outcome::Passed | Outcome::NotApplicable)
    }
}

/// Ordered results of one validation call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    #[serde(rename = "validation", default)]
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn new(results: Vec<ValidationResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter()
    }

    /// True when every result passed or did not apply
    pub fn all_acceptable(&self) -> bool {
        self.results.iter().all(ValidationResult::is_acceptable)
    }

    /// (standard, guid) pairs in report order
    pub fn attribution(&self) -> Vec<(StandardName, Option<String>)> {
        self.results
            .iter()
            .map(|r| (r.standard, r.guid.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_follows_error_findings() {
        let passed = ValidationResult::from_findings(
            StandardName::HTML,
            Some("A1"),
            vec![Finding::warning("obsolete attribute")],
        );
        assert_eq!(passed.outcome, Outcome::Passed);
        assert_eq!(passed.error_count(), 0);

        let failed = ValidationResult::from_findings(
            StandardName::HTML,
            Some("A1"),
            vec![Finding::warning("w"), Finding::error("e")],
        );
        assert_eq!(failed.outcome, Outcome::Failed);
        assert_eq!(failed.error_count(), 1);
    }

    #[test]
    fn test_inconclusive_and_not_applicable_carry_a_note() {
        let inconclusive =
            ValidationResult::inconclusive(StandardName::NITF, Some("A1"), "schema unavailable");
        assert_eq!(inconclusive.outcome, Outcome::Inconclusive);
        assert_eq!(inconclusive.note.as_deref(), Some("schema unavailable"));
        assert!(!inconclusive.is_acceptable());

        let skipped = ValidationResult::not_applicable(StandardName::NITF, Some("A1"), "no NITF");
        assert_eq!(skipped.outcome, Outcome::NotApplicable);
        assert_eq!(skipped.guid.as_deref(), Some("A1"));
        assert!(skipped.is_acceptable());
    }

    #[test]
    fn test_report_attribution() {
        let report = ValidationReport::new(vec![
            ValidationResult::passed(StandardName::NewsML, None),
            ValidationResult::passed(StandardName::HTML, Some("A1")),
        ]);

        assert_eq!(
            report.attribution(),
            vec![
                (StandardName::NewsML, None),
                (StandardName::HTML, Some("A1".to_string()))
            ]
        );
        assert!(report.all_acceptable());
    }

    #[test]
    fn test_json_shape() {
        let result = ValidationResult::from_findings(
            StandardName::Microdata,
            Some("A1"),
            vec![Finding::error("bad itemtype").at(Some(3), None)],
        );
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["standard"], "Microdata");
        assert_eq!(json["guid"], "A1");
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["finding"][0]["severity"], "error");
        assert_eq!(json["finding"][0]["line"], 3);
        assert!(json["finding"][0].get("column").is_none());
        assert!(json.get("note").is_none());
    }
}
