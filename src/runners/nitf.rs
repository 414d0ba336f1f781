//! NITF schema validation of the `nitf` element embedded in an item.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{StandardRunner, Target, schema_result};
use crate::document::WrapperDocument;
use crate::error::ValidatorError;
use crate::report::ValidationResult;
use crate::schema_loader::{SchemaLoader, SchemaSource};
use crate::standards::StandardName;

/// Locates NITF content relative to the target
pub const NITF_QUERY: &str = ".//nitf:nitf";

pub struct NitfRunner {
    loader: Arc<SchemaLoader>,
    schema: Option<SchemaSource>,
}

impl NitfRunner {
    pub fn new(loader: Arc<SchemaLoader>, schema: Option<SchemaSource>) -> Self {
        Self { loader, schema }
    }
}

#[async_trait(?Send)]
impl StandardRunner for NitfRunner {
    fn standard(&self) -> StandardName {
        StandardName::NITF
    }

    async fn run(&self, target: Target<'_>, item_id: Option<&str>) -> ValidationResult {
        let nodes = match target.select(NITF_QUERY) {
            Ok(nodes) => nodes,
            Err(e) => return ValidationResult::inconclusive(StandardName::NITF, item_id, e.to_string()),
        };
        if nodes.is_empty() {
            return ValidationResult::not_applicable(
                StandardName::NITF,
                item_id,
                "item contains no NITF content",
            );
        }

        let Some(source) = &self.schema else {
            let missing = ValidatorError::SchemaNotConfigured {
                standard: StandardName::NITF.to_string(),
            };
            return ValidationResult::inconclusive(StandardName::NITF, item_id, missing.to_string());
        };

        let mut context = match self.loader.load(source).await {
            Ok(context) => context,
            Err(e) => {
                warn!(schema = %source.location(), error = %e, "NITF schema unavailable");
                return ValidationResult::inconclusive(StandardName::NITF, item_id, e.to_string());
            }
        };

        let mut findings = Vec::new();
        for node in &nodes {
            // Each NITF block is validated as a document of its own
            let xml = target.scope().fragment_xml(node);
            let standalone = match WrapperDocument::load_str(&xml) {
                Ok(doc) => doc,
                Err(e) => {
                    return ValidationResult::inconclusive(StandardName::NITF, item_id, e.to_string());
                }
            };

            let result = schema_result(
                StandardName::NITF,
                item_id,
                context.validate_document(standalone.document()),
            );
            debug!(guid = item_id, outcome = ?result.outcome, "NITF block checked");
            findings.extend(result.findings);
        }

        if findings.is_empty() {
            ValidationResult::passed(StandardName::NITF, item_id)
        } else {
            ValidationResult::from_findings(StandardName::NITF, item_id, findings)
        }
    }
}
