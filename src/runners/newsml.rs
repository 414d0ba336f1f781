//! NewsML-G2 schema validation of the whole wrapper document.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::{StandardRunner, Target, schema_result};
use crate::error::ValidatorError;
use crate::report::ValidationResult;
use crate::schema_loader::{SchemaLoader, SchemaSource};
use crate::standards::StandardName;

/// Validates the wrapper against the configured NewsML-G2 XSD
pub struct NewsMLRunner {
    loader: Arc<SchemaLoader>,
    schema: Option<SchemaSource>,
}

impl NewsMLRunner {
    pub fn new(loader: Arc<SchemaLoader>, schema: Option<SchemaSource>) -> Self {
        Self { loader, schema }
    }
}

#[async_trait(?Send)]
impl StandardRunner for NewsMLRunner {
    fn standard(&self) -> StandardName {
        StandardName::NewsML
    }

    async fn run(&self, target: Target<'_>, item_id: Option<&str>) -> ValidationResult {
        let Some(source) = &self.schema else {
            let missing = ValidatorError::SchemaNotConfigured {
                standard: StandardName::NewsML.to_string(),
            };
            return ValidationResult::inconclusive(StandardName::NewsML, item_id, missing.to_string());
        };

        let mut context = match self.loader.load(source).await {
            Ok(context) => context,
            Err(e) => {
                warn!(schema = %source.location(), error = %e, "NewsML-G2 schema unavailable");
                return ValidationResult::inconclusive(StandardName::NewsML, item_id, e.to_string());
            }
        };

        let document = target.scope().wrapper().document();
        schema_result(
            StandardName::NewsML,
            item_id,
            context.validate_document(document),
        )
    }
}
