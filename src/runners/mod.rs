//! Standard-specific runners.
//!
//! Every runner shares one contract: given a target (the whole wrapper
//! document or a single item) and the caller-visible item identifier, produce
//! exactly one [`ValidationResult`]. Runners never fail; a check that cannot be
//! completed is reported as [`Outcome::Inconclusive`](crate::report::Outcome).

use std::collections::BTreeMap;

use async_trait::async_trait;
use libxml::error::StructuredError;
use libxml::tree::Node;

use crate::error::StructuralResult;
use crate::extract::ItemNode;
use crate::namespaces::NamespaceQuery;
use crate::report::{Finding, ValidationResult};
use crate::standards::StandardName;

pub mod html;
pub mod microdata;
pub mod newsml;
pub mod nitf;

pub use html::HtmlRunner;
pub use microdata::MicrodataRunner;
pub use newsml::NewsMLRunner;
pub use nitf::NitfRunner;

/// What a runner is asked to check
#[derive(Clone, Copy)]
pub enum Target<'a> {
    /// The whole wrapper document
    Document(&'a NamespaceQuery<'a>),
    /// A single embedded item
    Item(&'a ItemNode<'a>),
}

impl<'a> Target<'a> {
    /// Namespace bindings of the document the target belongs to
    pub fn scope(&self) -> &'a NamespaceQuery<'a> {
        match *self {
            Target::Document(scope) => scope,
            Target::Item(item) => item.scope(),
        }
    }

    pub fn item(&self) -> Option<&'a ItemNode<'a>> {
        match *self {
            Target::Document(_) => None,
            Target::Item(item) => Some(item),
        }
    }

    /// Evaluate `expression` relative to the item, or to the document element
    pub fn select(&self, expression: &str) -> StructuralResult<Vec<Node>> {
        match *self {
            Target::Document(scope) => {
                let root = scope.wrapper().root()?;
                scope.select_from(&root, expression)
            }
            Target::Item(item) => item.select(expression),
        }
    }
}

/// A conformance check for one standard.
///
/// libxml2 trees are not thread-safe, so runner futures are not required to be
/// `Send`; the orchestrator drives them on the calling task.
#[async_trait(?Send)]
pub trait StandardRunner {
    /// The standard this runner checks
    fn standard(&self) -> StandardName;

    /// Check `target`. `item_id` is only used to attribute the result.
    async fn run(&self, target: Target<'_>, item_id: Option<&str>) -> ValidationResult;
}

/// Runner lookup by standard
#[derive(Default)]
pub struct RunnerSet {
    runners: BTreeMap<StandardName, Box<dyn StandardRunner>>,
}

impl RunnerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `runner` under its own standard, replacing any previous one.
    pub fn with(mut self, runner: impl StandardRunner + 'static) -> Self {
        self.insert(Box::new(runner));
        self
    }

    pub fn insert(&mut self, runner: Box<dyn StandardRunner>) {
        self.runners.insert(runner.standard(), runner);
    }

    pub fn get(&self, standard: StandardName) -> Option<&dyn StandardRunner> {
        self.runners.get(&standard).map(|runner| runner.as_ref())
    }

    pub fn standards(&self) -> impl Iterator<Item = StandardName> + '_ {
        self.runners.keys().copied()
    }
}

/// Result of an XSD validation pass
pub(crate) fn schema_result(
    standard: StandardName,
    item_id: Option<&str>,
    outcome: Result<(), Vec<StructuredError>>,
) -> ValidationResult {
    match outcome {
        Ok(()) => ValidationResult::passed(standard, item_id),
        Err(errors) => {
            let mut findings = schema_findings(&errors);
            if findings.is_empty() {
                findings.push(Finding::error("content does not conform to the schema"));
            }
            ValidationResult::from_findings(standard, item_id, findings)
        }
    }
}

/// Convert libxml2 schema validation errors into findings
pub(crate) fn schema_findings(errors: &[StructuredError]) -> Vec<Finding> {
    errors
        .iter()
        .map(|e| {
            let message = e.message.as_deref().unwrap_or("unknown error").trim();
            let line = e.line.and_then(|l| u32::try_from(l).ok());
            let column = e.col.and_then(|c| u32::try_from(c).ok()).filter(|c| *c > 0);
            Finding::error(message).at(line, column)
        })
        .collect()
}
