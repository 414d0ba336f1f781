//! Validation orchestrator
//!
//! One call to [`ValidationOrchestrator::run`] loads the wrapper document,
//! binds the namespace prefixes, extracts the news items once and fans the
//! requested standards out to their runners:
//!
//! - **Wrapper first**: the NewsML-G2 result, when requested, leads the report
//! - **Per item**: every other requested standard runs once per item, in
//!   declaration order and then document order
//! - **Bounded concurrency**: runner futures are polled together on the calling
//!   task through `futures::stream::buffered`, so at most
//!   `max_concurrent_runs` are in flight and results keep their slot order
//!
//! libxml2 trees are not `Send`, which rules out `tokio::spawn` per runner;
//! the runners' own latency is network or schema I/O, which interleaves fine
//! on one task.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::{Config, ConfigManager};
use crate::document::WrapperDocument;
use crate::error::{Result, StructuralError, StructuralResult};
use crate::extract::extract_items;
use crate::http_client::AsyncHttpClient;
use crate::namespaces::NamespaceQuery;
use crate::report::{Outcome, ValidationReport, ValidationResult};
use crate::runners::{
    HtmlRunner, MicrodataRunner, NewsMLRunner, NitfRunner, RunnerSet, Target,
};
use crate::schema_loader::{SchemaLoader, SchemaSource};
use crate::standards::{RequestedStandards, StandardName};

/// Orchestration settings
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Maximum runner invocations in flight
    pub max_concurrent_runs: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: num_cpus::get(),
        }
    }
}

/// Decides which runners to invoke over which inputs and collects their
/// results in a fixed order
pub struct ValidationOrchestrator {
    runners: RunnerSet,
    config: OrchestratorConfig,
}

impl ValidationOrchestrator {
    pub fn new(runners: RunnerSet, config: OrchestratorConfig) -> Self {
        Self { runners, config }
    }

    /// Build the four standard runners from application configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = AsyncHttpClient::new(ConfigManager::http_client_config(config))?;
        let loader = Arc::new(SchemaLoader::new(
            http_client.clone(),
            config.schemas.cache_entries,
        ));

        let newsml_schema = config.schemas.newsml.as_deref().map(SchemaSource::parse);
        let nitf_schema = config.schemas.nitf.as_deref().map(SchemaSource::parse);

        let runners = RunnerSet::new()
            .with(NewsMLRunner::new(Arc::clone(&loader), newsml_schema))
            .with(HtmlRunner::new(
                http_client,
                config.network.html_validator_url.clone(),
            ))
            .with(MicrodataRunner::new())
            .with(NitfRunner::new(loader, nitf_schema));

        Ok(Self::new(
            runners,
            OrchestratorConfig {
                max_concurrent_runs: ConfigManager::get_concurrency(config),
            },
        ))
    }

    /// Validate `raw` against the requested standards.
    ///
    /// Fails only when the document cannot be loaded or its items cannot be
    /// extracted; every runner outcome, including an unavailable checker, is
    /// part of the returned report.
    pub async fn run(
        &self,
        raw: &[u8],
        requested: &RequestedStandards,
    ) -> StructuralResult<ValidationReport> {
        let span = info_span!("validation", bytes = raw.len(), standards = requested.len());

        async move {
            let wrapper = WrapperDocument::load(raw)?;
            let scope = NamespaceQuery::bind(&wrapper)?;
            let items = extract_items(&scope)?;
            debug!(items = items.len(), "extracted news items");

            let mut jobs: Vec<(StandardName, Target<'_>, Option<&str>)> = Vec::new();
            if requested.contains(StandardName::NewsML) {
                jobs.push((StandardName::NewsML, Target::Document(&scope), None));
            }
            for standard in requested.item_scoped() {
                for item in &items {
                    jobs.push((standard, Target::Item(item), item.guid()));
                }
            }

            let results: Vec<ValidationResult> = stream::iter(jobs)
                .map(|(standard, target, guid)| self.invoke(standard, target, guid))
                .buffered(self.config.max_concurrent_runs.max(1))
                .collect()
                .await;

            let report = ValidationReport::new(results);
            info!(
                results = report.len(),
                acceptable = report.all_acceptable(),
                "validation finished"
            );
            Ok::<_, StructuralError>(report)
        }
        .instrument(span)
        .await
    }

    /// Validate with an unfiltered list of standard names; unknown names are
    /// ignored.
    pub async fn run_names<'a, I>(&self, raw: &[u8], names: I) -> StructuralResult<ValidationReport>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.run(raw, &RequestedStandards::from_names(names)).await
    }

    /// Validate with a comma-separated request parameter; absent or blank
    /// means every standard.
    pub async fn run_param(
        &self,
        raw: &[u8],
        param: Option<&str>,
    ) -> StructuralResult<ValidationReport> {
        self.run(raw, &RequestedStandards::from_param(param)).await
    }

    async fn invoke(
        &self,
        standard: StandardName,
        target: Target<'_>,
        guid: Option<&str>,
    ) -> ValidationResult {
        let Some(runner) = self.runners.get(standard) else {
            warn!(%standard, "no runner registered");
            return ValidationResult::inconclusive(
                standard,
                guid,
                format!("no runner registered for {standard}"),
            );
        };

        debug!(%standard, guid, "running");
        let result = runner.run(target, guid).await;
        if result.outcome == Outcome::Inconclusive {
            warn!(
                %standard,
                guid,
                reason = result.note.as_deref().unwrap_or(""),
                "check was inconclusive"
            );
        }
        result
    }

    pub fn runners(&self) -> &RunnerSet {
        &self.runners
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}
