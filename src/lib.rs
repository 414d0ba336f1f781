//! # newsml-validator Library
//!
//! Validates NewsML-G2 documents against a caller-selected set of standards:
//! the NewsML-G2 schema for the wrapper, and XHTML5, microdata and NITF for the
//! content embedded in each news item. One call yields one result per
//! (standard, item) pair, in a fixed order, each attributed to the `guid` of
//! the item it describes.

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod http_client;
pub mod namespaces;
pub mod negotiate;
pub mod output;
pub mod report;
pub mod runners;
pub mod schema_loader;
pub mod standards;
pub mod telemetry;
pub mod validator;

pub use cli::Cli;
pub use config::{Config, ConfigError, ConfigManager};
pub use document::WrapperDocument;
pub use error::{StructuralError, ValidatorError};
pub use extract::{ItemNode, extract_items};
pub use http_client::{AsyncHttpClient, HttpClientConfig};
pub use namespaces::NamespaceQuery;
pub use negotiate::MediaType;
pub use output::render;
pub use report::{
    Finding, MicrodataItem, MicrodataProperty, Outcome, Severity, ValidationReport,
    ValidationResult,
};
pub use runners::{
    HtmlRunner, MicrodataRunner, NewsMLRunner, NitfRunner, RunnerSet, StandardRunner, Target,
};
pub use schema_loader::{SchemaLoader, SchemaSource};
pub use standards::{RequestedStandards, StandardName};
pub use validator::{OrchestratorConfig, ValidationOrchestrator};
