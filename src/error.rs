use thiserror::Error;

use crate::config::ConfigError;

/// The submitted document cannot be decomposed into items.
///
/// Always fatal to a validation call: no item identity can be trusted once the
/// tree or the extraction query is unavailable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("Document is not well-formed XML: {details}")]
    NotWellFormed { details: String },

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Namespace binding failed: {prefix} -> {uri}")]
    NamespaceBinding { prefix: String, uri: String },

    #[error("XPath query could not be evaluated: {expression}")]
    Query { expression: String },
}

/// Application error type covering the collaborators around the core
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status error: {status} for {url} - {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Request timeout: {url} after {timeout_seconds} seconds")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("Schema not found: {location}")]
    SchemaNotFound { location: String },

    #[error("Schema could not be fetched: {location} - {details}")]
    SchemaFetch { location: String, details: String },

    #[error("Schema parsing error: {location} - {details}")]
    SchemaParsing { location: String, details: String },

    #[error("Schema not configured for {standard}")]
    SchemaNotConfigured { standard: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML serialization error: {0}")]
    Xml(#[from] quick_xml::se::SeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

impl From<ConfigError> for ValidatorError {
    fn from(err: ConfigError) -> Self {
        ValidatorError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Structural result type alias
pub type StructuralResult<T> = std::result::Result<T, StructuralError>;
