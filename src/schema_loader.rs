//! XSD grammar loading for the schema-based runners.
//!
//! A schema location is either a local path or an HTTP(S) URL. Local schemas
//! are compiled straight from the file so that relative `xs:include` and
//! `xs:import` references resolve next to it. Remote schemas are downloaded
//! once per location and the bytes are kept in a bounded in-memory cache.
//!
//! Compiled grammars are not cached: libxml2 validation contexts are tied to
//! the thread that created them, and each validation call builds its own.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use libxml::error::StructuredError;
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};
use moka::future::Cache;
use tracing::debug;

use crate::error::{Result, ValidatorError};
use crate::http_client::AsyncHttpClient;

/// Where a schema lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Local(PathBuf),
    Remote(String),
}

impl SchemaSource {
    /// Classify a configured schema location
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            SchemaSource::Remote(location.to_string())
        } else {
            SchemaSource::Local(PathBuf::from(location))
        }
    }

    pub fn location(&self) -> String {
        match self {
            SchemaSource::Local(path) => path.display().to_string(),
            SchemaSource::Remote(url) => url.clone(),
        }
    }
}

/// Loads and compiles XSD schemas
pub struct SchemaLoader {
    http_client: AsyncHttpClient,
    remote: Cache<String, Arc<Vec<u8>>>,
}

impl SchemaLoader {
    pub fn new(http_client: AsyncHttpClient, max_cached_schemas: u64) -> Self {
        Self {
            http_client,
            remote: Cache::builder().max_capacity(max_cached_schemas).build(),
        }
    }

    /// Compile the schema at `source` into a fresh validation context.
    pub async fn load(&self, source: &SchemaSource) -> Result<SchemaValidationContext> {
        match source {
            SchemaSource::Local(path) => Self::compile_file(path),
            SchemaSource::Remote(url) => {
                let data = self.fetch_remote(url).await?;
                let mut parser = SchemaParserContext::from_buffer(data.as_slice());
                compile(&mut parser, url)
            }
        }
    }

    /// Remote schema bytes, downloaded at most once per URL while cached
    pub async fn fetch_remote(&self, url: &str) -> Result<Arc<Vec<u8>>> {
        self.remote
            .try_get_with(url.to_string(), async {
                debug!(url, "downloading schema");
                let data = self.http_client.download(url).await?;
                check_schema_content(&data, url)?;
                Ok::<_, ValidatorError>(Arc::new(data))
            })
            .await
            .map_err(|e| ValidatorError::SchemaFetch {
                location: url.to_string(),
                details: e.to_string(),
            })
    }

    /// Number of remote schemas currently cached
    pub fn cached_remote_schemas(&self) -> u64 {
        self.remote.entry_count()
    }

    fn compile_file(path: &Path) -> Result<SchemaValidationContext> {
        // libxml2 reports a missing file as a generic parse failure
        if !path.exists() {
            return Err(ValidatorError::SchemaNotFound {
                location: path.display().to_string(),
            });
        }

        let location = path.display().to_string();
        let path_str = path.to_str().ok_or_else(|| ValidatorError::SchemaNotFound {
            location: location.clone(),
        })?;

        let mut parser = SchemaParserContext::from_file(path_str);
        compile(&mut parser, &location)
    }
}

fn compile(parser: &mut SchemaParserContext, location: &str) -> Result<SchemaValidationContext> {
    SchemaValidationContext::from_parser(parser).map_err(|errors| ValidatorError::SchemaParsing {
        location: location.to_string(),
        details: describe_errors(&errors),
    })
}

/// Reject payloads that are obviously not a schema before handing them to libxml2
fn check_schema_content(data: &[u8], source: &str) -> Result<()> {
    let content = std::str::from_utf8(data).map_err(|_| ValidatorError::SchemaParsing {
        location: source.to_string(),
        details: "Schema content is not valid UTF-8".to_string(),
    })?;

    if !content.contains("schema") {
        return Err(ValidatorError::SchemaParsing {
            location: source.to_string(),
            details: "Content does not look like an XML Schema".to_string(),
        });
    }

    Ok(())
}

/// One line per libxml2 error
pub fn describe_errors(errors: &[StructuredError]) -> String {
    let messages: Vec<String> = errors
        .iter()
        .map(|e| {
            e.message
                .as_deref()
                .unwrap_or("unknown error")
                .trim()
                .to_string()
        })
        .collect();
    if messages.is_empty() {
        "unknown error".to_string()
    } else {
        messages.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpClientConfig;
    use tempfile::TempDir;

    const SIMPLE_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="root" type="xs:string"/>
</xs:schema>"#;

    fn loader() -> SchemaLoader {
        let http = AsyncHttpClient::new(HttpClientConfig {
            timeout_seconds: 2,
            retry_attempts: 0,
            ..Default::default()
        })
        .unwrap();
        SchemaLoader::new(http, 8)
    }

    #[test]
    fn test_source_classification() {
        assert_eq!(
            SchemaSource::parse("https://iptc.org/std/NewsML-G2/2.33/specification/NewsML-G2_2.33-spec-All-Power.xsd"),
            SchemaSource::Remote(
                "https://iptc.org/std/NewsML-G2/2.33/specification/NewsML-G2_2.33-spec-All-Power.xsd"
                    .to_string()
            )
        );
        assert_eq!(
            SchemaSource::parse(" schemas/nitf-3-6.xsd "),
            SchemaSource::Local(PathBuf::from("schemas/nitf-3-6.xsd"))
        );
    }

    #[tokio::test]
    async fn test_load_local_schema() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("simple.xsd");
        std::fs::write(&path, SIMPLE_XSD).unwrap();

        let result = loader().load(&SchemaSource::Local(path)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_missing_local_schema() {
        let result = loader()
            .load(&SchemaSource::Local(PathBuf::from("/nonexistent/schema.xsd")))
            .await;
        match result {
            Err(ValidatorError::SchemaNotFound { location }) => {
                assert!(location.contains("schema.xsd"))
            }
            _ => panic!("Expected SchemaNotFound"),
        }
    }

    #[tokio::test]
    async fn test_invalid_local_schema() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.xsd");
        std::fs::write(&path, "<invalid>not a schema</invalid>").unwrap();

        let result = loader().load(&SchemaSource::Local(path)).await;
        assert!(matches!(result, Err(ValidatorError::SchemaParsing { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_remote_schema() {
        let loader = loader();
        let result = loader
            .load(&SchemaSource::Remote("http://127.0.0.1:9/schema.xsd".to_string()))
            .await;
        assert!(matches!(result, Err(ValidatorError::SchemaFetch { .. })));
        assert_eq!(loader.cached_remote_schemas(), 0);
    }

    #[test]
    fn test_schema_content_check() {
        assert!(check_schema_content(SIMPLE_XSD.as_bytes(), "x").is_ok());
        assert!(check_schema_content(b"<html/>", "x").is_err());
        assert!(check_schema_content(&[0xff, 0xfe], "x").is_err());
    }
}
