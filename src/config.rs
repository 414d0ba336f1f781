use crate::cli::Cli;
use crate::http_client::HttpClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Public Nu HTML Checker instance
pub const DEFAULT_HTML_VALIDATOR_URL: &str = "https://validator.w3.org/nu/";

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "NEWSML_VALIDATOR_";

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub validation: ValidationConfig,
    pub schemas: SchemaConfig,
    pub network: NetworkConfig,
    pub output: OutputConfig,
}

/// Orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum runner invocations in flight; defaults to the CPU count
    pub max_concurrent_runs: Option<usize>,
    /// Comma-separated standards used when the caller names none
    pub default_standards: Option<String>,
}

/// Schema locations (file paths or HTTP(S) URLs)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchemaConfig {
    pub newsml: Option<String>,
    pub nitf: Option<String>,
    /// Maximum number of downloaded schemas kept in memory
    pub cache_entries: u64,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// HTTP request timeout in seconds
    pub timeout_seconds: u64,
    /// Number of retry attempts for failed requests
    pub retry_attempts: u32,
    /// Retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Nu HTML Checker endpoint
    pub html_validator_url: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Accept value used when none is given on the command line
    pub default_accept: Option<String>,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (errors only)
    pub quiet: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            newsml: None,
            nitf: None,
            cache_entries: 16,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            html_validator_url: Some(DEFAULT_HTML_VALIDATOR_URL.to_string()),
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        Self::load_config_with(&SystemEnvProvider, cli).await
    }

    /// Load configuration reading overrides from `env`
    pub async fn load_config_with(env: &impl EnvProvider, cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            let file_config = Self::load_from_file(config_path).await?;
            config = Self::merge_configs(config, file_config);
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = Self::merge_configs(config, found_config);
        }

        config = Self::apply_environment_overrides_with(env, config)?;

        // CLI arguments have the highest precedence
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let config_names = [
            "newsml-validator.toml",
            "newsml-validator.json",
            ".newsml-validator.toml",
            ".newsml-validator.json",
        ];

        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("newsml-validator");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        // Validation settings
        if let Some(runs) = parse_env(env, "CONCURRENCY")? {
            config.validation.max_concurrent_runs = Some(runs);
        }
        if let Some(standards) = env_string(env, "STANDARDS") {
            config.validation.default_standards = Some(standards);
        }

        // Schema settings
        if let Some(newsml) = env_string(env, "NEWSML_SCHEMA") {
            config.schemas.newsml = Some(newsml);
        }
        if let Some(nitf) = env_string(env, "NITF_SCHEMA") {
            config.schemas.nitf = Some(nitf);
        }
        if let Some(entries) = parse_env(env, "SCHEMA_CACHE_ENTRIES")? {
            config.schemas.cache_entries = entries;
        }

        // Network settings
        if let Some(timeout) = parse_env(env, "TIMEOUT")? {
            config.network.timeout_seconds = timeout;
        }
        if let Some(retry_attempts) = parse_env(env, "RETRY_ATTEMPTS")? {
            config.network.retry_attempts = retry_attempts;
        }
        if let Some(retry_delay) = parse_env(env, "RETRY_DELAY_MS")? {
            config.network.retry_delay_ms = retry_delay;
        }
        if let Some(url) = env_string(env, "HTML_VALIDATOR_URL") {
            config.network.html_validator_url = Some(url);
        }

        // Output settings
        if let Some(accept) = env_string(env, "ACCEPT") {
            config.output.default_accept = Some(accept);
        }
        if let Some(verbose) = parse_env(env, "VERBOSE")? {
            config.output.verbose = verbose;
        }
        if let Some(quiet) = parse_env(env, "QUIET")? {
            config.output.quiet = quiet;
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if cli.concurrency.is_some() {
            config.validation.max_concurrent_runs = cli.concurrency;
        }

        if cli.newsml_schema.is_some() {
            config.schemas.newsml = cli.newsml_schema.clone();
        }
        if cli.nitf_schema.is_some() {
            config.schemas.nitf = cli.nitf_schema.clone();
        }

        if let Some(timeout) = cli.timeout {
            config.network.timeout_seconds = timeout;
        }
        if cli.html_validator_url.is_some() {
            config.network.html_validator_url = cli.html_validator_url.clone();
        }

        if cli.accept.is_some() {
            config.output.default_accept = cli.accept.clone();
        }
        // A flag on the command line replaces whatever the lower layers chose
        if cli.verbose || cli.quiet {
            config.output.verbose = cli.verbose;
            config.output.quiet = cli.quiet;
        }

        config
    }

    /// Merge two configurations (second takes precedence for non-None values)
    pub fn merge_configs(mut base: Config, override_config: Config) -> Config {
        if override_config.validation.max_concurrent_runs.is_some() {
            base.validation.max_concurrent_runs = override_config.validation.max_concurrent_runs;
        }
        if override_config.validation.default_standards.is_some() {
            base.validation.default_standards = override_config.validation.default_standards;
        }

        if override_config.schemas.newsml.is_some() {
            base.schemas.newsml = override_config.schemas.newsml;
        }
        if override_config.schemas.nitf.is_some() {
            base.schemas.nitf = override_config.schemas.nitf;
        }
        base.schemas.cache_entries = override_config.schemas.cache_entries;

        base.network.timeout_seconds = override_config.network.timeout_seconds;
        base.network.retry_attempts = override_config.network.retry_attempts;
        base.network.retry_delay_ms = override_config.network.retry_delay_ms;
        if override_config.network.html_validator_url.is_some() {
            base.network.html_validator_url = override_config.network.html_validator_url;
        }

        if override_config.output.default_accept.is_some() {
            base.output.default_accept = override_config.output.default_accept;
        }
        base.output.verbose = override_config.output.verbose;
        base.output.quiet = override_config.output.quiet;

        base
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if let Some(runs) = config.validation.max_concurrent_runs {
            if runs == 0 {
                return Err(ConfigError::Validation(
                    "Maximum concurrent runs must be greater than 0".to_string(),
                ));
            }
            if runs > 1000 {
                return Err(ConfigError::Validation(
                    "Maximum concurrent runs cannot exceed 1000".to_string(),
                ));
            }
        }

        if config.schemas.cache_entries == 0 {
            return Err(ConfigError::Validation(
                "Schema cache must hold at least one entry".to_string(),
            ));
        }

        if config.network.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if config.network.retry_attempts > 10 {
            return Err(ConfigError::Validation(
                "Retry attempts cannot exceed 10".to_string(),
            ));
        }

        if let Some(url) = &config.network.html_validator_url {
            reqwest::Url::parse(url).map_err(|e| {
                ConfigError::Validation(format!("Invalid HTML validator URL {url}: {e}"))
            })?;
        }

        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the effective number of concurrent runner invocations
    pub fn get_concurrency(config: &Config) -> usize {
        config
            .validation
            .max_concurrent_runs
            .unwrap_or_else(num_cpus::get)
    }

    /// HTTP client settings derived from the network section
    pub fn http_client_config(config: &Config) -> HttpClientConfig {
        HttpClientConfig {
            timeout_seconds: config.network.timeout_seconds,
            retry_attempts: config.network.retry_attempts,
            retry_delay_ms: config.network.retry_delay_ms,
            ..Default::default()
        }
    }
}

fn env_string(env: &impl EnvProvider, name: &str) -> Option<String> {
    env.get(&format!("{ENV_PREFIX}{name}"))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env<T: FromStr>(env: &impl EnvProvider, name: &str) -> Result<Option<T>> {
    match env_string(env, name) {
        Some(value) => value.parse().map(Some).map_err(|_| {
            ConfigError::Environment(format!("Invalid {ENV_PREFIX}{name} value: {value}"))
        }),
        None => Ok(None),
    }
}
