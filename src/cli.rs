use clap::Parser;
use std::path::{Path, PathBuf};

/// Validate a NewsML-G2 document and the XHTML, microdata and NITF content
/// embedded in its news items
#[derive(Parser, Debug, Clone)]
#[command(name = "newsml-validate")]
#[command(about = "Validate NewsML-G2 documents and their embedded content")]
#[command(version)]
pub struct Cli {
    /// Document to validate, or `-` for stdin
    #[arg(help = "NewsML-G2 document to validate ('-' reads stdin)")]
    pub input: PathBuf,

    /// Standards to check (comma-separated)
    #[arg(
        short = 's',
        long = "standards",
        help = "Standards to check: NewsML,HTML,Microdata,NITF (default: all)"
    )]
    pub standards: Option<String>,

    /// Accept header value used to choose the report format
    #[arg(
        short = 'a',
        long = "accept",
        help = "Report media type, e.g. 'application/json' or 'text/xml'"
    )]
    pub accept: Option<String>,

    /// Configuration file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Nu HTML Checker endpoint
    #[arg(long = "html-validator-url")]
    pub html_validator_url: Option<String>,

    /// NewsML-G2 schema path or URL
    #[arg(long = "newsml-schema")]
    pub newsml_schema: Option<String>,

    /// NITF schema path or URL
    #[arg(long = "nitf-schema")]
    pub nitf_schema: Option<String>,

    /// Maximum number of runner invocations in flight
    #[arg(short = 'j', long = "concurrency")]
    pub concurrency: Option<usize>,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the document is read from stdin
    pub fn reads_stdin(&self) -> bool {
        self.input == Path::new("-")
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.reads_stdin() && !self.input.exists() {
            return Err(format!("Input does not exist: {}", self.input.display()));
        }
        if self.concurrency == Some(0) {
            return Err("Concurrency must be greater than 0".to_string());
        }
        Ok(())
    }
}
