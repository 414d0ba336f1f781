use std::process::ExitCode;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use newsml_validator::cli::Cli;
use newsml_validator::config::ConfigManager;
use newsml_validator::negotiate;
use newsml_validator::output::{Summary, render};
use newsml_validator::telemetry::{init_tracing, level_for};
use newsml_validator::validator::ValidationOrchestrator;

/// Some result failed or could not be checked
const EXIT_NOT_ACCEPTABLE: u8 = 1;
/// Malformed document, bad configuration or I/O failure
const EXIT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    cli.validate().map_err(anyhow::Error::msg)?;

    let config = ConfigManager::load_config(&cli)
        .await
        .context("Failed to load configuration")?;
    init_tracing(level_for(config.output.verbose, config.output.quiet));

    let raw = read_input(&cli).await?;
    let orchestrator = ValidationOrchestrator::from_config(&config)?;

    let standards = cli
        .standards
        .as_deref()
        .or(config.validation.default_standards.as_deref());
    let report = orchestrator.run_param(&raw, standards).await?;

    let media_type = negotiate::select(config.output.default_accept.as_deref());
    println!("{}", render(&report, media_type)?);

    if !config.output.quiet {
        eprintln!("{}", Summary::of(&report));
    }

    Ok(if report.all_acceptable() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NOT_ACCEPTABLE)
    })
}

async fn read_input(cli: &Cli) -> Result<Vec<u8>> {
    if cli.reads_stdin() {
        let mut raw = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut raw)
            .await
            .context("Failed to read document from stdin")?;
        Ok(raw)
    } else {
        tokio::fs::read(&cli.input)
            .await
            .with_context(|| format!("Failed to read {}", cli.input.display()))
    }
}
