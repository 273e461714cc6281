use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use atom_publications::{Config, FeedExecutor, DEFAULT_TIMEOUT_SECS};

#[derive(Parser)]
#[command(
    name = "atom-publications",
    about = "Extract publications from an Atom feed and print them as JSON"
)]
struct Cli {
    /// Feed URL (http...) or path to a local Atom file
    #[arg(env = "ATOM_FEED_LOCATOR")]
    locator: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Diagnostics go to stderr; stdout carries only the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("atom_publications=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::new(cli.locator.as_deref(), cli.timeout);

    let executor = FeedExecutor::from_config(&config).context("Failed to build HTTP client")?;
    let status = executor
        .report(&config.locator, std::io::stdout().lock())
        .await
        .context("Failed to write publications")?;

    Ok(ExitCode::from(status))
}
