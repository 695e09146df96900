//! CLI for researching an organization's foundation
//!
//! Prints the research outcome as JSON on stdout. Found and not-found results
//! exit 0; fetch failures and malformed input exit non-zero with the error
//! body on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use foundation_research::{normalize_input_url, ResearchConfig, Researcher};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "foundation-research")]
#[command(about = "Find an organization's foundation, its events, registration tools and contacts")]
struct Cli {
    /// Organization website (scheme optional)
    url: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Load overrides from RESEARCH_* environment variables and .env
    #[arg(long)]
    config_from_env: bool,
}

fn render(value: &serde_json::Value, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,foundation_research=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = if cli.config_from_env {
        ResearchConfig::from_env().context("Failed to load configuration")?
    } else {
        ResearchConfig::default()
    };

    let Some(url) = normalize_input_url(&cli.url) else {
        println!("{}", render(&serde_json::json!({ "error": "Invalid URL format" }), cli.pretty)?);
        std::process::exit(2);
    };

    let researcher = Researcher::new(config).context("Failed to build researcher")?;
    tracing::info!(url = %url, "Starting research");

    match researcher.research(&url).await {
        Ok(outcome) => {
            match outcome.report() {
                Some(report) => tracing::info!(
                    foundation = ?report.foundation.name,
                    stage = %report.meta.resolution_stage,
                    confidence = report.confidence_score,
                    "Foundation found"
                ),
                None => tracing::info!(url = %url, "No foundation found"),
            }
            let value = serde_json::to_value(&outcome).context("Failed to serialize outcome")?;
            println!("{}", render(&value, cli.pretty)?);
            Ok(())
        }
        Err(failure) => {
            tracing::error!(status = failure.status_code(), error = %failure, "Research failed");
            println!("{}", render(&failure.to_json(), cli.pretty)?);
            std::process::exit(1);
        }
    }
}
