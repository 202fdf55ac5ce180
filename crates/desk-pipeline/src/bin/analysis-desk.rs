//! Command-line entry point for the analysis desk

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use desk_llm::GeminiProvider;
use desk_pipeline::{DeskConfig, build_orchestrator};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "analysis-desk", about = "Generate analyst reports for stock tickers")]
struct Cli {
    /// Ticker symbols to analyze
    #[arg(required = true)]
    tickers: Vec<String>,

    /// Anchor date for the analysis (defaults to today)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Directory holding the report archive
    #[arg(long, default_value = "archive")]
    archive_dir: String,

    /// Maximum writer/critic revision rounds per report
    #[arg(long, default_value_t = 5)]
    max_revisions: u32,

    /// Market data lookback window in days
    #[arg(long, default_value_t = 30)]
    lookback_days: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,desk_pipeline=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = DeskConfig::builder()
        .archive_dir(&cli.archive_dir)
        .max_revisions(cli.max_revisions)
        .lookback_days(cli.lookback_days)
        .with_env_keys()
        .build()
        .context("invalid configuration")?;

    let gemini = Arc::new(GeminiProvider::from_env().context("Gemini provider setup failed")?);
    let orchestrator = Arc::new(
        build_orchestrator(&config, gemini.clone(), gemini)
            .await
            .context("pipeline setup failed")?,
    );

    let as_of = cli.as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let reports = orchestrator.run_for_tickers(&cli.tickers, as_of).await;

    for (ticker, report) in cli.tickers.iter().zip(&reports) {
        println!("=== {ticker} ===\n{report}\n");
    }

    Ok(())
}
