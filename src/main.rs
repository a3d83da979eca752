mod cli;
mod core;
mod error;
mod pipeline;

use crate::cli::Cli;
use crate::core::{Config, ReportService, TranscriptService, YouTubeBackend, YtDlp};
use crate::error::Result;
use crate::pipeline::Pipeline;
use chrono::Local;
use clap::Parser;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[tokio::main]
async fn main() -> Result<()> {
    // Values already present in the environment win over `.env`.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let config = Config::from_cli(cli, env::var(API_KEY_ENV).ok())?;
    let today = Local::now().date_naive();

    let videos = YtDlp::new(config.ytdlp.clone()).await?;
    let transcripts = TranscriptService::new(
        YouTubeBackend::new(&config.cookies_file)?,
        config.languages.clone(),
    );
    let report_service = config
        .api_key
        .as_deref()
        .map(|key| ReportService::new(key, &config.model));

    let summary = Pipeline::new(&config, &videos, &transcripts, today)
        .run(report_service.as_ref())
        .await?;

    info!(
        video_files = summary.video_files,
        summary_files = summary.summary_files,
        summaries_skipped = summary.summaries_skipped,
        "Run finished in {}",
        summary.output_dir.display()
    );

    Ok(())
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}
