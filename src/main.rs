use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use liketally::config::Config;
use liketally::ingest::DateWindow;
use liketally::pipeline;

#[derive(Parser)]
#[command(name = "liketally")]
#[command(about = "Song like report generator", long_about = None)]
struct Cli {
    /// First day of the report window (YYYY-MM-DD, inclusive)
    first: NaiveDate,
    /// Last day of the report window (YYYY-MM-DD, inclusive); defaults to yesterday
    last: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let last = match cli.last {
        Some(last) => last,
        None => Local::now()
            .date_naive()
            .pred_opt()
            .context("cannot determine yesterday's date")?,
    };
    let Some(window) = DateWindow::new(cli.first, last) else {
        bail!("FIRST ({}) must not be after LAST ({})", cli.first, last);
    };

    let config = Config::from_env()?;
    info!("Loaded configuration");
    info!("Reporting likes for {}", window);

    let summary = pipeline::run(&config, window).await?;

    info!(
        "Done: {} songs, {} locations, {} of {} lines accepted",
        summary.songs,
        summary.locations,
        summary.stats.accepted(),
        summary.stats.total_lines
    );

    Ok(())
}
