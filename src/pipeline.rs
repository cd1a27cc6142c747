//! One complete report run: fetch, ingest, aggregate, locate, render, write

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::aggregate::Aggregation;
use crate::config::Config;
use crate::geo::GeoClient;
use crate::ingest::{self, DateWindow, IngestStats};
use crate::report::{self, ReportInput};
use crate::source;
use crate::views::{LocationViews, Views};

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: IngestStats,
    pub songs: usize,
    pub locations: usize,
    pub report_paths: Vec<PathBuf>,
}

/// Run the whole pipeline for one date window
///
/// Only an unavailable log or an unwritable output directory fails the
/// run; bad lines and geolocation failures are logged and skipped.
pub async fn run(config: &Config, window: DateWindow) -> Result<RunSummary> {
    let raw = source::fetch_log(&config.source).await?;
    generate(config, window, &raw).await
}

/// Build and write the reports from log text already in memory
pub async fn generate(config: &Config, window: DateWindow, raw: &str) -> Result<RunSummary> {
    let ingested = ingest::ingest(raw, &window);
    let aggregation = Aggregation::from_records(&ingested.records);
    info!(
        "Aggregated {} likes and {} unlikes into {} songs by {} artists from {} addresses",
        aggregation.like_count(),
        aggregation.unlike_count(),
        aggregation.songs().len(),
        aggregation.artists().len(),
        aggregation.ips().len()
    );

    let views = Views::new(&aggregation);

    let geo = GeoClient::new(&config.geo)?;
    let locations = geo.locate(views.ips_alphabetical()).await;
    let location_views = LocationViews::new(&locations);

    let rendered = report::render(&ReportInput {
        window,
        stats: ingested.stats,
        views: &views,
        locations: &locations,
        location_views: &location_views,
    });
    let report_paths = report::write_reports(&config.report, &rendered).await?;

    Ok(RunSummary {
        stats: ingested.stats,
        songs: aggregation.songs().len(),
        locations: locations.counts().len(),
        report_paths,
    })
}
