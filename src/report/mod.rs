//! Text report rendering and writing
//!
//! All three files are rendered in memory before anything touches the disk.
//! Each is then written to a temporary sibling, and only once all three are
//! staged are they renamed into place.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::geo::LocationCounts;
use crate::ingest::{DateWindow, IngestStats};
use crate::views::{LocationViews, Views};

/// Everything a report is rendered from
pub struct ReportInput<'r, 'a> {
    pub window: DateWindow,
    pub stats: IngestStats,
    pub views: &'r Views<'a>,
    pub locations: &'r LocationCounts,
    pub location_views: &'r LocationViews<'a>,
}

/// Fully rendered report files, keyed by their role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub popularity: String,
    pub alphabetical: String,
    pub locations: String,
}

pub fn render(input: &ReportInput<'_, '_>) -> RenderedReport {
    let views = input.views;

    let mut popularity = render_summary(input);
    section(
        &mut popularity,
        "Songs by popularity",
        views
            .songs_by_popularity()
            .iter()
            .map(|(song, count)| row(*count, &[song.artist.as_str(), song.title.as_str()])),
    );
    section(
        &mut popularity,
        "Artists by popularity",
        views
            .artists_by_popularity()
            .iter()
            .map(|(artist, count)| row(*count, &[artist.artist.as_str()])),
    );

    let mut alphabetical = String::new();
    section(
        &mut alphabetical,
        "Songs alphabetical",
        views
            .songs_alphabetical()
            .iter()
            .map(|(song, count)| row(*count, &[song.artist.as_str(), song.title.as_str()])),
    );
    section(
        &mut alphabetical,
        "Artists alphabetical",
        views
            .artists_alphabetical()
            .iter()
            .map(|(artist, count)| row(*count, &[artist.artist.as_str()])),
    );

    let mut locations = String::new();
    section(
        &mut locations,
        "Locations by frequency",
        input.location_views.by_frequency().iter().map(|(l, count)| {
            row(
                *count,
                &[
                    l.city.as_str(),
                    l.region.as_str(),
                    l.country.as_str(),
                    l.continent.as_str(),
                    l.isp.as_str(),
                ],
            )
        }),
    );
    section(
        &mut locations,
        "IPs by frequency",
        views
            .ips_by_frequency()
            .iter()
            .map(|(ip, count)| row(*count, &[ip.as_str()])),
    );
    section(
        &mut locations,
        "IPs alphabetical",
        views
            .ips_alphabetical()
            .iter()
            .map(|(ip, count)| row(*count, &[ip.as_str()])),
    );

    RenderedReport {
        popularity,
        alphabetical,
        locations,
    }
}

fn render_summary(input: &ReportInput<'_, '_>) -> String {
    let aggregation = input.views.aggregation();
    let stats = input.stats;

    let lines = [
        format!("Likes report for {}", input.window),
        format!("Lines read: {}", stats.total_lines),
        format!("Bad lines: {}", stats.bad_lines),
        format!("Lines outside window: {}", stats.outside_window),
        format!("Likes: {}", aggregation.like_count()),
        format!("Unlikes: {}", aggregation.unlike_count()),
        format!("Songs: {}", aggregation.songs().len()),
        format!("Artists: {}", aggregation.artists().len()),
        format!("IPs: {}", aggregation.ips().len()),
        format!(
            "IPs located: {} of {}",
            input.locations.resolved_ips(),
            input.locations.requested_ips()
        ),
        format!("Locations: {}", input.locations.counts().len()),
    ];

    let mut out = lines.join("\n");
    out.push_str("\n\n");
    out
}

/// `<count> : <field> : <field> ...`
fn row<C: std::fmt::Display>(count: C, fields: &[&str]) -> String {
    let mut line = count.to_string();
    for field in fields {
        line.push_str(" : ");
        line.push_str(field);
    }
    line
}

fn section<I>(out: &mut String, label: &str, rows: I)
where
    I: ExactSizeIterator<Item = String>,
{
    out.push_str(&format!("=== {} ({}) ===\n", label, rows.len()));
    for line in rows {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
}

/// Paths of the three report files for a configuration
pub fn report_paths(config: &ReportConfig) -> [PathBuf; 3] {
    ["popularity", "alphabetical", "locations"]
        .map(|kind| config.output_dir.join(format!("{}-{}.txt", config.file_prefix, kind)))
}

/// Write rendered reports, replacing any previous files
pub async fn write_reports(config: &ReportConfig, report: &RenderedReport) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| {
            format!(
                "failed to create report directory {}",
                config.output_dir.display()
            )
        })?;

    let [popularity, alphabetical, locations] = report_paths(config);
    let files = [
        (popularity, &report.popularity),
        (alphabetical, &report.alphabetical),
        (locations, &report.locations),
    ];

    // Stage every file before replacing any, so a failed write leaves the
    // previous reports untouched
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(files.len());
    for (path, content) in files {
        let tmp = path.with_extension("txt.tmp");
        if let Err(e) = tokio::fs::write(&tmp, content).await {
            discard(&staged).await;
            return Err(e).with_context(|| format!("failed to write {}", tmp.display()));
        }
        staged.push((tmp, path));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (tmp, path) in &staged {
        tokio::fs::rename(tmp, path)
            .await
            .with_context(|| format!("failed to move report into place at {}", path.display()))?;

        info!("Wrote {}", path.display());
        written.push(path.clone());
    }

    Ok(written)
}

async fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        if let Err(e) = tokio::fs::remove_file(tmp).await {
            warn!("Failed to remove staged report {}: {}", tmp.display(), e);
        }
    }
}
