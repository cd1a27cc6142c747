//! Log ingestion: line parsing and date windowing
//!
//! Ingestion never fails as a whole. Lines that do not parse, and lines whose
//! timestamp cannot be read, are counted as bad and skipped; the counts are
//! reported once the whole log has been read.

pub mod parser;
pub mod window;

pub use parser::{parse_line, ParseError};
pub use window::DateWindow;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::InteractionRecord;

/// Line counters collected while reading the log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub total_lines: usize,
    pub bad_lines: usize,
    pub outside_window: usize,
}

impl IngestStats {
    pub fn accepted(&self) -> usize {
        self.total_lines - self.bad_lines - self.outside_window
    }
}

/// Records that fell inside the window, in log order
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub records: Vec<InteractionRecord>,
    pub stats: IngestStats,
}

/// Parse a whole log and keep the records inside `window`
pub fn ingest(raw: &str, window: &DateWindow) -> Ingested {
    let mut ingested = Ingested::default();

    for (index, line) in raw.lines().enumerate() {
        ingested.stats.total_lines += 1;

        let record = match parse_line(line) {
            Ok(record) => record,
            Err(e) => {
                debug!(line = index + 1, error = %e, "Skipping bad line");
                ingested.stats.bad_lines += 1;
                continue;
            }
        };

        match window.contains(&record.time) {
            Ok(true) => ingested.records.push(record),
            Ok(false) => ingested.stats.outside_window += 1,
            Err(e) => {
                debug!(line = index + 1, error = %e, "Skipping bad line");
                ingested.stats.bad_lines += 1;
            }
        }
    }

    let stats = ingested.stats;
    if stats.total_lines > 0 && stats.bad_lines == stats.total_lines {
        warn!("Every one of the {} lines read was bad", stats.total_lines);
    }
    info!(
        total_lines = stats.total_lines,
        bad_lines = stats.bad_lines,
        outside_window = stats.outside_window,
        "Read interaction log ({} records in {})",
        stats.accepted(),
        window
    );

    ingested
}
