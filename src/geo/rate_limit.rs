//! Quota tracking for the geolocation service
//!
//! Every response carries `x-rl` (requests left in the current window) and
//! `x-ttl` (seconds until the window resets). The tracker keeps the latest
//! pair and turns it into a delay before the next request.

use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::{debug, warn};

pub const REMAINING_HEADER: &str = "x-rl";
pub const RESET_HEADER: &str = "x-ttl";

/// Published default allowance of the service
const DEFAULT_REMAINING: i64 = 15;
const DEFAULT_RESET_SECS: u64 = 60;

/// Longest reset window honoured; larger `x-ttl` values are clamped to it
pub const MAX_RESET_SECS: u64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaWindow {
    remaining: i64,
    reset_secs: u64,
}

impl Default for QuotaWindow {
    fn default() -> Self {
        Self {
            remaining: DEFAULT_REMAINING,
            reset_secs: DEFAULT_RESET_SECS,
        }
    }
}

impl QuotaWindow {
    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    pub fn reset_secs(&self) -> u64 {
        self.reset_secs
    }

    /// Record quota values; a missing value keeps the previous one
    pub fn observe(&mut self, remaining: Option<i64>, reset_secs: Option<u64>) {
        if let Some(remaining) = remaining {
            self.remaining = remaining;
        }
        if let Some(reset_secs) = reset_secs {
            if reset_secs > MAX_RESET_SECS {
                warn!("Geolocation reset window of {reset_secs}s clamped to {MAX_RESET_SECS}s");
            }
            self.reset_secs = reset_secs.min(MAX_RESET_SECS);
        }
    }

    /// Record quota values from response headers
    pub fn observe_headers(&mut self, headers: &HeaderMap) {
        let remaining = header_value(headers, REMAINING_HEADER);
        let reset_secs = header_value(headers, RESET_HEADER);
        self.observe(remaining, reset_secs);
        debug!(
            remaining = self.remaining,
            reset_secs = self.reset_secs,
            "Observed geolocation quota"
        );
    }

    /// How long to wait before the next request
    pub fn delay(&self) -> Duration {
        if self.remaining > 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(self.reset_secs.saturating_add(1))
        }
    }
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            debug!("Ignoring unparseable {name} header: {value}");
            None
        }
    }
}
