use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hard cap on the number of addresses the geolocation provider accepts per request.
pub const MAX_GEO_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub geo: GeoConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// `http(s)://` URL or local path of the interaction log
    pub location: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    pub base_url: String,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub file_prefix: String,
}

impl GeoConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://ip-api.com";
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            batch_size: MAX_GEO_BATCH_SIZE,
            timeout_secs: 30,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_prefix: "likes".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let location =
            std::env::var("LIKES_LOG_SOURCE").unwrap_or_else(|_| "likes.log".to_string());

        let timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?;

        let base_url = std::env::var("GEO_API_BASE_URL")
            .unwrap_or_else(|_| GeoConfig::DEFAULT_BASE_URL.to_string());

        let requested_batch_size = std::env::var("GEO_BATCH_SIZE")
            .unwrap_or_else(|_| MAX_GEO_BATCH_SIZE.to_string())
            .parse::<usize>()
            .context("GEO_BATCH_SIZE must be a positive integer")?;
        let batch_size = clamp_batch_size(requested_batch_size);
        if batch_size != requested_batch_size {
            tracing::warn!(
                "GEO_BATCH_SIZE {requested_batch_size} is outside 1..={MAX_GEO_BATCH_SIZE}, using {batch_size}"
            );
        }

        let output_dir = std::env::var("REPORT_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let file_prefix =
            std::env::var("REPORT_FILE_PREFIX").unwrap_or_else(|_| "likes".to_string());

        Ok(Config {
            source: SourceConfig {
                location,
                timeout_secs,
            },
            geo: GeoConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                batch_size,
                timeout_secs,
            },
            report: ReportConfig {
                output_dir,
                file_prefix,
            },
        })
    }
}

pub fn clamp_batch_size(requested: usize) -> usize {
    requested.clamp(1, MAX_GEO_BATCH_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_size_never_exceeds_provider_cap() {
        assert_eq!(clamp_batch_size(0), 1);
        assert_eq!(clamp_batch_size(42), 42);
        assert_eq!(clamp_batch_size(100), 100);
        assert_eq!(clamp_batch_size(5000), MAX_GEO_BATCH_SIZE);
    }

    #[test]
    fn geo_defaults_match_provider_allowance() {
        let geo = GeoConfig::default();
        assert_eq!(geo.base_url, "http://ip-api.com");
        assert_eq!(geo.batch_size, 100);
    }
}
