//! Upstream interaction log retrieval
//!
//! The log is read exactly once per run, either over HTTP(S) or from a local
//! file. Any failure here is fatal for the run.

use anyhow::{Context, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::config::SourceConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    Url(String),
    File(PathBuf),
}

impl LogSource {
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            LogSource::Url(location.to_string())
        } else {
            LogSource::File(PathBuf::from(location))
        }
    }
}

/// Fetch the whole interaction log as text
pub async fn fetch_log(config: &SourceConfig) -> Result<String> {
    match LogSource::parse(&config.location) {
        LogSource::Url(url) => {
            let client = Client::builder()
                .user_agent(concat!("liketally/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .context("failed to build HTTP client for the interaction log")?;

            let text = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("failed to request interaction log from {url}"))?
                .error_for_status()
                .with_context(|| format!("interaction log endpoint {url} returned an error status"))?
                .text()
                .await
                .with_context(|| format!("failed to read interaction log body from {url}"))?;

            info!("Fetched interaction log from {} ({} bytes)", url, text.len());
            Ok(text)
        }
        LogSource::File(path) => {
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read interaction log at {}", path.display()))?;

            info!(
                "Read interaction log from {} ({} bytes)",
                path.display(),
                text.len()
            );
            Ok(text)
        }
    }
}
