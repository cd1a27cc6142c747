use anyhow::Context;
use reqwest::header::{HeaderValue, ACCEPT, CONNECTION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::{GeoEntry, LocationCounts};
use super::rate_limit::QuotaWindow;
use crate::config::{clamp_batch_size, GeoConfig};
use crate::models::IpKey;

const BATCH_FIELDS: &str = "city,continent,country,isp,message,query,regionName,status";

/// Why a whole batch produced no usable entries
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no response obtained: {0}")]
    NoResponse(#[source] reqwest::Error),
    #[error("error response {status}: {body}")]
    ErrorStatus { status: StatusCode, body: String },
    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

/// Client for the batch geolocation endpoint
pub struct GeoClient {
    client: Client,
    batch_url: String,
    batch_size: usize,
}

impl GeoClient {
    pub fn new(config: &GeoConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("liketally/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client for geolocation lookups")?;

        let batch_url = format!(
            "{}/batch?fields={}",
            config.base_url.trim_end_matches('/'),
            BATCH_FIELDS
        );

        Ok(Self {
            client,
            batch_url,
            batch_size: clamp_batch_size(config.batch_size),
        })
    }

    /// Resolve every address and merge its count into its location
    ///
    /// `ips` must already be in alphabetical order; batch boundaries follow
    /// it exactly. Batches run one after another; before every batch but the
    /// first the quota reported by the previous response decides whether to
    /// wait for the window to reset.
    pub async fn locate(&self, ips: &[(IpKey, u64)]) -> LocationCounts {
        let mut locations = LocationCounts::default();
        let mut quota = QuotaWindow::default();
        let batch_count = ips.len().div_ceil(self.batch_size);

        info!(
            "Resolving {} addresses in {} geolocation batches",
            ips.len(),
            batch_count
        );

        for (index, batch) in batches(ips, self.batch_size).enumerate() {
            if index > 0 {
                let delay = quota.delay();
                if !delay.is_zero() {
                    info!(
                        "Geolocation quota exhausted, waiting {}s before batch {}/{}",
                        delay.as_secs(),
                        index + 1,
                        batch_count
                    );
                    tokio::time::sleep(delay).await;
                }
            }

            locations.note_requested(batch.len());

            match self.send_batch(batch, &mut quota).await {
                Ok(entries) => {
                    debug!(
                        "Geolocation batch {}/{} returned {} entries",
                        index + 1,
                        batch_count,
                        entries.len()
                    );
                    locations.merge_batch(batch, &entries);
                }
                Err(e) => {
                    warn!(
                        addresses = batch.len(),
                        first = batch.first().map(|(ip, _)| ip.as_str()).unwrap_or(""),
                        "Geolocation batch {}/{} failed, skipping it: {}",
                        index + 1,
                        batch_count,
                        e
                    );
                }
            }
        }

        info!(
            "Located {} of {} addresses in {} distinct locations",
            locations.resolved_ips(),
            locations.requested_ips(),
            locations.counts().len()
        );

        locations
    }

    /// Send one batch and decode its entries
    ///
    /// Quota headers are recorded from any response obtained, including
    /// error responses.
    pub async fn send_batch(
        &self,
        batch: &[(IpKey, u64)],
        quota: &mut QuotaWindow,
    ) -> Result<Vec<GeoEntry>, BatchError> {
        let body: Vec<&str> = batch.iter().map(|(ip, _)| ip.as_str()).collect();

        let response = self
            .client
            .post(&self.batch_url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(CONNECTION, HeaderValue::from_static("Keep-Alive"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&body)
            .send()
            .await
            .map_err(BatchError::NoResponse)?;

        quota.observe_headers(response.headers());

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BatchError::ErrorStatus { status, body });
        }

        let text = response
            .text()
            .await
            .map_err(|e| BatchError::MalformedBody(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| BatchError::MalformedBody(e.to_string()))
    }
}

/// Split alphabetized addresses into request-sized batches
pub fn batches(ips: &[(IpKey, u64)], batch_size: usize) -> std::slice::Chunks<'_, (IpKey, u64)> {
    ips.chunks(clamp_batch_size(batch_size))
}
