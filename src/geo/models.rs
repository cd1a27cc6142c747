//! Wire types of the batch geolocation API and the merged location counts

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::models::{IpKey, LocationKey};

const SUCCESS_STATUS: &str = "success";

/// One element of a batch response, positionally aligned with the request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoEntry {
    /// `success` or a failure marker such as `fail`; empty when absent or null
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,

    /// Failure reason, only present when the lookup failed
    pub message: Option<String>,

    /// Address echoed back by the service
    pub query: Option<String>,

    pub city: Option<String>,
    pub region_name: Option<String>,
    pub country: Option<String>,
    pub continent: Option<String>,
    pub isp: Option<String>,
}

impl GeoEntry {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Location tuple; absent fields become empty strings
    pub fn location(&self) -> LocationKey {
        LocationKey {
            city: self.city.clone().unwrap_or_default(),
            region: self.region_name.clone().unwrap_or_default(),
            country: self.country.clone().unwrap_or_default(),
            continent: self.continent.clone().unwrap_or_default(),
            isp: self.isp.clone().unwrap_or_default(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-location interaction counts plus resolution bookkeeping
#[derive(Debug, Clone, Default)]
pub struct LocationCounts {
    counts: HashMap<LocationKey, u64>,
    requested_ips: usize,
    resolved_ips: usize,
}

impl LocationCounts {
    pub fn counts(&self) -> &HashMap<LocationKey, u64> {
        &self.counts
    }

    /// Addresses submitted for lookup, including those in failed batches
    pub fn requested_ips(&self) -> usize {
        self.requested_ips
    }

    pub fn resolved_ips(&self) -> usize {
        self.resolved_ips
    }

    pub fn add(&mut self, location: LocationKey, count: u64) {
        *self.counts.entry(location).or_insert(0) += count;
    }

    pub(crate) fn note_requested(&mut self, addresses: usize) {
        self.requested_ips += addresses;
    }

    /// Fold one successful batch response into the counts
    ///
    /// Entries pair with `batch` by position. Failed entries are logged and
    /// contribute nothing.
    pub fn merge_batch(&mut self, batch: &[(IpKey, u64)], entries: &[GeoEntry]) {
        if entries.len() != batch.len() {
            warn!(
                sent = batch.len(),
                received = entries.len(),
                "Geolocation response length differs from batch, merging aligned prefix only"
            );
        }

        for ((ip, count), entry) in batch.iter().zip(entries) {
            if !entry.is_success() {
                warn!(
                    status = %entry.status,
                    message = entry.message.as_deref().unwrap_or(""),
                    query = entry.query.as_deref().unwrap_or(ip.as_str()),
                    "Geolocation lookup failed"
                );
                continue;
            }

            self.add(entry.location(), *count);
            self.resolved_ips += 1;
        }
    }
}
