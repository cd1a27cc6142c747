//! Aggregation keys
//!
//! Every count map in the pipeline is keyed by one of these types. Keys are
//! plain owned strings so the maps can outlive the raw log text.

use serde::{Deserialize, Serialize};

/// Song identity: artist plus title
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SongKey {
    pub artist: String,
    pub title: String,
}

impl SongKey {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }

    /// Records with neither artist nor title are station noise
    pub fn is_blank(&self) -> bool {
        self.artist.is_empty() && self.title.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtistKey {
    pub artist: String,
}

impl ArtistKey {
    pub fn new(artist: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
        }
    }
}

/// Client address, lowercased so one address never lands in two buckets
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IpKey(String);

impl IpKey {
    pub fn new(ip: &str) -> Self {
        Self(ip.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resolved location of one or more client addresses
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationKey {
    pub city: String,
    pub region: String,
    pub country: String,
    pub continent: String,
    pub isp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_key_is_case_normalized() {
        assert_eq!(IpKey::new("2001:DB8::1"), IpKey::new("2001:db8::1"));
        assert_eq!(IpKey::new("2001:DB8::1").as_str(), "2001:db8::1");
    }

    #[test]
    fn blank_song_needs_both_fields_empty() {
        assert!(SongKey::new("", "").is_blank());
        assert!(!SongKey::new("Artist", "").is_blank());
        assert!(!SongKey::new("", "Title").is_blank());
    }
}
