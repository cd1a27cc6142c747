//! Count aggregation over windowed interaction records
//!
//! Song counts are signed: a like adds one, an unlike takes one away. Only
//! songs that end up net-positive (and are not blank) survive, and artist
//! totals are derived from those survivors alone. Address counts are plain
//! occurrence counts over every windowed record.

use std::collections::HashMap;

use crate::models::{ArtistKey, InteractionRecord, IpKey, SongKey, Toggle};

/// Final, read-only count maps for one run
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    songs: HashMap<SongKey, i64>,
    artists: HashMap<ArtistKey, u64>,
    ips: HashMap<IpKey, u64>,
    like_count: u64,
    unlike_count: u64,
}

impl Aggregation {
    /// Fold records into count maps in a single pass
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a InteractionRecord>,
    {
        let mut net: HashMap<SongKey, i64> = HashMap::new();
        let mut ips: HashMap<IpKey, u64> = HashMap::new();
        let mut like_count = 0;
        let mut unlike_count = 0;

        for record in records {
            match record.toggle {
                Toggle::Like => like_count += 1,
                Toggle::Unlike => unlike_count += 1,
            }

            *net
                .entry(SongKey::new(record.artist.as_str(), record.title.as_str()))
                .or_insert(0) += record.toggle.delta();

            *ips.entry(IpKey::new(&record.ip)).or_insert(0) += 1;
        }

        let songs: HashMap<SongKey, i64> = net
            .into_iter()
            .filter(|(song, count)| *count > 0 && !song.is_blank())
            .collect();

        let mut artists: HashMap<ArtistKey, u64> = HashMap::new();
        for (song, count) in &songs {
            *artists.entry(ArtistKey::new(song.artist.as_str())).or_insert(0) += *count as u64;
        }

        Self {
            songs,
            artists,
            ips,
            like_count,
            unlike_count,
        }
    }

    /// Net-positive, non-blank songs
    pub fn songs(&self) -> &HashMap<SongKey, i64> {
        &self.songs
    }

    pub fn artists(&self) -> &HashMap<ArtistKey, u64> {
        &self.artists
    }

    pub fn ips(&self) -> &HashMap<IpKey, u64> {
        &self.ips
    }

    /// Likes among windowed records, before any song filtering
    pub fn like_count(&self) -> u64 {
        self.like_count
    }

    /// Unlikes among windowed records, before any song filtering
    pub fn unlike_count(&self) -> u64 {
        self.unlike_count
    }
}
