//! Sorted, cached projections of the aggregated counts
//!
//! Each view is materialized the first time it is requested and reused for
//! the rest of the run. Every ordering is total: after the documented
//! primary order and tie-breaks, keys fall back to a raw comparison of their
//! fields so that two keys differing only in letter case still sort the same
//! way on every run.

use std::cmp::Reverse;
use std::sync::OnceLock;

use crate::aggregate::Aggregation;
use crate::geo::LocationCounts;
use crate::models::{ArtistKey, IpKey, LocationKey, SongKey};

/// A `(key, count)` sequence ready for rendering
pub type View<K, C> = [(K, C)];

/// Views over the song, artist and address counts
pub struct Views<'a> {
    aggregation: &'a Aggregation,
    songs_by_popularity: OnceLock<Vec<(SongKey, i64)>>,
    songs_alphabetical: OnceLock<Vec<(SongKey, i64)>>,
    artists_by_popularity: OnceLock<Vec<(ArtistKey, u64)>>,
    artists_alphabetical: OnceLock<Vec<(ArtistKey, u64)>>,
    ips_by_frequency: OnceLock<Vec<(IpKey, u64)>>,
    ips_alphabetical: OnceLock<Vec<(IpKey, u64)>>,
}

impl<'a> Views<'a> {
    pub fn new(aggregation: &'a Aggregation) -> Self {
        Self {
            aggregation,
            songs_by_popularity: OnceLock::new(),
            songs_alphabetical: OnceLock::new(),
            artists_by_popularity: OnceLock::new(),
            artists_alphabetical: OnceLock::new(),
            ips_by_frequency: OnceLock::new(),
            ips_alphabetical: OnceLock::new(),
        }
    }

    pub fn aggregation(&self) -> &'a Aggregation {
        self.aggregation
    }

    /// Net count desc, then artist and title case-insensitively
    pub fn songs_by_popularity(&self) -> &View<SongKey, i64> {
        self.songs_by_popularity.get_or_init(|| {
            let mut view = collect(self.aggregation.songs());
            view.sort_by_cached_key(|(song, count)| {
                (
                    Reverse(*count),
                    song.artist.to_lowercase(),
                    song.title.to_lowercase(),
                    song.clone(),
                )
            });
            view
        })
    }

    /// Artist then title case-insensitively, then net count asc
    pub fn songs_alphabetical(&self) -> &View<SongKey, i64> {
        self.songs_alphabetical.get_or_init(|| {
            let mut view = collect(self.aggregation.songs());
            view.sort_by_cached_key(|(song, count)| {
                (
                    song.artist.to_lowercase(),
                    song.title.to_lowercase(),
                    *count,
                    song.clone(),
                )
            });
            view
        })
    }

    pub fn artists_by_popularity(&self) -> &View<ArtistKey, u64> {
        self.artists_by_popularity.get_or_init(|| {
            let mut view = collect(self.aggregation.artists());
            view.sort_by_cached_key(|(artist, count)| {
                (
                    Reverse(*count),
                    artist.artist.to_lowercase(),
                    artist.clone(),
                )
            });
            view
        })
    }

    pub fn artists_alphabetical(&self) -> &View<ArtistKey, u64> {
        self.artists_alphabetical.get_or_init(|| {
            let mut view = collect(self.aggregation.artists());
            view.sort_by_cached_key(|(artist, count)| {
                (artist.artist.to_lowercase(), *count, artist.clone())
            });
            view
        })
    }

    pub fn ips_by_frequency(&self) -> &View<IpKey, u64> {
        self.ips_by_frequency.get_or_init(|| {
            let mut view = collect(self.aggregation.ips());
            view.sort_by(|(a, a_count), (b, b_count)| {
                b_count.cmp(a_count).then_with(|| a.cmp(b))
            });
            view
        })
    }

    /// Address string asc; batch composition for geolocation follows this order
    pub fn ips_alphabetical(&self) -> &View<IpKey, u64> {
        self.ips_alphabetical.get_or_init(|| {
            let mut view = collect(self.aggregation.ips());
            view.sort_by(|(a, a_count), (b, b_count)| a.cmp(b).then(a_count.cmp(b_count)));
            view
        })
    }
}

/// View over the resolved location counts
pub struct LocationViews<'a> {
    locations: &'a LocationCounts,
    by_frequency: OnceLock<Vec<(LocationKey, u64)>>,
}

impl<'a> LocationViews<'a> {
    pub fn new(locations: &'a LocationCounts) -> Self {
        Self {
            locations,
            by_frequency: OnceLock::new(),
        }
    }

    /// Count desc, then city, region, country, continent and isp asc
    pub fn by_frequency(&self) -> &View<LocationKey, u64> {
        self.by_frequency.get_or_init(|| {
            let mut view = collect(self.locations.counts());
            // LocationKey orders by its fields in declaration order
            view.sort_by(|(a, a_count), (b, b_count)| {
                b_count.cmp(a_count).then_with(|| a.cmp(b))
            });
            view
        })
    }
}

fn collect<K: Clone, C: Copy>(map: &std::collections::HashMap<K, C>) -> Vec<(K, C)> {
    map.iter().map(|(key, count)| (key.clone(), *count)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InteractionRecord, Toggle};

    fn likes(entries: &[(&str, &str, &str, usize)]) -> Aggregation {
        let mut records = Vec::new();
        for (ip, artist, title, times) in entries {
            for _ in 0..*times {
                records.push(InteractionRecord {
                    time: "2024-01-05T10:00:00".to_string(),
                    ip: ip.to_string(),
                    toggle: Toggle::Like,
                    artist: artist.to_string(),
                    title: title.to_string(),
                });
            }
        }
        Aggregation::from_records(&records)
    }

    fn song_names(view: &View<SongKey, i64>) -> Vec<(String, String, i64)> {
        view.iter()
            .map(|(song, count)| (song.artist.clone(), song.title.clone(), *count))
            .collect()
    }

    #[test]
    fn songs_by_popularity_breaks_ties_case_insensitively() {
        let agg = likes(&[
            ("1.1.1.1", "beta", "One", 2),
            ("1.1.1.1", "Alpha", "zulu", 2),
            ("1.1.1.1", "alpha", "Yankee", 2),
            ("1.1.1.1", "Gamma", "Top", 5),
        ]);
        let views = Views::new(&agg);

        assert_eq!(
            song_names(views.songs_by_popularity()),
            vec![
                ("Gamma".to_string(), "Top".to_string(), 5),
                ("alpha".to_string(), "Yankee".to_string(), 2),
                ("Alpha".to_string(), "zulu".to_string(), 2),
                ("beta".to_string(), "One".to_string(), 2),
            ]
        );
    }

    #[test]
    fn songs_alphabetical_ignores_case() {
        let agg = likes(&[
            ("1.1.1.1", "beta", "One", 1),
            ("1.1.1.1", "Alpha", "b side", 3),
            ("1.1.1.1", "alpha", "A Side", 1),
        ]);
        let views = Views::new(&agg);

        assert_eq!(
            song_names(views.songs_alphabetical()),
            vec![
                ("alpha".to_string(), "A Side".to_string(), 1),
                ("Alpha".to_string(), "b side".to_string(), 3),
                ("beta".to_string(), "One".to_string(), 1),
            ]
        );
    }

    #[test]
    fn artist_views_order_by_count_and_name() {
        let agg = likes(&[
            ("1.1.1.1", "zed", "a", 3),
            ("1.1.1.1", "Amy", "a", 1),
            ("1.1.1.1", "Amy", "b", 2),
            ("1.1.1.1", "bob", "a", 1),
        ]);
        let views = Views::new(&agg);

        let popular: Vec<_> = views
            .artists_by_popularity()
            .iter()
            .map(|(a, c)| (a.artist.as_str(), *c))
            .collect();
        assert_eq!(popular, vec![("Amy", 3), ("zed", 3), ("bob", 1)]);

        let alphabetical: Vec<_> = views
            .artists_alphabetical()
            .iter()
            .map(|(a, c)| (a.artist.as_str(), *c))
            .collect();
        assert_eq!(alphabetical, vec![("Amy", 3), ("bob", 1), ("zed", 3)]);
    }

    #[test]
    fn ip_views_order_by_raw_string() {
        let agg = likes(&[
            ("10.0.0.1", "a", "a", 1),
            ("9.0.0.1", "a", "a", 2),
            ("2.0.0.1", "a", "a", 2),
        ]);
        let views = Views::new(&agg);

        let frequency: Vec<_> = views
            .ips_by_frequency()
            .iter()
            .map(|(ip, c)| (ip.as_str(), *c))
            .collect();
        assert_eq!(frequency, vec![("2.0.0.1", 2), ("9.0.0.1", 2), ("10.0.0.1", 1)]);

        let alphabetical: Vec<_> = views
            .ips_alphabetical()
            .iter()
            .map(|(ip, _)| ip.as_str())
            .collect();
        assert_eq!(alphabetical, vec!["10.0.0.1", "2.0.0.1", "9.0.0.1"]);
    }

    #[test]
    fn views_are_cached_and_repeatable() {
        let agg = likes(&[
            ("1.1.1.1", "a", "x", 1),
            ("2.2.2.2", "b", "y", 1),
            ("3.3.3.3", "c", "z", 1),
        ]);
        let views = Views::new(&agg);

        let first = views.songs_by_popularity();
        let second = views.songs_by_popularity();
        assert!(std::ptr::eq(first, second));

        let fresh = Views::new(&agg);
        assert_eq!(first, fresh.songs_by_popularity());
        assert_eq!(views.ips_alphabetical(), fresh.ips_alphabetical());
    }

    #[test]
    fn locations_order_by_count_then_fields() {
        let place = |city: &str, isp: &str| LocationKey {
            city: city.to_string(),
            region: "Region".to_string(),
            country: "Country".to_string(),
            continent: "Europe".to_string(),
            isp: isp.to_string(),
        };
        let mut counts = LocationCounts::default();
        counts.add(place("Bergen", "NetB"), 1);
        counts.add(place("Aarhus", "NetZ"), 4);
        counts.add(place("Aarhus", "NetA"), 4);
        counts.add(place("Oslo", "NetA"), 7);

        let views = LocationViews::new(&counts);
        let order: Vec<_> = views
            .by_frequency()
            .iter()
            .map(|(l, c)| (l.city.as_str(), l.isp.as_str(), *c))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Oslo", "NetA", 7),
                ("Aarhus", "NetA", 4),
                ("Aarhus", "NetZ", 4),
                ("Bergen", "NetB", 1),
            ]
        );
    }
}
