//! Data models shared by ingestion, aggregation and reporting

pub mod interaction;
pub mod keys;

pub use interaction::{InteractionRecord, Toggle};
pub use keys::{ArtistKey, IpKey, LocationKey, SongKey};
