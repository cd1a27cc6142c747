//! Address geolocation through a rate-limited batch lookup service
//!
//! Addresses are resolved strictly one batch at a time, in alphabetical
//! order, and each batch's per-address counts are folded into location
//! counts. A failed batch or a failed address is logged and skipped; it
//! never aborts the run.

pub mod client;
pub mod models;
pub mod rate_limit;

pub use client::{batches, BatchError, GeoClient};
pub use models::{GeoEntry, LocationCounts};
pub use rate_limit::QuotaWindow;
