pub mod aggregate;
pub mod config;
pub mod geo;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod views;
