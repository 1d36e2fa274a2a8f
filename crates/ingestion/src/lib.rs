//! Data ingestion and enrichment for the realis-explorer system.
//!
//! This crate handles:
//! - Raw and enriched table loading (CSV)
//! - Cleaning (comma stripping, numeric coercion, strata filter)
//! - New-sale to resale pairing
//! - Market segment assignment
//! - Holding period, price differential and annualized growth

pub mod loader;
pub mod cleaning;
pub mod pairing;
pub mod segment;
pub mod metrics;
pub mod pipeline;

pub use loader::TransactionTable;
pub use cleaning::Cleaner;
pub use metrics::MetricsDeriver;
pub use pipeline::{Pipeline, PipelineReport};
