//! Query-time analytics for the realis-explorer system.
//!
//! This crate provides:
//! - Conjunctive row filtering from the six query criteria
//! - Descriptive statistics of the metric columns
//! - Per-project leaderboard ranked by median annualized growth
//! - Fixed-width histograms for charting

pub mod filter;
pub mod stats;
pub mod leaderboard;
pub mod histogram;
pub mod engine;

pub use filter::{FilterCriteria, QueryRequest};
pub use stats::{ColumnStats, StatsSummary};
pub use leaderboard::{Leaderboard, LeaderboardRow};
pub use histogram::{Histogram, HistogramBin, HistogramMetric};
pub use engine::{QueryEngine, QueryKind, QueryResponse};
