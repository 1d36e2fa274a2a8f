//! Query engine over the enriched table.
//!
//! Every query filters the shared table afresh and then aggregates the
//! filtered view. Nothing is cached between queries.

use crate::{
    filter::{FilterCriteria, QueryRequest},
    histogram::{Histogram, HistogramMetric},
    leaderboard::{Leaderboard, LeaderboardRow},
    stats::{self, StatsSummary},
};
use realis_core::{Config, EnrichedTransaction, Result};
use realis_ingestion::TransactionTable;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// What a query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Descriptive statistics of the metric columns.
    Stats,
    /// Best leaderboard slice.
    TopPerformers,
    /// Worst leaderboard slice.
    BottomPerformers,
    /// The filtered rows themselves.
    Rows,
}

/// Result of a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResponse<'a> {
    Stats(StatsSummary),
    Performers(Vec<LeaderboardRow>),
    Rows(Vec<&'a EnrichedTransaction>),
}

/// Read-only query engine.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    table: TransactionTable,
    config: Config,
}

impl QueryEngine {
    /// Create an engine over an already loaded table.
    pub fn new(table: TransactionTable, config: Config) -> Self {
        Self { table, config }
    }

    /// Load the enriched table once and wrap it.
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let table = TransactionTable::load(path)?;
        Ok(Self::new(table, config))
    }

    /// The underlying table.
    pub fn table(&self) -> &TransactionTable {
        &self.table
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse a request using the configured wildcard and delimiter.
    pub fn criteria(&self, request: &QueryRequest) -> Result<FilterCriteria> {
        request.criteria(&self.config.query)
    }

    /// Rows matching the criteria, in table order.
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<&EnrichedTransaction> {
        let rows = criteria.apply(&self.table);
        debug!(matched = rows.len(), total = self.table.len(), "filtered table");
        rows
    }

    /// Descriptive statistics of the filtered rows.
    pub fn stats(&self, criteria: &FilterCriteria) -> StatsSummary {
        stats::describe(&self.filter(criteria))
    }

    /// Full leaderboard of the filtered rows.
    pub fn leaderboard(&self, criteria: &FilterCriteria) -> Leaderboard {
        Leaderboard::build(self.filter(criteria))
    }

    /// Best groups, best first.
    pub fn top_performers(&self, criteria: &FilterCriteria) -> Vec<LeaderboardRow> {
        self.leaderboard(criteria).top(self.config.leaderboard.slice_len)
    }

    /// Worst groups, in the configured bottom order.
    pub fn bottom_performers(&self, criteria: &FilterCriteria) -> Vec<LeaderboardRow> {
        let leaderboard = &self.config.leaderboard;
        self.leaderboard(criteria)
            .bottom(leaderboard.slice_len, leaderboard.bottom_order)
    }

    /// Filtered rows for charting or export.
    pub fn rows(&self, criteria: &FilterCriteria) -> Vec<&EnrichedTransaction> {
        self.filter(criteria)
    }

    /// Histogram of one metric; `None` if nothing matches.
    pub fn histogram(&self, criteria: &FilterCriteria, metric: HistogramMetric) -> Option<Histogram> {
        Histogram::build(metric, &self.filter(criteria), &self.config.charts)
    }

    /// Run a query from the six criteria strings.
    pub fn query(&self, request: &QueryRequest, kind: QueryKind) -> Result<QueryResponse<'_>> {
        let criteria = self.criteria(request)?;
        Ok(match kind {
            QueryKind::Stats => QueryResponse::Stats(self.stats(&criteria)),
            QueryKind::TopPerformers => QueryResponse::Performers(self.top_performers(&criteria)),
            QueryKind::BottomPerformers => QueryResponse::Performers(self.bottom_performers(&criteria)),
            QueryKind::Rows => QueryResponse::Rows(self.rows(&criteria)),
        })
    }

    /// Sorted distinct project names.
    pub fn project_names(&self) -> Vec<String> {
        distinct(self.table.iter().map(|row| row.project_name.as_str()))
    }

    /// Project names preceded by the wildcard, for a selection list.
    pub fn project_options(&self) -> Vec<String> {
        let mut options = vec![self.config.query.wildcard.clone()];
        options.extend(self.project_names());
        options
    }

    /// Sorted distinct planning areas.
    pub fn planning_areas(&self) -> Vec<String> {
        distinct(self.table.iter().map(|row| row.planning_area.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
