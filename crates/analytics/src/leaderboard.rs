//! Per-project performance leaderboard.
//!
//! Rows are grouped by (project, property type, planning area) and ranked by
//! median annualized growth, best first.

use chrono::{Datelike, NaiveDateTime};
use ordered_float::OrderedFloat;
use realis_core::config::SliceOrder;
use realis_core::EnrichedTransaction;
use realis_ingestion::metrics::round_dp;
use serde::Serialize;
use statrs::statistics::{Data, Median};
use std::collections::BTreeMap;

/// One leaderboard entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    #[serde(rename = "Project Name")]
    pub project_name: String,
    #[serde(rename = "Property Type")]
    pub property_type: String,
    #[serde(rename = "Planning Area")]
    pub planning_area: String,
    /// Rows in the group.
    #[serde(rename = "No. of Resale Transactions")]
    pub resale_count: usize,
    /// Median annualized growth in percent, one decimal.
    #[serde(rename = "Median Annualized Growth (%)")]
    pub median_annualized_growth_pct: f64,
    /// Median resale PSF rounded to the nearest dollar.
    #[serde(rename = "Median Resale Price")]
    pub median_resale_psf: i64,
    /// Year of the group's latest resale.
    #[serde(rename = "Last Resale Transaction")]
    pub last_resale_year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    project_name: String,
    property_type: String,
    planning_area: String,
}

#[derive(Debug)]
struct GroupAccumulator {
    growth: Vec<f64>,
    resale_psf: Vec<f64>,
    last_resale: NaiveDateTime,
}

impl GroupAccumulator {
    fn new(first: &EnrichedTransaction) -> Self {
        Self {
            growth: Vec::new(),
            resale_psf: Vec::new(),
            last_resale: first.resale_datetime,
        }
    }

    fn add(&mut self, row: &EnrichedTransaction) {
        self.growth.push(row.annualized_growth);
        self.resale_psf.push(row.resale_psf as f64);
        self.last_resale = self.last_resale.max(row.resale_datetime);
    }

    fn finish(self, key: GroupKey) -> LeaderboardRow {
        let resale_count = self.growth.len();
        let median_growth = Data::new(self.growth).median();
        let median_psf = Data::new(self.resale_psf).median();

        LeaderboardRow {
            project_name: key.project_name,
            property_type: key.property_type,
            planning_area: key.planning_area,
            resale_count,
            median_annualized_growth_pct: round_dp(median_growth * 100.0, 1),
            median_resale_psf: median_psf.round() as i64,
            last_resale_year: self.last_resale.year(),
        }
    }
}

/// Leaderboard sorted by median annualized growth, descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Leaderboard {
    rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    /// Group and rank a row set.
    ///
    /// Groups with equal median growth keep (project, type, area) order.
    pub fn build<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a EnrichedTransaction>,
    {
        let mut groups: BTreeMap<GroupKey, GroupAccumulator> = BTreeMap::new();

        for row in rows {
            let key = GroupKey {
                project_name: row.project_name.clone(),
                property_type: row.property_type.clone(),
                planning_area: row.planning_area.clone(),
            };
            groups
                .entry(key)
                .or_insert_with(|| GroupAccumulator::new(row))
                .add(row);
        }

        let mut rows: Vec<LeaderboardRow> = groups
            .into_iter()
            .map(|(key, acc)| acc.finish(key))
            .collect();
        rows.sort_by_key(|row| std::cmp::Reverse(OrderedFloat(row.median_annualized_growth_pct)));

        Self { rows }
    }

    /// All groups, best first.
    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.rows
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no group exists.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `n` best groups, best first.
    pub fn top(&self, n: usize) -> Vec<LeaderboardRow> {
        self.rows.iter().take(n).cloned().collect()
    }

    /// The `n` worst groups.
    ///
    /// `Descending` keeps leaderboard order (worst last); `Ascending` puts the
    /// worst group first.
    pub fn bottom(&self, n: usize, order: SliceOrder) -> Vec<LeaderboardRow> {
        let start = self.rows.len().saturating_sub(n);
        let mut tail = self.rows[start..].to_vec();
        if order == SliceOrder::Ascending {
            tail.reverse();
        }
        tail
    }
}
