//! Descriptive statistics over a filtered row set.
//!
//! Undefined statistics (anything on an empty set, the standard deviation of
//! a single value) are reported as zero.

use realis_core::EnrichedTransaction;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Summary of one numeric column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub p25: f64,
    #[serde(rename = "50%")]
    pub p50: f64,
    #[serde(rename = "75%")]
    pub p75: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Describe a column of values.
    pub fn describe(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Self {
            count: values.len(),
            mean: or_zero(values.iter().mean()),
            std: or_zero(values.iter().std_dev()),
            min: sorted[0],
            p25: percentile(&sorted, 0.25),
            p50: percentile(&sorted, 0.50),
            p75: percentile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        }
    }
}

/// Statistics for the three metric columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatsSummary {
    #[serde(rename = "Price Differential (%)")]
    pub price_differential: ColumnStats,
    #[serde(rename = "Annualized Growth")]
    pub annualized_growth: ColumnStats,
    #[serde(rename = "Property Age (Years)")]
    pub property_age: ColumnStats,
}

impl StatsSummary {
    /// Number of transactions summarised.
    pub fn count(&self) -> usize {
        self.price_differential.count
    }
}

/// Describe the metric columns of a row set.
pub fn describe(rows: &[&EnrichedTransaction]) -> StatsSummary {
    let column = |f: fn(&EnrichedTransaction) -> f64| -> ColumnStats {
        let values: Vec<f64> = rows.iter().map(|row| f(row)).collect();
        ColumnStats::describe(&values)
    };

    StatsSummary {
        price_differential: column(|r| r.price_differential),
        annualized_growth: column(|r| r.annualized_growth),
        property_age: column(|r| r.property_age_years),
    }
}

/// Percentile of sorted values, linearly interpolated between closest ranks.
///
/// `q` is in [0, 1]. Returns 0 for an empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

fn or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
