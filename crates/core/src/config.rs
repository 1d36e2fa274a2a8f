//! Configuration structures for the realis-explorer system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration.
///
/// Every section falls back to its defaults, so a JSON file only needs the
/// keys it wants to override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Table file locations.
    pub data: DataConfig,
    /// Cleaning stage labels and formats.
    pub cleaning: CleaningConfig,
    /// Query boundary parsing.
    pub query: QueryConfig,
    /// Leaderboard slicing.
    pub leaderboard: LeaderboardConfig,
    /// Histogram binning and rendering.
    pub charts: ChartConfig,
}

impl Config {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the defaults always satisfy but a file might not.
    pub fn validate(&self) -> Result<()> {
        let charts = &self.charts;
        if charts.price_differential_bin_width <= 0.0 || charts.annualized_growth_bin_width <= 0.0 {
            return Err(Error::config("histogram bin widths must be positive"));
        }
        if charts.price_differential_range.0 >= charts.price_differential_range.1 {
            return Err(Error::config(format!(
                "price differential range is empty: {:?}",
                charts.price_differential_range
            )));
        }
        if self.leaderboard.slice_len == 0 {
            return Err(Error::config("leaderboard slice_len must be at least 1"));
        }
        if self.query.wildcard.is_empty() {
            return Err(Error::config("query wildcard must not be empty"));
        }
        Ok(())
    }
}

/// Table file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Raw transaction export.
    pub raw_path: PathBuf,
    /// Enriched table written by the pipeline and read by queries.
    pub processed_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from("data/realis.csv"),
            processed_path: PathBuf::from("data/realis_processed.csv"),
        }
    }
}

/// Cleaning stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Area-type category retained by cleaning.
    pub strata_label: String,
    /// Property type folded into `condominium_label`.
    pub apartment_label: String,
    /// Canonical condominium property type.
    pub condominium_label: String,
    /// chrono format of the raw `Sale Date` column.
    pub sale_date_format: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            strata_label: "Strata".to_string(),
            apartment_label: "Apartment".to_string(),
            condominium_label: "Condominium".to_string(),
            sale_date_format: "%d/%m/%Y".to_string(),
        }
    }
}

/// Query boundary configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Sentinel meaning "no filtering" for an optional criterion.
    pub wildcard: String,
    /// Separator between planning-area names.
    pub area_delimiter: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            wildcard: "All".to_string(),
            area_delimiter: ",".to_string(),
        }
    }
}

/// Order of the bottom leaderboard slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceOrder {
    /// Tail of the descending leaderboard, worst row last.
    #[default]
    Descending,
    /// Worst row first.
    Ascending,
}

/// Leaderboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Rows in the top and bottom slices.
    pub slice_len: usize,
    /// Order of the bottom slice.
    pub bottom_order: SliceOrder,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            slice_len: 10,
            bottom_order: SliceOrder::Descending,
        }
    }
}

/// Histogram configuration. All values are in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Bin width for price differential.
    pub price_differential_bin_width: f64,
    /// Fixed (lower, upper) range for price differential.
    pub price_differential_range: (f64, f64),
    /// Bin width for annualized growth.
    pub annualized_growth_bin_width: f64,
    /// Annualized growth values above this are clipped.
    pub annualized_growth_clip_max: f64,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Bar fill for the price differential chart.
    pub price_differential_color: String,
    /// Bar fill for the annualized growth chart.
    pub annualized_growth_color: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            price_differential_bin_width: 1.0,
            price_differential_range: (-50.0, 50.0),
            annualized_growth_bin_width: 0.5,
            annualized_growth_clip_max: 100.0,
            width: 640,
            height: 480,
            price_differential_color: "#b35900".to_string(),
            annualized_growth_color: "#007399".to_string(),
        }
    }
}
