//! Fixed-width histograms of the percentage metrics.
//!
//! Values are scaled to percent before binning. Every bin is exactly one
//! width wide and half-open `[lower, lower + width)` except the last, which
//! also includes its upper edge. Values outside the requested range are
//! counted but not binned.

use ordered_float::OrderedFloat;
use realis_core::config::ChartConfig;
use realis_core::EnrichedTransaction;
use serde::Serialize;
use std::collections::BTreeMap;

/// Metric column a histogram is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HistogramMetric {
    /// Gain or loss between new sale and resale PSF.
    PriceDifferential,
    /// Compound annual growth over the holding period.
    AnnualizedGrowth,
}

impl HistogramMetric {
    /// Metric value of a row, in percent.
    #[inline]
    pub fn percent(self, row: &EnrichedTransaction) -> f64 {
        match self {
            HistogramMetric::PriceDifferential => row.price_differential * 100.0,
            HistogramMetric::AnnualizedGrowth => row.annualized_growth * 100.0,
        }
    }
}

/// One bin of a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Binned counts of one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    metric: HistogramMetric,
    lower: f64,
    /// Largest value accepted into a bin.
    limit: f64,
    bin_width: f64,
    bin_count: usize,
    /// Counts keyed by bin lower edge; empty bins are absent.
    counts: BTreeMap<OrderedFloat<f64>, u64>,
    out_of_range: u64,
}

impl Histogram {
    /// Bin values over `[lower, upper]` with a fixed width.
    ///
    /// The last bin ends on the first bin edge at or above `upper`, so a span
    /// that is not a multiple of the width gets one more full-width bin.
    pub fn with_range(
        metric: HistogramMetric,
        values: &[f64],
        lower: f64,
        upper: f64,
        bin_width: f64,
    ) -> Self {
        let bin_count = (((upper - lower) / bin_width - 1e-9).ceil() as usize).max(1);
        let mut hist = Self {
            metric,
            lower,
            limit: upper,
            bin_width,
            bin_count,
            counts: BTreeMap::new(),
            out_of_range: 0,
        };

        for &value in values {
            match hist.bin_key(value) {
                Some(key) => *hist.counts.entry(key).or_insert(0) += 1,
                None => hist.out_of_range += 1,
            }
        }
        hist
    }

    /// Build the chart histogram for a row set.
    ///
    /// Returns `None` for an empty row set. Price differential uses the fixed
    /// configured range; annualized growth starts at the bin edge at or below
    /// the smallest value and is clipped at the configured maximum.
    pub fn build(
        metric: HistogramMetric,
        rows: &[&EnrichedTransaction],
        config: &ChartConfig,
    ) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let values: Vec<f64> = rows.iter().map(|row| metric.percent(row)).collect();

        let hist = match metric {
            HistogramMetric::PriceDifferential => {
                let (lower, upper) = config.price_differential_range;
                Self::with_range(metric, &values, lower, upper, config.price_differential_bin_width)
            }
            HistogramMetric::AnnualizedGrowth => {
                let width = config.annualized_growth_bin_width;
                let clip = config.annualized_growth_clip_max;
                let (min, max) = values
                    .iter()
                    .filter(|&&v| v <= clip)
                    .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                        None => Some((v, v)),
                    })
                    .unwrap_or((clip - width, clip));

                let lower = (min / width).floor() * width;
                let upper = if max > lower { max } else { lower + width };
                Self::with_range(metric, &values, lower, upper, width)
            }
        };
        Some(hist)
    }

    /// Bin key (lower edge) for a value, or `None` if out of range.
    fn bin_key(&self, value: f64) -> Option<OrderedFloat<f64>> {
        if !(self.lower..=self.limit).contains(&value) {
            return None;
        }
        let idx = (((value - self.lower) / self.bin_width).floor() as usize).min(self.bin_count - 1);
        Some(OrderedFloat(self.edge(idx)))
    }

    fn edge(&self, idx: usize) -> f64 {
        self.lower + idx as f64 * self.bin_width
    }

    /// Every bin in order, including empty ones.
    pub fn bins(&self) -> Vec<HistogramBin> {
        (0..self.bin_count)
            .map(|idx| {
                let lower = self.edge(idx);
                HistogramBin {
                    lower,
                    upper: self.edge(idx + 1),
                    count: self.counts.get(&OrderedFloat(lower)).copied().unwrap_or(0),
                }
            })
            .collect()
    }

    /// Metric the histogram was built from.
    pub fn metric(&self) -> HistogramMetric {
        self.metric
    }

    /// Lower edge of the first bin.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper edge of the last bin.
    pub fn upper(&self) -> f64 {
        self.edge(self.bin_count)
    }

    /// Width of each bin.
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    /// Values that fell inside the range.
    pub fn binned_count(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Values that fell outside the range (or above the clip).
    pub fn out_of_range(&self) -> u64 {
        self.out_of_range
    }

    /// Largest bin count.
    pub fn max_count(&self) -> u64 {
        self.counts.values().copied().max().unwrap_or(0)
    }
}
