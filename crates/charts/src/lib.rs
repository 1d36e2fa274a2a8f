//! Histogram chart rendering for the realis-explorer system.
//!
//! Charts are drawn with plotters and encoded as PNG images.

pub mod png;

pub use png::{parse_color, render_histogram, write_chart, ChartLabels};

use realis_analytics::{FilterCriteria, HistogramMetric, QueryEngine};
use realis_core::Result;

/// Render the chart of one metric for a query; `None` if nothing matches.
pub fn render_query(
    engine: &QueryEngine,
    criteria: &FilterCriteria,
    metric: HistogramMetric,
) -> Result<Option<Vec<u8>>> {
    engine
        .histogram(criteria, metric)
        .map(|hist| render_histogram(&hist, &engine.config().charts))
        .transpose()
}
