//! PyO3 bindings for the realis-explorer query engine.
//!
//! Exposes to Python:
//! - Enriched-table build from a raw export
//! - Option lists for selection widgets
//! - Statistics, leaderboards and histogram charts for a query

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use realis_analytics::{
    ColumnStats as RustColumnStats, FilterCriteria, HistogramMetric, LeaderboardRow as RustLeaderboardRow,
    QueryEngine, QueryKind, QueryRequest, StatsSummary as RustStatsSummary,
};
use realis_core::{Config, Error};
use realis_ingestion::{Pipeline, PipelineReport as RustPipelineReport};

fn to_py_err(err: Error) -> PyErr {
    match err {
        Error::Io(e) => PyIOError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// Summary of one numeric column.
#[pyclass]
#[derive(Clone)]
pub struct ColumnStats {
    #[pyo3(get)]
    pub count: usize,
    #[pyo3(get)]
    pub mean: f64,
    #[pyo3(get)]
    pub std: f64,
    #[pyo3(get)]
    pub min: f64,
    #[pyo3(get)]
    pub p25: f64,
    #[pyo3(get)]
    pub p50: f64,
    #[pyo3(get)]
    pub p75: f64,
    #[pyo3(get)]
    pub max: f64,
}

#[pymethods]
impl ColumnStats {
    fn __repr__(&self) -> String {
        format!(
            "ColumnStats(count={}, mean={:.4}, std={:.4}, min={:.4}, max={:.4})",
            self.count, self.mean, self.std, self.min, self.max
        )
    }
}

impl From<RustColumnStats> for ColumnStats {
    fn from(s: RustColumnStats) -> Self {
        ColumnStats {
            count: s.count,
            mean: s.mean,
            std: s.std,
            min: s.min,
            p25: s.p25,
            p50: s.p50,
            p75: s.p75,
            max: s.max,
        }
    }
}

/// Statistics for the three metric columns.
#[pyclass]
#[derive(Clone)]
pub struct StatsSummary {
    #[pyo3(get)]
    pub price_differential: ColumnStats,
    #[pyo3(get)]
    pub annualized_growth: ColumnStats,
    #[pyo3(get)]
    pub property_age: ColumnStats,
}

#[pymethods]
impl StatsSummary {
    #[getter]
    fn count(&self) -> usize {
        self.price_differential.count
    }
}

impl From<RustStatsSummary> for StatsSummary {
    fn from(s: RustStatsSummary) -> Self {
        StatsSummary {
            price_differential: s.price_differential.into(),
            annualized_growth: s.annualized_growth.into(),
            property_age: s.property_age.into(),
        }
    }
}

/// One leaderboard entry.
#[pyclass]
#[derive(Clone)]
pub struct LeaderboardRow {
    #[pyo3(get)]
    pub project_name: String,
    #[pyo3(get)]
    pub property_type: String,
    #[pyo3(get)]
    pub planning_area: String,
    #[pyo3(get)]
    pub resale_count: usize,
    #[pyo3(get)]
    pub median_annualized_growth_pct: f64,
    #[pyo3(get)]
    pub median_resale_psf: i64,
    #[pyo3(get)]
    pub last_resale_year: i32,
}

#[pymethods]
impl LeaderboardRow {
    fn __repr__(&self) -> String {
        format!(
            "LeaderboardRow(project_name={:?}, growth={:.1}%, resales={})",
            self.project_name, self.median_annualized_growth_pct, self.resale_count
        )
    }
}

impl From<RustLeaderboardRow> for LeaderboardRow {
    fn from(r: RustLeaderboardRow) -> Self {
        LeaderboardRow {
            project_name: r.project_name,
            property_type: r.property_type,
            planning_area: r.planning_area,
            resale_count: r.resale_count,
            median_annualized_growth_pct: r.median_annualized_growth_pct,
            median_resale_psf: r.median_resale_psf,
            last_resale_year: r.last_resale_year,
        }
    }
}

/// Row counts after each pipeline stage.
#[pyclass]
#[derive(Clone)]
pub struct PipelineReport {
    #[pyo3(get)]
    pub raw_rows: usize,
    #[pyo3(get)]
    pub cleaned_rows: usize,
    #[pyo3(get)]
    pub paired_rows: usize,
    #[pyo3(get)]
    pub enriched_rows: usize,
}

impl From<RustPipelineReport> for PipelineReport {
    fn from(r: RustPipelineReport) -> Self {
        PipelineReport {
            raw_rows: r.raw_rows,
            cleaned_rows: r.cleaned_rows,
            paired_rows: r.paired_rows,
            enriched_rows: r.enriched_rows,
        }
    }
}

// ============================================================================
// Python-exposed Engine Classes
// ============================================================================

/// Query engine over an enriched table, loaded once.
#[pyclass]
pub struct PyQueryEngine {
    inner: QueryEngine,
}

impl PyQueryEngine {
    fn criteria(
        &self,
        project_name: &str,
        property_type: &str,
        planning_area: &str,
        size_min: &str,
        size_max: &str,
        min_new_sale_year: &str,
    ) -> PyResult<FilterCriteria> {
        let request = QueryRequest::new(
            project_name,
            property_type,
            planning_area,
            size_min,
            size_max,
            min_new_sale_year,
        );
        self.inner.criteria(&request).map_err(to_py_err)
    }

    fn chart<'py>(
        &self,
        py: Python<'py>,
        criteria: &FilterCriteria,
        metric: HistogramMetric,
    ) -> PyResult<Option<Bound<'py, PyBytes>>> {
        let png = realis_charts::render_query(&self.inner, criteria, metric).map_err(to_py_err)?;
        Ok(png.map(|bytes| PyBytes::new_bound(py, &bytes)))
    }
}

#[pymethods]
impl PyQueryEngine {
    #[new]
    #[pyo3(signature = (path, config_path=None))]
    fn new(path: &str, config_path: Option<&str>) -> PyResult<Self> {
        let config = load_config(config_path)?;
        let inner = QueryEngine::open(path, config).map_err(to_py_err)?;
        Ok(PyQueryEngine { inner })
    }

    /// Number of rows in the enriched table.
    fn __len__(&self) -> usize {
        self.inner.table().len()
    }

    /// Project names preceded by the wildcard.
    fn project_options(&self) -> Vec<String> {
        self.inner.project_options()
    }

    /// Sorted distinct planning areas.
    fn planning_areas(&self) -> Vec<String> {
        self.inner.planning_areas()
    }

    /// Descriptive statistics for a query.
    #[pyo3(signature = (project_name="All", property_type="All", planning_area="All", size_min="100", size_max="8000", min_new_sale_year="All"))]
    fn stats(
        &self,
        project_name: &str,
        property_type: &str,
        planning_area: &str,
        size_min: &str,
        size_max: &str,
        min_new_sale_year: &str,
    ) -> PyResult<StatsSummary> {
        let criteria = self.criteria(project_name, property_type, planning_area, size_min, size_max, min_new_sale_year)?;
        Ok(self.inner.stats(&criteria).into())
    }

    /// Best leaderboard groups for a query.
    #[pyo3(signature = (project_name="All", property_type="All", planning_area="All", size_min="100", size_max="8000", min_new_sale_year="All"))]
    fn top_performers(
        &self,
        project_name: &str,
        property_type: &str,
        planning_area: &str,
        size_min: &str,
        size_max: &str,
        min_new_sale_year: &str,
    ) -> PyResult<Vec<LeaderboardRow>> {
        let criteria = self.criteria(project_name, property_type, planning_area, size_min, size_max, min_new_sale_year)?;
        Ok(self.inner.top_performers(&criteria).into_iter().map(|r| r.into()).collect())
    }

    /// Worst leaderboard groups for a query.
    #[pyo3(signature = (project_name="All", property_type="All", planning_area="All", size_min="100", size_max="8000", min_new_sale_year="All"))]
    fn bottom_performers(
        &self,
        project_name: &str,
        property_type: &str,
        planning_area: &str,
        size_min: &str,
        size_max: &str,
        min_new_sale_year: &str,
    ) -> PyResult<Vec<LeaderboardRow>> {
        let criteria = self.criteria(project_name, property_type, planning_area, size_min, size_max, min_new_sale_year)?;
        Ok(self.inner.bottom_performers(&criteria).into_iter().map(|r| r.into()).collect())
    }

    /// Run a query and return the result as JSON.
    ///
    /// `kind` is one of `stats`, `top`, `bottom` or `rows`.
    #[pyo3(signature = (kind, project_name="All", property_type="All", planning_area="All", size_min="100", size_max="8000", min_new_sale_year="All"))]
    #[allow(clippy::too_many_arguments)]
    fn query_json(
        &self,
        kind: &str,
        project_name: &str,
        property_type: &str,
        planning_area: &str,
        size_min: &str,
        size_max: &str,
        min_new_sale_year: &str,
    ) -> PyResult<String> {
        let kind = match kind {
            "stats" => QueryKind::Stats,
            "top" => QueryKind::TopPerformers,
            "bottom" => QueryKind::BottomPerformers,
            "rows" => QueryKind::Rows,
            other => return Err(PyValueError::new_err(format!("unknown query kind: {other}"))),
        };
        let request = QueryRequest::new(
            project_name,
            property_type,
            planning_area,
            size_min,
            size_max,
            min_new_sale_year,
        );
        let response = self.inner.query(&request, kind).map_err(to_py_err)?;
        serde_json::to_string(&response).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Price differential histogram as PNG bytes, or `None` if nothing matches.
    #[pyo3(signature = (project_name="All", property_type="All", planning_area="All", size_min="100", size_max="8000", min_new_sale_year="All"))]
    fn chart_price_differential<'py>(
        &self,
        py: Python<'py>,
        project_name: &str,
        property_type: &str,
        planning_area: &str,
        size_min: &str,
        size_max: &str,
        min_new_sale_year: &str,
    ) -> PyResult<Option<Bound<'py, PyBytes>>> {
        let criteria = self.criteria(project_name, property_type, planning_area, size_min, size_max, min_new_sale_year)?;
        self.chart(py, &criteria, HistogramMetric::PriceDifferential)
    }

    /// Annualized growth histogram as PNG bytes, or `None` if nothing matches.
    #[pyo3(signature = (project_name="All", property_type="All", planning_area="All", size_min="100", size_max="8000", min_new_sale_year="All"))]
    fn chart_annualized_growth<'py>(
        &self,
        py: Python<'py>,
        project_name: &str,
        property_type: &str,
        planning_area: &str,
        size_min: &str,
        size_max: &str,
        min_new_sale_year: &str,
    ) -> PyResult<Option<Bound<'py, PyBytes>>> {
        let criteria = self.criteria(project_name, property_type, planning_area, size_min, size_max, min_new_sale_year)?;
        self.chart(py, &criteria, HistogramMetric::AnnualizedGrowth)
    }
}

fn load_config(config_path: Option<&str>) -> PyResult<Config> {
    match config_path {
        Some(p) => Config::from_json_file(p).map_err(to_py_err),
        None => Ok(Config::default()),
    }
}

/// Build the enriched table from a raw export.
#[pyfunction]
#[pyo3(signature = (raw_path, processed_path, config_path=None))]
fn process(raw_path: &str, processed_path: &str, config_path: Option<&str>) -> PyResult<PipelineReport> {
    let config = load_config(config_path)?;
    Pipeline::new(&config.cleaning)
        .process_file(raw_path, processed_path)
        .map(Into::into)
        .map_err(to_py_err)
}

// ============================================================================
// Module Definition
// ============================================================================

/// Realis Explorer - property resale analytics for Python.
#[pymodule]
fn realis_explorer(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<ColumnStats>()?;
    m.add_class::<StatsSummary>()?;
    m.add_class::<LeaderboardRow>()?;
    m.add_class::<PipelineReport>()?;

    // Engine classes
    m.add_class::<PyQueryEngine>()?;

    m.add_function(wrap_pyfunction!(process, m)?)?;

    Ok(())
}
