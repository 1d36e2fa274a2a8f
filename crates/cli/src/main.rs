//! Realis Explorer CLI
//!
//! Builds the enriched resale table and answers queries against it.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use realis_analytics::{HistogramMetric, QueryEngine, QueryKind, QueryRequest};
use realis_charts::{render_histogram, write_chart};
use realis_core::Config;
use realis_ingestion::Pipeline;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Realis Explorer - Singapore property resale analytics
#[derive(Parser, Debug)]
#[command(name = "realis")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(short, long, global = true, env = "REALIS_CONFIG")]
    config: Option<PathBuf>,

    /// Enriched table to query (overrides the configured path)
    #[arg(short, long, global = true)]
    table: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the enriched table from a raw export
    Process {
        /// Raw transaction CSV
        #[arg(short, long)]
        raw: Option<PathBuf>,

        /// Enriched table output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Descriptive statistics of the matching transactions
    Stats(FilterArgs),

    /// Projects ranked by median annualized growth
    Performers {
        #[command(flatten)]
        filter: FilterArgs,

        /// Show the worst performers instead of the best
        #[arg(long)]
        bottom: bool,
    },

    /// Render a histogram of the matching transactions as PNG
    Chart {
        #[command(flatten)]
        filter: FilterArgs,

        /// Metric to chart
        #[arg(short, long, value_enum, default_value = "price-differential")]
        metric: Metric,

        /// Output path for the PNG chart
        #[arg(short, long, default_value = "chart.png")]
        output: PathBuf,
    },

    /// Matching transactions as JSON records
    Rows(FilterArgs),

    /// Project names for selection, preceded by the wildcard
    Projects,

    /// Planning areas for selection
    Areas,
}

/// The six query criteria.
#[derive(Args, Debug)]
struct FilterArgs {
    /// Project name or "All"
    #[arg(long, default_value = "All")]
    project: String,

    /// Property type or "All"
    #[arg(long, default_value = "All")]
    property_type: String,

    /// Comma-separated planning areas or "All"
    #[arg(long, default_value = "All")]
    planning_area: String,

    /// Minimum area in square feet
    #[arg(long, default_value = "100")]
    size_min: String,

    /// Maximum area in square feet
    #[arg(long, default_value = "8000")]
    size_max: String,

    /// Earliest new sale year or "All"
    #[arg(long, default_value = "All")]
    year: String,
}

impl FilterArgs {
    fn request(&self) -> QueryRequest {
        QueryRequest::new(
            &self.project,
            &self.property_type,
            &self.planning_area,
            &self.size_min,
            &self.size_max,
            &self.year,
        )
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Metric {
    PriceDifferential,
    AnnualizedGrowth,
}

impl From<Metric> for HistogramMetric {
    fn from(m: Metric) -> Self {
        match m {
            Metric::PriceDifferential => HistogramMetric::PriceDifferential,
            Metric::AnnualizedGrowth => HistogramMetric::AnnualizedGrowth,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Process { raw, output } => {
            let raw = raw.unwrap_or_else(|| config.data.raw_path.clone());
            let output = output.unwrap_or_else(|| config.data.processed_path.clone());
            let report = Pipeline::new(&config.cleaning)
                .process_file(&raw, &output)
                .with_context(|| format!("processing {}", raw.display()))?;
            print_json(&report)?;
        }

        Commands::Stats(filter) => {
            let engine = open_engine(cli.table, config)?;
            let response = engine.query(&filter.request(), QueryKind::Stats)?;
            print_json(&response)?;
        }

        Commands::Performers { filter, bottom } => {
            let engine = open_engine(cli.table, config)?;
            let kind = if bottom {
                QueryKind::BottomPerformers
            } else {
                QueryKind::TopPerformers
            };
            let response = engine.query(&filter.request(), kind)?;
            print_json(&response)?;
        }

        Commands::Chart { filter, metric, output } => {
            let engine = open_engine(cli.table, config)?;
            let criteria = engine.criteria(&filter.request())?;
            match engine.histogram(&criteria, metric.into()) {
                Some(hist) => {
                    let png = render_histogram(&hist, &engine.config().charts)?;
                    write_chart(&png, &output)?;
                    info!(
                        path = %output.display(),
                        binned = hist.binned_count(),
                        out_of_range = hist.out_of_range(),
                        "chart written"
                    );
                }
                None => warn!("no transactions match; chart not written"),
            }
        }

        Commands::Rows(filter) => {
            let engine = open_engine(cli.table, config)?;
            let response = engine.query(&filter.request(), QueryKind::Rows)?;
            print_json(&response)?;
        }

        Commands::Projects => {
            let engine = open_engine(cli.table, config)?;
            print_json(&engine.project_options())?;
        }

        Commands::Areas => {
            let engine = open_engine(cli.table, config)?;
            print_json(&engine.planning_areas())?;
        }
    }

    Ok(())
}

/// Load the enriched table once for this invocation.
fn open_engine(table: Option<PathBuf>, config: Config) -> Result<QueryEngine> {
    let path = table.unwrap_or_else(|| config.data.processed_path.clone());
    QueryEngine::open(&path, config).with_context(|| format!("loading table {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
