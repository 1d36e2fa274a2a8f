//! Raw table to enriched table.
//!
//! Loader -> Cleaning -> Sale-Pairing -> Segment Assignment -> Metrics. The
//! pipeline is run once to build the enriched table; any data format error
//! aborts the whole run.

use crate::cleaning::Cleaner;
use crate::loader::{read_raw_file, TransactionTable};
use crate::metrics::MetricsDeriver;
use crate::pairing::pair;
use crate::segment::assign_segments;
use realis_core::config::CleaningConfig;
use realis_core::{EnrichedTransaction, RawTransaction, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Row counts after each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub raw_rows: usize,
    pub cleaned_rows: usize,
    pub paired_rows: usize,
    pub enriched_rows: usize,
}

/// Enriched-table builder.
pub struct Pipeline {
    cleaner: Cleaner,
    metrics: MetricsDeriver,
}

impl Pipeline {
    /// Create a pipeline from cleaning configuration.
    pub fn new(config: &CleaningConfig) -> Self {
        Self {
            cleaner: Cleaner::new(config.clone()),
            metrics: MetricsDeriver::new(config.sale_date_format.clone()),
        }
    }

    /// Run every stage over raw rows.
    pub fn run(&self, raw: &[RawTransaction]) -> Result<Vec<EnrichedTransaction>> {
        self.run_with_report(raw).map(|(rows, _)| rows)
    }

    /// Run every stage and report the cardinality after each one.
    pub fn run_with_report(
        &self,
        raw: &[RawTransaction],
    ) -> Result<(Vec<EnrichedTransaction>, PipelineReport)> {
        let cleaned = self.cleaner.clean(raw)?;
        let paired = assign_segments(pair(&cleaned));
        let paired_rows = paired.len();
        let enriched = self.metrics.derive(paired)?;

        let report = PipelineReport {
            raw_rows: raw.len(),
            cleaned_rows: cleaned.len(),
            paired_rows,
            enriched_rows: enriched.len(),
        };
        info!(
            raw = report.raw_rows,
            cleaned = report.cleaned_rows,
            paired = report.paired_rows,
            enriched = report.enriched_rows,
            "pipeline complete"
        );
        Ok((enriched, report))
    }

    /// Build the enriched table file from a raw export.
    pub fn process_file(
        &self,
        raw_path: impl AsRef<Path>,
        processed_path: impl AsRef<Path>,
    ) -> Result<PipelineReport> {
        let raw = read_raw_file(raw_path)?;
        let (rows, report) = self.run_with_report(&raw)?;
        TransactionTable::new(rows).save(processed_path)?;
        Ok(report)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&CleaningConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realis_core::{Error, MarketSegment};

    fn raw(project: &str, sale_type: &str, psf: &str, date: &str, district: &str) -> RawTransaction {
        RawTransaction {
            project_name: project.to_string(),
            transacted_price: "1,000,000".to_string(),
            area_sqft: "1,000".to_string(),
            unit_price_psf: psf.to_string(),
            sale_date: date.to_string(),
            address: "1 MAIN ROAD #01-01".to_string(),
            sale_type: sale_type.to_string(),
            area_type: "Strata".to_string(),
            property_type: "Apartment".to_string(),
            tenure: "Freehold".to_string(),
            postal_district: district.to_string(),
            planning_region: "Central Region".to_string(),
            planning_area: "Novena".to_string(),
        }
    }

    #[test]
    fn test_end_to_end() {
        let pipeline = Pipeline::default();
        let rows = vec![
            raw("A", "New Sale", "1,000", "01/01/2005", "11"),
            raw("A", "Resale", "1,500", "01/01/2010", "11"),
            raw("B", "New Sale", "900", "01/01/2006", "30"),
            raw("B", "Resale", "800", "01/01/2011", "30"),
            raw("C", "New Sale", "900", "01/01/2006", "20"),
        ];

        let (enriched, report) = pipeline.run_with_report(&rows).unwrap();
        assert_eq!(
            report,
            PipelineReport {
                raw_rows: 5,
                cleaned_rows: 5,
                paired_rows: 2,
                enriched_rows: 2,
            }
        );
        assert_eq!(enriched[0].market_segment, MarketSegment::Ccr);
        assert_eq!(enriched[0].property_type, "Condominium");
        assert_eq!(enriched[1].market_segment, MarketSegment::Null);
        assert!(enriched[1].price_differential < 0.0);
    }

    #[test]
    fn test_data_format_error_aborts_run() {
        let pipeline = Pipeline::default();
        let rows = vec![
            raw("A", "New Sale", "0", "01/01/2005", "11"),
            raw("A", "Resale", "1,500", "01/01/2010", "11"),
        ];

        assert!(matches!(pipeline.run(&rows), Err(Error::DataFormat(_))));
    }
}
