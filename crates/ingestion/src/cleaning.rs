//! Raw row normalization.
//!
//! Strips thousands separators from every field, coerces the price and area
//! columns, keeps only strata records, folds apartments into condominiums and
//! derives the pairing join key.

use realis_core::config::CleaningConfig;
use realis_core::{CleanedTransaction, Error, RawTransaction, Result, SaleType};
use std::str::FromStr;
use tracing::debug;

/// Cleaning stage.
pub struct Cleaner {
    config: CleaningConfig,
}

impl Cleaner {
    /// Create a cleaner with the given labels.
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    /// Clean a raw table.
    ///
    /// Fails on the first row whose price or area is not numeric; non-strata
    /// rows are dropped silently.
    pub fn clean(&self, rows: &[RawTransaction]) -> Result<Vec<CleanedTransaction>> {
        let mut cleaned = Vec::with_capacity(rows.len());

        for (idx, raw) in rows.iter().enumerate() {
            let row = self.clean_row(raw).map_err(|e| match e {
                Error::DataFormat(msg) => Error::data_format(format!("row {}: {}", idx + 1, msg)),
                other => other,
            })?;
            if let Some(row) = row {
                cleaned.push(row);
            }
        }

        debug!(
            input = rows.len(),
            retained = cleaned.len(),
            dropped = rows.len() - cleaned.len(),
            "cleaned raw table"
        );
        Ok(cleaned)
    }

    /// Clean one row. Returns `None` for rows outside the strata category.
    ///
    /// Numeric coercion happens before the category check so a malformed
    /// price anywhere in the export fails the run.
    pub fn clean_row(&self, raw: &RawTransaction) -> Result<Option<CleanedTransaction>> {
        let transacted_price: i64 = parse_field("Transacted Price ($)", &raw.transacted_price)?;
        let unit_price_psf: i64 = parse_field("Unit Price ($ PSF)", &raw.unit_price_psf)?;
        let area_sqft: f64 = parse_field("Area (SQFT)", &raw.area_sqft)?;

        let area_type = strip_commas(&raw.area_type);
        if area_type != self.config.strata_label {
            return Ok(None);
        }

        let project_name = strip_commas(&raw.project_name);
        let address = strip_commas(&raw.address);
        let join_key = format!("{project_name}{address}");

        let mut property_type = strip_commas(&raw.property_type);
        if property_type == self.config.apartment_label {
            property_type = self.config.condominium_label.clone();
        }

        Ok(Some(CleanedTransaction {
            sale_type: SaleType::from_label(&strip_commas(&raw.sale_type)),
            transacted_price,
            unit_price_psf,
            area_sqft,
            property_type,
            tenure: strip_commas(&raw.tenure),
            postal_district: strip_commas(&raw.postal_district),
            planning_region: strip_commas(&raw.planning_region),
            planning_area: strip_commas(&raw.planning_area),
            sale_date: strip_commas(&raw.sale_date),
            project_name,
            address,
            join_key,
        }))
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(CleaningConfig::default())
    }
}

/// Remove every comma from a field.
pub fn strip_commas(field: &str) -> String {
    field.replace(',', "")
}

fn parse_field<T: FromStr>(column: &str, value: &str) -> Result<T> {
    let stripped = strip_commas(value);
    stripped
        .trim()
        .parse()
        .map_err(|_| Error::data_format(format!("{column} is not numeric: '{value}'")))
}
