//! Flat-file table loading and persistence.
//!
//! The raw export is only ever read here and by the cleaning stage. The
//! enriched table is written once by the pipeline and then loaded into a
//! read-only `TransactionTable` shared by every query.

use realis_core::{EnrichedTransaction, RawTransaction, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Read raw transaction rows from CSV.
pub fn read_raw<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    debug!(rows = rows.len(), "read raw transactions");
    Ok(rows)
}

/// Read raw transaction rows from a CSV file.
pub fn read_raw_file(path: impl AsRef<Path>) -> Result<Vec<RawTransaction>> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading raw transactions");
    read_raw(BufReader::new(File::open(path)?))
}

/// Read-only handle to the enriched table.
///
/// Cloning is cheap; clones share the same rows.
#[derive(Debug, Clone)]
pub struct TransactionTable {
    rows: Arc<[EnrichedTransaction]>,
}

impl Default for TransactionTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TransactionTable {
    /// Wrap already-built rows.
    pub fn new(rows: Vec<EnrichedTransaction>) -> Self {
        Self { rows: rows.into() }
    }

    /// Read an enriched table from CSV.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }
        Ok(Self::new(rows))
    }

    /// Load an enriched table file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!(path = %path.display(), rows = table.len(), "loaded enriched table");
        Ok(table)
    }

    /// Write the table as CSV with the fixed enriched header.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        write_enriched(writer, &self.rows)
    }

    /// Write the table to a file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.write_to(BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), rows = self.len(), "wrote enriched table");
        Ok(())
    }

    /// All rows.
    pub fn rows(&self) -> &[EnrichedTransaction] {
        &self.rows
    }

    /// Iterate over rows.
    pub fn iter(&self) -> std::slice::Iter<'_, EnrichedTransaction> {
        self.rows.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a TransactionTable {
    type Item = &'a EnrichedTransaction;
    type IntoIter = std::slice::Iter<'a, EnrichedTransaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Serialize enriched rows as CSV.
pub fn write_enriched<W: Write>(writer: W, rows: &[EnrichedTransaction]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use realis_core::MarketSegment;

    const RAW_CSV: &str = "\
Project Name,Transacted Price ($),Area (SQFT),Unit Price ($ PSF),Sale Date,Address,Type of Sale,Type of Area,Property Type,Tenure,Postal District,Planning Region,Planning Area,Number of Units
THE SAIL,\"1,250,000\",\"1,001.0\",\"1,249\",01/03/2005,2 MARINA BOULEVARD #20-01,New Sale,Strata,Apartment,99 yrs,1,Central Region,Downtown Core,1
";

    fn enriched_row() -> EnrichedTransaction {
        EnrichedTransaction {
            project_name: "THE SAIL".to_string(),
            new_sale_price: 1_250_000,
            new_sale_psf: 1249,
            area_sqft: 1001.0,
            address: "2 MARINA BOULEVARD #20-01".to_string(),
            property_type: "Condominium".to_string(),
            tenure: "99 yrs".to_string(),
            postal_district: "1".to_string(),
            planning_region: "Central Region".to_string(),
            planning_area: "Downtown Core".to_string(),
            resale_price: 1_800_000,
            resale_psf: 1798,
            market_segment: MarketSegment::Ccr,
            new_sale_datetime: NaiveDate::from_ymd_opt(2005, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            resale_datetime: NaiveDate::from_ymd_opt(2012, 6, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            property_age_years: 7.3,
            price_differential: 0.4395516413130504,
            annualized_growth: 0.05118,
        }
    }

    #[test]
    fn test_read_raw_ignores_extra_columns() {
        let rows = read_raw(RAW_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].transacted_price, "1,250,000");
        assert_eq!(rows[0].area_type, "Strata");
        assert_eq!(rows[0].planning_area, "Downtown Core");
    }

    #[test]
    fn test_read_raw_missing_column_fails() {
        let csv = "Project Name,Address\nA,B\n";
        assert!(read_raw(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_enriched_header_order() {
        let mut out = Vec::new();
        write_enriched(&mut out, &[enriched_row()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "Project Name,New Sale Price ($),New Sale Price (PSF),Area (SQFT),Address,\
Property Type,Tenure,Postal District,Planning Region,Planning Area,Resale Price ($),\
Resale Price (PSF),Market Segment,New Sale Datetime,Resale Datetime,\
Property Age (Years),Price Differential (%),Annualized Growth"
        );
        assert!(text.contains("2005-03-01 00:00:00"));
        assert!(text.contains(",CCR,"));
    }

    #[test]
    fn test_save_and_load_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/realis_processed.csv");

        let table = TransactionTable::new(vec![enriched_row(), enriched_row()]);
        table.save(&path).unwrap();

        let loaded = TransactionTable::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.rows()[0], enriched_row());
    }

    #[test]
    fn test_table_clones_share_rows() {
        let table = TransactionTable::new(vec![enriched_row()]);
        let clone = table.clone();
        assert!(std::ptr::eq(table.rows().as_ptr(), clone.rows().as_ptr()));
        assert_eq!((&clone).into_iter().count(), 1);
    }
}
