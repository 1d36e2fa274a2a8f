//! Core data types for the realis-explorer system.
//!
//! Each pipeline stage produces a new table of the next record type:
//! `RawTransaction` -> `CleanedTransaction` -> `PairedTransaction` ->
//! `EnrichedTransaction`. Nothing is mutated in place across stages.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the raw transaction export, every field as text.
///
/// Columns not listed here are ignored when reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(rename = "Project Name")]
    pub project_name: String,
    #[serde(rename = "Transacted Price ($)")]
    pub transacted_price: String,
    #[serde(rename = "Area (SQFT)")]
    pub area_sqft: String,
    #[serde(rename = "Unit Price ($ PSF)")]
    pub unit_price_psf: String,
    #[serde(rename = "Sale Date")]
    pub sale_date: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Type of Sale")]
    pub sale_type: String,
    #[serde(rename = "Type of Area")]
    pub area_type: String,
    #[serde(rename = "Property Type")]
    pub property_type: String,
    #[serde(rename = "Tenure")]
    pub tenure: String,
    #[serde(rename = "Postal District")]
    pub postal_district: String,
    #[serde(rename = "Planning Region")]
    pub planning_region: String,
    #[serde(rename = "Planning Area")]
    pub planning_area: String,
}

/// Sale type label of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleType {
    /// First-hand sale from the developer.
    NewSale,
    /// Secondary-market sale.
    Resale,
    /// Any other label (e.g. sub sales); dropped by pairing.
    Other,
}

impl SaleType {
    /// Map a raw `Type of Sale` label.
    pub fn from_label(label: &str) -> Self {
        match label {
            "New Sale" => SaleType::NewSale,
            "Resale" => SaleType::Resale,
            _ => SaleType::Other,
        }
    }
}

/// A strata transaction with numeric fields coerced and a join key derived.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTransaction {
    pub project_name: String,
    pub address: String,
    pub sale_type: SaleType,
    /// Transacted price in dollars.
    pub transacted_price: i64,
    /// Unit price in dollars per square foot.
    pub unit_price_psf: i64,
    pub area_sqft: f64,
    pub property_type: String,
    pub tenure: String,
    pub postal_district: String,
    pub planning_region: String,
    pub planning_area: String,
    /// Sale date as exported; parsed when metrics are derived.
    pub sale_date: String,
    /// `project_name + address`, no separator.
    pub join_key: String,
}

/// The columns of a resale row that survive into a pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct ResaleLeg {
    pub transacted_price: i64,
    pub unit_price_psf: i64,
    pub sale_date: String,
    pub join_key: String,
}

/// A new sale joined to one resale of the same unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedTransaction {
    pub project_name: String,
    pub new_sale_price: i64,
    pub new_sale_psf: i64,
    pub area_sqft: f64,
    pub address: String,
    pub property_type: String,
    pub tenure: String,
    pub postal_district: String,
    pub planning_region: String,
    pub planning_area: String,
    pub resale_price: i64,
    pub resale_psf: i64,
    /// `MarketSegment::Null` until segment assignment runs.
    pub market_segment: MarketSegment,
    pub new_sale_date: String,
    pub resale_date: String,
}

/// Market segment tier keyed by postal district.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarketSegment {
    /// Core Central Region.
    #[serde(rename = "CCR")]
    Ccr,
    /// Rest of Central Region.
    #[serde(rename = "RCR")]
    Rcr,
    /// Outside Central Region.
    #[serde(rename = "OCR")]
    Ocr,
    /// District not in any segment.
    #[serde(rename = "Null")]
    Null,
}

impl MarketSegment {
    /// Label as written to the enriched table.
    pub fn as_str(self) -> &'static str {
        match self {
            MarketSegment::Ccr => "CCR",
            MarketSegment::Rcr => "RCR",
            MarketSegment::Ocr => "OCR",
            MarketSegment::Null => "Null",
        }
    }
}

impl fmt::Display for MarketSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the enriched table: a traceable new-sale -> resale pairing
/// with its derived metrics.
///
/// Field order is the column order of the persisted table. The three metric
/// fields are fractions, not percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    #[serde(rename = "Project Name")]
    pub project_name: String,
    #[serde(rename = "New Sale Price ($)")]
    pub new_sale_price: i64,
    #[serde(rename = "New Sale Price (PSF)")]
    pub new_sale_psf: i64,
    #[serde(rename = "Area (SQFT)")]
    pub area_sqft: f64,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Property Type")]
    pub property_type: String,
    #[serde(rename = "Tenure")]
    pub tenure: String,
    #[serde(rename = "Postal District")]
    pub postal_district: String,
    #[serde(rename = "Planning Region")]
    pub planning_region: String,
    #[serde(rename = "Planning Area")]
    pub planning_area: String,
    #[serde(rename = "Resale Price ($)")]
    pub resale_price: i64,
    #[serde(rename = "Resale Price (PSF)")]
    pub resale_psf: i64,
    #[serde(rename = "Market Segment")]
    pub market_segment: MarketSegment,
    #[serde(rename = "New Sale Datetime", with = "table_datetime")]
    pub new_sale_datetime: NaiveDateTime,
    #[serde(rename = "Resale Datetime", with = "table_datetime")]
    pub resale_datetime: NaiveDateTime,
    #[serde(rename = "Property Age (Years)")]
    pub property_age_years: f64,
    #[serde(rename = "Price Differential (%)")]
    pub price_differential: f64,
    #[serde(rename = "Annualized Growth")]
    pub annualized_growth: f64,
}

impl EnrichedTransaction {
    /// Calendar year of the new sale.
    #[inline]
    pub fn new_sale_year(&self) -> i32 {
        self.new_sale_datetime.year()
    }

    /// Calendar year of the resale.
    #[inline]
    pub fn resale_year(&self) -> i32 {
        self.resale_datetime.year()
    }
}

/// Datetime column format of the enriched table.
pub mod table_datetime {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Format used when writing.
    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Parse a table datetime. Also accepts a `T` separator or a bare date.
    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&dt.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid datetime '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_sale_type_labels() {
        assert_eq!(SaleType::from_label("New Sale"), SaleType::NewSale);
        assert_eq!(SaleType::from_label("Resale"), SaleType::Resale);
        assert_eq!(SaleType::from_label("Sub Sale"), SaleType::Other);
    }

    #[test]
    fn test_market_segment_labels() {
        assert_eq!(MarketSegment::Ccr.to_string(), "CCR");
        assert_eq!(MarketSegment::Null.as_str(), "Null");
    }

    #[test]
    fn test_table_datetime_parse() {
        let expected = NaiveDate::from_ymd_opt(2015, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(table_datetime::parse("2015-03-01 00:00:00"), Some(expected));
        assert_eq!(table_datetime::parse("2015-03-01T00:00:00"), Some(expected));
        assert_eq!(table_datetime::parse("2015-03-01"), Some(expected));
        assert_eq!(table_datetime::parse("01/03/2015"), None);
    }
}
