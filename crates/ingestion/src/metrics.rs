//! Holding-period and growth metrics for paired transactions.
//!
//! Sale dates are parsed here; pairings whose new sale does not strictly
//! precede the resale are dropped before any metric is derived.

use chrono::{NaiveDate, NaiveDateTime};
use realis_core::{EnrichedTransaction, Error, PairedTransaction, Result};
use tracing::debug;

/// Days per year used for the holding period.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Round to `places` decimal places, halves away from zero.
#[inline]
pub fn round_dp(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Holding period in years, rounded to one decimal.
pub fn property_age_years(new_sale: NaiveDateTime, resale: NaiveDateTime) -> f64 {
    let days = (resale - new_sale).num_days();
    round_dp(days as f64 / DAYS_PER_YEAR, 1)
}

/// `(resale_psf - new_sale_psf) / new_sale_psf`.
pub fn price_differential(new_sale_psf: i64, resale_psf: i64) -> Result<f64> {
    if new_sale_psf == 0 {
        return Err(Error::data_format("new sale PSF is zero"));
    }
    Ok((resale_psf - new_sale_psf) as f64 / new_sale_psf as f64)
}

/// Compound annual growth implied by a price differential over `age_years`.
pub fn annualized_growth(price_differential: f64, age_years: f64) -> Result<f64> {
    if age_years == 0.0 {
        return Err(Error::data_format("property age is zero years"));
    }
    let growth = (1.0 + price_differential).powf(1.0 / age_years) - 1.0;
    if !growth.is_finite() {
        return Err(Error::data_format(format!(
            "annualized growth undefined for differential {price_differential} over {age_years} years"
        )));
    }
    Ok(growth)
}

/// Metrics stage.
pub struct MetricsDeriver {
    sale_date_format: String,
}

impl MetricsDeriver {
    /// Create a deriver that parses sale dates with a chrono format.
    pub fn new(sale_date_format: impl Into<String>) -> Self {
        Self {
            sale_date_format: sale_date_format.into(),
        }
    }

    /// Parse a raw sale date into a midnight datetime.
    pub fn parse_sale_date(&self, raw: &str) -> Result<NaiveDateTime> {
        NaiveDate::parse_from_str(raw.trim(), &self.sale_date_format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| {
                Error::data_format(format!(
                    "sale date '{}' does not match format '{}'",
                    raw, self.sale_date_format
                ))
            })
    }

    /// Derive metrics for every chronologically valid pairing.
    pub fn derive(&self, rows: Vec<PairedTransaction>) -> Result<Vec<EnrichedTransaction>> {
        let input = rows.len();
        let mut enriched = Vec::with_capacity(input);

        for row in rows {
            let new_sale_datetime = self.parse_sale_date(&row.new_sale_date)?;
            let resale_datetime = self.parse_sale_date(&row.resale_date)?;
            if new_sale_datetime >= resale_datetime {
                continue;
            }
            enriched.push(self.enrich(row, new_sale_datetime, resale_datetime)?);
        }

        debug!(
            input,
            out_of_order = input - enriched.len(),
            enriched = enriched.len(),
            "derived transaction metrics"
        );
        Ok(enriched)
    }

    fn enrich(
        &self,
        row: PairedTransaction,
        new_sale_datetime: NaiveDateTime,
        resale_datetime: NaiveDateTime,
    ) -> Result<EnrichedTransaction> {
        let context = |e: Error| match e {
            Error::DataFormat(msg) => Error::data_format(format!(
                "{} {} ({} -> {}): {}",
                row.project_name, row.address, row.new_sale_date, row.resale_date, msg
            )),
            other => other,
        };

        let property_age_years = property_age_years(new_sale_datetime, resale_datetime);
        let price_differential = price_differential(row.new_sale_psf, row.resale_psf).map_err(context)?;
        let annualized_growth =
            annualized_growth(price_differential, property_age_years).map_err(context)?;

        Ok(EnrichedTransaction {
            project_name: row.project_name,
            new_sale_price: row.new_sale_price,
            new_sale_psf: row.new_sale_psf,
            area_sqft: row.area_sqft,
            address: row.address,
            property_type: row.property_type,
            tenure: row.tenure,
            postal_district: row.postal_district,
            planning_region: row.planning_region,
            planning_area: row.planning_area,
            resale_price: row.resale_price,
            resale_psf: row.resale_psf,
            market_segment: row.market_segment,
            new_sale_datetime,
            resale_datetime,
            property_age_years,
            price_differential,
            annualized_growth,
        })
    }
}

impl Default for MetricsDeriver {
    fn default() -> Self {
        Self::new("%d/%m/%Y")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use realis_core::MarketSegment;

    fn paired(new_psf: i64, resale_psf: i64, new_date: &str, resale_date: &str) -> PairedTransaction {
        PairedTransaction {
            project_name: "A".to_string(),
            new_sale_price: new_psf * 1000,
            new_sale_psf: new_psf,
            area_sqft: 1000.0,
            address: "#01-01".to_string(),
            property_type: "Condominium".to_string(),
            tenure: "Freehold".to_string(),
            postal_district: "9".to_string(),
            planning_region: "Central Region".to_string(),
            planning_area: "Orchard".to_string(),
            resale_price: resale_psf * 1000,
            resale_psf,
            market_segment: MarketSegment::Ccr,
            new_sale_date: new_date.to_string(),
            resale_date: resale_date.to_string(),
        }
    }

    #[test]
    fn test_round_dp() {
        assert_eq!(round_dp(5.0137, 1), 5.0);
        assert_eq!(round_dp(5.06, 1), 5.1);
        assert_eq!(round_dp(-2.46, 1), -2.5);
        assert_eq!(round_dp(12.3456, 0), 12.0);
    }

    #[test]
    fn test_property_age() {
        let deriver = MetricsDeriver::default();
        let start = deriver.parse_sale_date("01/01/2005").unwrap();
        let end = deriver.parse_sale_date("01/01/2010").unwrap();
        // 1826 days / 365 = 5.0027
        assert_eq!(property_age_years(start, end), 5.0);
    }

    #[test]
    fn test_price_differential() {
        assert_relative_eq!(price_differential(1000, 1500).unwrap(), 0.5);
        assert_relative_eq!(price_differential(1000, 800).unwrap(), -0.2);
        assert!(matches!(price_differential(0, 800), Err(Error::DataFormat(_))));
    }

    #[test]
    fn test_annualized_growth() {
        // Doubling over 5 years: 2^(1/5) - 1
        let growth = annualized_growth(1.0, 5.0).unwrap();
        assert_relative_eq!(growth, 2f64.powf(0.2) - 1.0, epsilon = 1e-12);
        assert_relative_eq!(growth, 0.148698, epsilon = 1e-6);

        assert!(matches!(annualized_growth(0.5, 0.0), Err(Error::DataFormat(_))));
    }

    #[test]
    fn test_derive_row() {
        let deriver = MetricsDeriver::default();
        let rows = vec![paired(1000, 1500, "01/01/2005", "01/01/2010")];

        let enriched = deriver.derive(rows).unwrap();
        assert_eq!(enriched.len(), 1);

        let row = &enriched[0];
        assert_eq!(row.property_age_years, 5.0);
        assert_relative_eq!(row.price_differential, 0.5);
        assert_relative_eq!(
            row.annualized_growth,
            (1.0 + row.price_differential).powf(1.0 / row.property_age_years) - 1.0,
            epsilon = 1e-12
        );
        assert_eq!(row.new_sale_year(), 2005);
        assert_eq!(row.resale_year(), 2010);
    }

    #[test]
    fn test_out_of_order_pairs_dropped() {
        let deriver = MetricsDeriver::default();
        let rows = vec![
            paired(1000, 1500, "01/01/2010", "01/01/2005"),
            paired(1000, 1500, "01/01/2010", "01/01/2010"),
            paired(1000, 1500, "01/01/2005", "01/01/2010"),
        ];

        let enriched = deriver.derive(rows).unwrap();
        assert_eq!(enriched.len(), 1);
        assert!(enriched.iter().all(|r| r.new_sale_datetime < r.resale_datetime));
        assert!(enriched.iter().all(|r| r.property_age_years > 0.0));
    }

    #[test]
    fn test_zero_age_is_fatal() {
        let deriver = MetricsDeriver::default();
        // 10 days rounds to 0.0 years
        let rows = vec![paired(1000, 1100, "01/01/2010", "11/01/2010")];
        assert!(matches!(deriver.derive(rows), Err(Error::DataFormat(_))));
    }

    #[test]
    fn test_zero_new_sale_psf_is_fatal() {
        let deriver = MetricsDeriver::default();
        let rows = vec![paired(0, 1100, "01/01/2005", "01/01/2010")];
        let err = deriver.derive(rows).unwrap_err();
        assert!(err.to_string().contains("new sale PSF is zero"));
    }

    #[test]
    fn test_bad_date_is_fatal() {
        let deriver = MetricsDeriver::default();
        let rows = vec![paired(1000, 1100, "2005-01-01", "01/01/2010")];
        assert!(matches!(deriver.derive(rows), Err(Error::DataFormat(_))));
    }
}
