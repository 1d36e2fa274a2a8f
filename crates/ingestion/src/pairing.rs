//! New-sale to resale matching.
//!
//! Rows are split by sale type and inner-joined on the join key. A new sale
//! with N matching resales yields N pairings; nothing is de-duplicated.

use realis_core::{CleanedTransaction, MarketSegment, PairedTransaction, ResaleLeg, SaleType};
use std::collections::HashMap;
use tracing::debug;

/// Split a cleaned table into new-sale rows and resale legs.
///
/// Rows with any other sale type are dropped.
pub fn partition(rows: &[CleanedTransaction]) -> (Vec<&CleanedTransaction>, Vec<ResaleLeg>) {
    let mut new_sales = Vec::new();
    let mut resales = Vec::new();

    for row in rows {
        match row.sale_type {
            SaleType::NewSale => new_sales.push(row),
            SaleType::Resale => resales.push(ResaleLeg {
                transacted_price: row.transacted_price,
                unit_price_psf: row.unit_price_psf,
                sale_date: row.sale_date.clone(),
                join_key: row.join_key.clone(),
            }),
            SaleType::Other => {}
        }
    }

    (new_sales, resales)
}

/// Inner-join new sales to resales on the join key.
///
/// Output follows new-sale order, then resale order within one key.
pub fn pair(rows: &[CleanedTransaction]) -> Vec<PairedTransaction> {
    let (new_sales, resales) = partition(rows);

    let mut by_key: HashMap<&str, Vec<&ResaleLeg>> = HashMap::new();
    for leg in &resales {
        by_key.entry(leg.join_key.as_str()).or_default().push(leg);
    }

    let mut paired = Vec::new();
    let mut unmatched = 0usize;

    for new_sale in &new_sales {
        let Some(legs) = by_key.get(new_sale.join_key.as_str()) else {
            unmatched += 1;
            continue;
        };
        for leg in legs {
            paired.push(join(new_sale, leg));
        }
    }

    debug!(
        new_sales = new_sales.len(),
        resales = resales.len(),
        unmatched_new_sales = unmatched,
        pairs = paired.len(),
        "paired new sales with resales"
    );
    paired
}

fn join(new_sale: &CleanedTransaction, resale: &ResaleLeg) -> PairedTransaction {
    PairedTransaction {
        project_name: new_sale.project_name.clone(),
        new_sale_price: new_sale.transacted_price,
        new_sale_psf: new_sale.unit_price_psf,
        area_sqft: new_sale.area_sqft,
        address: new_sale.address.clone(),
        property_type: new_sale.property_type.clone(),
        tenure: new_sale.tenure.clone(),
        postal_district: new_sale.postal_district.clone(),
        planning_region: new_sale.planning_region.clone(),
        planning_area: new_sale.planning_area.clone(),
        resale_price: resale.transacted_price,
        resale_psf: resale.unit_price_psf,
        market_segment: MarketSegment::Null,
        new_sale_date: new_sale.sale_date.clone(),
        resale_date: resale.sale_date.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned(project: &str, address: &str, sale_type: SaleType, psf: i64, date: &str) -> CleanedTransaction {
        CleanedTransaction {
            project_name: project.to_string(),
            address: address.to_string(),
            sale_type,
            transacted_price: psf * 1000,
            unit_price_psf: psf,
            area_sqft: 1000.0,
            property_type: "Condominium".to_string(),
            tenure: "Freehold".to_string(),
            postal_district: "9".to_string(),
            planning_region: "Central Region".to_string(),
            planning_area: "Orchard".to_string(),
            sale_date: date.to_string(),
            join_key: format!("{project}{address}"),
        }
    }

    #[test]
    fn test_single_pair() {
        let rows = vec![
            cleaned("A", "#01-01", SaleType::NewSale, 1000, "01/01/2005"),
            cleaned("A", "#01-01", SaleType::Resale, 1500, "01/01/2010"),
        ];

        let paired = pair(&rows);
        assert_eq!(paired.len(), 1);
        assert_eq!(paired[0].new_sale_psf, 1000);
        assert_eq!(paired[0].resale_psf, 1500);
        assert_eq!(paired[0].resale_price, 1_500_000);
        assert_eq!(paired[0].new_sale_date, "01/01/2005");
        assert_eq!(paired[0].resale_date, "01/01/2010");
    }

    #[test]
    fn test_unmatched_rows_dropped() {
        let rows = vec![
            cleaned("A", "#01-01", SaleType::NewSale, 1000, "01/01/2005"),
            cleaned("B", "#02-02", SaleType::Resale, 1500, "01/01/2010"),
        ];

        assert!(pair(&rows).is_empty());
    }

    #[test]
    fn test_two_new_sales_one_resale_fan_out() {
        let rows = vec![
            cleaned("A", "#01-01", SaleType::NewSale, 1000, "01/01/2005"),
            cleaned("A", "#01-01", SaleType::NewSale, 1100, "01/06/2005"),
            cleaned("A", "#01-01", SaleType::Resale, 1500, "01/01/2010"),
        ];

        let paired = pair(&rows);
        assert_eq!(paired.len(), 2);
        assert_eq!(paired[0].new_sale_psf, 1000);
        assert_eq!(paired[1].new_sale_psf, 1100);
        assert!(paired.iter().all(|p| p.resale_psf == 1500));
    }

    #[test]
    fn test_one_new_sale_many_resales() {
        let rows = vec![
            cleaned("A", "#01-01", SaleType::Resale, 1500, "01/01/2010"),
            cleaned("A", "#01-01", SaleType::NewSale, 1000, "01/01/2005"),
            cleaned("A", "#01-01", SaleType::Resale, 1800, "01/01/2015"),
        ];

        let paired = pair(&rows);
        let resale_psf: Vec<i64> = paired.iter().map(|p| p.resale_psf).collect();
        assert_eq!(resale_psf, vec![1500, 1800]);
    }

    #[test]
    fn test_other_sale_types_ignored() {
        let rows = vec![
            cleaned("A", "#01-01", SaleType::NewSale, 1000, "01/01/2005"),
            cleaned("A", "#01-01", SaleType::Other, 1200, "01/01/2007"),
        ];

        let (new_sales, resales) = partition(&rows);
        assert_eq!(new_sales.len(), 1);
        assert!(resales.is_empty());
        assert!(pair(&rows).is_empty());
    }
}
