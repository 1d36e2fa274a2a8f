//! Postal district to market segment mapping.

use realis_core::{MarketSegment, PairedTransaction};
use tracing::warn;

/// Core Central Region districts.
pub const CCR_DISTRICTS: [u32; 6] = [1, 2, 6, 9, 10, 11];

/// Rest of Central Region districts.
pub const RCR_DISTRICTS: [u32; 10] = [3, 4, 5, 7, 8, 12, 13, 14, 15, 20];

/// Outside Central Region districts.
pub const OCR_DISTRICTS: [u32; 12] = [16, 17, 18, 19, 21, 22, 23, 24, 25, 26, 27, 28];

/// Segment of a numeric postal district. Unknown districts map to `Null`.
pub fn segment_for_district(district: u32) -> MarketSegment {
    if CCR_DISTRICTS.contains(&district) {
        MarketSegment::Ccr
    } else if RCR_DISTRICTS.contains(&district) {
        MarketSegment::Rcr
    } else if OCR_DISTRICTS.contains(&district) {
        MarketSegment::Ocr
    } else {
        MarketSegment::Null
    }
}

/// Segment of a postal district as it appears in the table.
///
/// Codes that are not integers map to `Null`.
pub fn segment_for_code(code: &str) -> MarketSegment {
    code.trim()
        .parse::<u32>()
        .map(segment_for_district)
        .unwrap_or(MarketSegment::Null)
}

/// Assign a market segment to every paired row.
pub fn assign_segments(rows: Vec<PairedTransaction>) -> Vec<PairedTransaction> {
    let mut unmapped = 0usize;

    let rows: Vec<PairedTransaction> = rows
        .into_iter()
        .map(|mut row| {
            row.market_segment = segment_for_code(&row.postal_district);
            if row.market_segment == MarketSegment::Null {
                unmapped += 1;
            }
            row
        })
        .collect();

    if unmapped > 0 {
        warn!(unmapped, "postal districts outside every market segment");
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_districts() {
        assert_eq!(segment_for_district(9), MarketSegment::Ccr);
        assert_eq!(segment_for_district(20), MarketSegment::Rcr);
        assert_eq!(segment_for_district(28), MarketSegment::Ocr);
    }

    #[test]
    fn test_unknown_district_is_null() {
        assert_eq!(segment_for_district(30), MarketSegment::Null);
        assert_eq!(segment_for_district(0), MarketSegment::Null);
        assert_eq!(segment_for_code("D9"), MarketSegment::Null);
        assert_eq!(segment_for_code(" 9 "), MarketSegment::Ccr);
    }

    #[test]
    fn test_sets_are_disjoint_and_cover_1_to_28() {
        for district in 1..=28 {
            let hits = [
                CCR_DISTRICTS.contains(&district),
                RCR_DISTRICTS.contains(&district),
                OCR_DISTRICTS.contains(&district),
            ]
            .iter()
            .filter(|&&hit| hit)
            .count();
            assert_eq!(hits, 1, "district {district}");
        }
    }
}
