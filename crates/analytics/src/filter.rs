//! Row filtering for queries.
//!
//! All predicates are conjunctive and commutative. A criterion left at the
//! wildcard does not filter; the size range is always applied.

use realis_core::config::QueryConfig;
use realis_core::{EnrichedTransaction, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The six query criteria exactly as a presentation layer sends them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub project_name: String,
    pub property_type: String,
    pub planning_area: String,
    pub size_min: String,
    pub size_max: String,
    pub min_new_sale_year: String,
}

impl QueryRequest {
    /// Build a request from the six criteria strings.
    pub fn new(
        project_name: impl Into<String>,
        property_type: impl Into<String>,
        planning_area: impl Into<String>,
        size_min: impl Into<String>,
        size_max: impl Into<String>,
        min_new_sale_year: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            property_type: property_type.into(),
            planning_area: planning_area.into(),
            size_min: size_min.into(),
            size_max: size_max.into(),
            min_new_sale_year: min_new_sale_year.into(),
        }
    }

    /// Validate and convert into typed criteria.
    pub fn criteria(&self, config: &QueryConfig) -> Result<FilterCriteria> {
        FilterCriteria::parse(
            &self.project_name,
            &self.property_type,
            &self.planning_area,
            &self.size_min,
            &self.size_max,
            &self.min_new_sale_year,
            config,
        )
    }
}

/// Typed filter criteria. `None` means no filtering on that field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Exact project name.
    pub project_name: Option<String>,
    /// Exact property type.
    pub property_type: Option<String>,
    /// Planning areas, any of which matches.
    pub planning_areas: Option<BTreeSet<String>>,
    /// Inclusive lower bound on area in square feet.
    pub size_min: i64,
    /// Inclusive upper bound on area in square feet.
    pub size_max: i64,
    /// Inclusive lower bound on the new sale's calendar year.
    pub min_new_sale_year: Option<i32>,
}

impl FilterCriteria {
    /// Criteria that only restrict the size range.
    pub fn all(size_min: i64, size_max: i64) -> Self {
        Self {
            project_name: None,
            property_type: None,
            planning_areas: None,
            size_min,
            size_max,
            min_new_sale_year: None,
        }
    }

    /// Parse the six criteria strings.
    ///
    /// Size bounds and year must be integers; anything else is rejected
    /// rather than coerced. An inverted size range is valid and matches
    /// nothing.
    pub fn parse(
        project_name: &str,
        property_type: &str,
        planning_area: &str,
        size_min: &str,
        size_max: &str,
        min_new_sale_year: &str,
        config: &QueryConfig,
    ) -> Result<Self> {
        let wildcard = config.wildcard.as_str();
        let selected = |value: &str| (value != wildcard).then(|| value.to_string());

        let planning_areas = (planning_area != wildcard).then(|| {
            planning_area
                .split(config.area_delimiter.as_str())
                .filter(|area| !area.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
        });

        let min_new_sale_year = if min_new_sale_year == wildcard {
            None
        } else {
            Some(parse_integer("year", min_new_sale_year)?)
        };

        Ok(Self {
            project_name: selected(project_name),
            property_type: selected(property_type),
            planning_areas,
            size_min: parse_integer("size_min", size_min)?,
            size_max: parse_integer("size_max", size_max)?,
            min_new_sale_year,
        })
    }

    /// Whether a row satisfies every criterion.
    pub fn matches(&self, row: &EnrichedTransaction) -> bool {
        if let Some(project) = &self.project_name {
            if row.project_name != *project {
                return false;
            }
        }
        if let Some(property_type) = &self.property_type {
            if row.property_type != *property_type {
                return false;
            }
        }
        if let Some(areas) = &self.planning_areas {
            if !areas.contains(&row.planning_area) {
                return false;
            }
        }
        if let Some(year) = self.min_new_sale_year {
            if row.new_sale_year() < year {
                return false;
            }
        }
        self.size_min as f64 <= row.area_sqft && row.area_sqft <= self.size_max as f64
    }

    /// Rows that satisfy the criteria, in input order.
    ///
    /// Works on a full table or on an already filtered view.
    pub fn apply<'a, I>(&self, rows: I) -> Vec<&'a EnrichedTransaction>
    where
        I: IntoIterator<Item = &'a EnrichedTransaction>,
    {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

fn parse_integer<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::invalid_input(format!("{field} must be an integer, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use realis_core::MarketSegment;

    fn row(project: &str, property_type: &str, area: &str, sqft: f64, year: i32) -> EnrichedTransaction {
        EnrichedTransaction {
            project_name: project.to_string(),
            new_sale_price: 1_000_000,
            new_sale_psf: 1000,
            area_sqft: sqft,
            address: "#01-01".to_string(),
            property_type: property_type.to_string(),
            tenure: "Freehold".to_string(),
            postal_district: "10".to_string(),
            planning_region: "Central Region".to_string(),
            planning_area: area.to_string(),
            resale_price: 1_500_000,
            resale_psf: 1500,
            market_segment: MarketSegment::Ccr,
            new_sale_datetime: NaiveDate::from_ymd_opt(year, 6, 30)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            resale_datetime: NaiveDate::from_ymd_opt(year + 5, 6, 30)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            property_age_years: 5.0,
            price_differential: 0.5,
            annualized_growth: 0.0845,
        }
    }

    fn table() -> Vec<EnrichedTransaction> {
        vec![
            row("A", "Condominium", "Orchard", 800.0, 2004),
            row("A", "Condominium", "Novena", 1200.0, 2008),
            row("B", "Executive Condominium", "Punggol", 1100.0, 2010),
            row("C", "Condominium", "Bedok", 2500.0, 2012),
            row("D", "Condominium", "Orchard", 100.0, 2000),
        ]
    }

    fn parse(project: &str, ptype: &str, area: &str, min: &str, max: &str, year: &str) -> Result<FilterCriteria> {
        FilterCriteria::parse(project, ptype, area, min, max, year, &QueryConfig::default())
    }

    #[test]
    fn test_all_wildcards_keep_every_row() {
        let rows = table();
        let criteria = parse("All", "All", "All", "100", "8000", "All").unwrap();
        assert_eq!(criteria, FilterCriteria::all(100, 8000));
        assert_eq!(criteria.apply(&rows).len(), rows.len());
    }

    #[test]
    fn test_project_and_type() {
        let rows = table();
        let criteria = parse("A", "All", "All", "100", "8000", "All").unwrap();
        assert_eq!(criteria.apply(&rows).len(), 2);

        let criteria = parse("All", "Executive Condominium", "All", "100", "8000", "All").unwrap();
        let matched = criteria.apply(&rows);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].project_name, "B");
    }

    #[test]
    fn test_planning_area_any_of() {
        let rows = table();
        let criteria = parse("All", "All", "Orchard,Bedok", "100", "8000", "All").unwrap();
        let projects: Vec<&str> = criteria.apply(&rows).iter().map(|r| r.project_name.as_str()).collect();
        assert_eq!(projects, vec!["A", "C", "D"]);
    }

    #[test]
    fn test_planning_area_tokens_are_exact() {
        let rows = table();
        // A space after the delimiter is part of the next name
        let criteria = parse("All", "All", "Bedok, Orchard", "100", "8000", "All").unwrap();
        let projects: Vec<&str> = criteria.apply(&rows).iter().map(|r| r.project_name.as_str()).collect();
        assert_eq!(projects, vec!["C"]);
    }

    #[test]
    fn test_size_range_inclusive() {
        let rows = table();
        let criteria = parse("All", "All", "All", "800", "1200", "All").unwrap();
        assert_eq!(criteria.apply(&rows).len(), 3);

        let criteria = parse("All", "All", "All", "2000", "1000", "All").unwrap();
        assert!(criteria.apply(&rows).is_empty());
    }

    #[test]
    fn test_year_lower_bound_uses_calendar_year() {
        let rows = table();
        // New sales on 30 June 2008 count for year 2008
        let criteria = parse("All", "All", "All", "100", "8000", "2008").unwrap();
        assert_eq!(criteria.apply(&rows).len(), 3);
    }

    #[test]
    fn test_idempotent() {
        let rows = table();
        let criteria = parse("All", "Condominium", "Orchard,Novena", "100", "2000", "2001").unwrap();
        let once = criteria.apply(&rows);
        let twice = criteria.apply(once.iter().copied());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let rows = table();
        let criteria = parse("NOPE", "All", "All", "100", "8000", "All").unwrap();
        assert!(criteria.apply(&rows).is_empty());
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        assert!(parse("All", "All", "All", "abc", "8000", "All").unwrap_err().is_invalid_input());
        assert!(parse("All", "All", "All", "100", "80.5", "All").unwrap_err().is_invalid_input());
        assert!(parse("All", "All", "All", "100", "8000", "20x8").unwrap_err().is_invalid_input());
        // Size bounds are never wildcards
        assert!(parse("All", "All", "All", "All", "8000", "All").is_err());
    }

    #[test]
    fn test_request_round_trip() {
        let request = QueryRequest::new("A", "All", "All", "100", "8000", "All");
        let criteria = request.criteria(&QueryConfig::default()).unwrap();
        assert_eq!(criteria.project_name.as_deref(), Some("A"));
    }
}
