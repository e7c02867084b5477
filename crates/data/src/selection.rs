//! Slice selection and column mapping.

use data_spi::RawRecord;
use serde::{Deserialize, Serialize};

/// Month-field literal marking a yearly aggregate row.
pub const ANNUAL_TOTAL_SENTINEL: &str = "Summe";

/// Which (category, metric) slice of the table to keep, and up to which year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Category label, matched exactly
    pub category: String,
    /// Aggregation-type label, matched exactly
    pub metric: String,
    /// Inclusive upper bound on the row's year
    pub cutoff_year: i32,
    /// Month-field literal for annual totals
    pub annual_total_sentinel: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new("Alkoholunfälle", "insgesamt", 2020)
    }
}

impl Selection {
    /// Create a selection using the default annual-total sentinel.
    pub fn new(category: &str, metric: &str, cutoff_year: i32) -> Self {
        Self {
            category: category.to_string(),
            metric: metric.to_string(),
            cutoff_year,
            annual_total_sentinel: ANNUAL_TOTAL_SENTINEL.to_string(),
        }
    }

    /// Override the annual-total sentinel.
    pub fn with_sentinel(mut self, sentinel: &str) -> Self {
        self.annual_total_sentinel = sentinel.to_string();
        self
    }

    /// True when the record belongs to this slice (labels and year cutoff).
    pub fn matches(&self, record: &RawRecord) -> bool {
        record.category == self.category
            && record.metric == self.metric
            && record.year <= self.cutoff_year
    }

    /// True when the month field is the annual-total marker.
    pub fn is_annual_total(&self, month_field: &str) -> bool {
        month_field.trim() == self.annual_total_sentinel
    }
}

/// Header names of the columns the normalizer reads.
///
/// Names are compared after trimming surrounding whitespace on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub year: String,
    pub category: String,
    pub metric: String,
    pub month: String,
    pub value: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            year: "JAHR".to_string(),
            category: "MONATSZAHL".to_string(),
            metric: "AUSPRAEGUNG".to_string(),
            month: "MONAT".to_string(),
            value: "WERT".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection() {
        let selection = Selection::default();
        assert_eq!(selection.category, "Alkoholunfälle");
        assert_eq!(selection.metric, "insgesamt");
        assert_eq!(selection.cutoff_year, 2020);
        assert_eq!(selection.annual_total_sentinel, "Summe");
    }

    #[test]
    fn test_matches_is_exact_and_case_sensitive() {
        let selection = Selection::new("X", "insgesamt", 2020);
        assert!(selection.matches(&RawRecord::new(2020, "X", "insgesamt", "202001", "1")));
        assert!(!selection.matches(&RawRecord::new(2020, "x", "insgesamt", "202001", "1")));
        assert!(!selection.matches(&RawRecord::new(2020, "X ", "insgesamt", "202001", "1")));
        assert!(!selection.matches(&RawRecord::new(2020, "X", "Verletzte", "202001", "1")));
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let selection = Selection::new("X", "insgesamt", 2020);
        assert!(selection.matches(&RawRecord::new(2020, "X", "insgesamt", "202012", "1")));
        assert!(!selection.matches(&RawRecord::new(2021, "X", "insgesamt", "202101", "1")));
    }

    #[test]
    fn test_custom_sentinel() {
        let selection = Selection::new("X", "insgesamt", 2020).with_sentinel("Total");
        assert!(selection.is_annual_total("Total"));
        assert!(!selection.is_annual_total("Summe"));
    }

    #[test]
    fn test_default_columns() {
        let mapping = ColumnMapping::default();
        assert_eq!(mapping.year, "JAHR");
        assert_eq!(mapping.month, "MONAT");
        assert_eq!(mapping.value, "WERT");
    }
}
