//! Raw table rows.

use serde::{Deserialize, Serialize};

/// One row of the source table.
///
/// Only `year` is typed at read time. `month` and `value` keep their raw text
/// because the source mixes encodings in those columns ("1", "202001",
/// "Summe", empty values for months not yet published) and deciding which
/// shapes are usable is the normalizer's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Calendar year of the row
    pub year: i32,
    /// Incident category, e.g. "Alkoholunfälle"
    pub category: String,
    /// Aggregation type, e.g. "insgesamt"
    pub metric: String,
    /// Month code: a bare month, a year+month code, or the annual-total sentinel
    pub month: String,
    /// Incident count as written in the source
    pub value: String,
}

impl RawRecord {
    /// Create a new RawRecord.
    pub fn new(year: i32, category: &str, metric: &str, month: &str, value: &str) -> Self {
        Self {
            year,
            category: category.to_string(),
            metric: metric.to_string(),
            month: month.to_string(),
            value: value.to_string(),
        }
    }
}
