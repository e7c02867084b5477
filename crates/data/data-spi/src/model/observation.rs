//! Normalized monthly observations.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One calendar month's aggregate count.
///
/// `date` is always the first day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyObservation {
    pub date: NaiveDate,
    pub value: f64,
}

impl MonthlyObservation {
    /// Create an observation for the first day of `date`'s month.
    pub fn new(date: NaiveDate, value: f64) -> Self {
        let date = date.with_day(1).unwrap_or(date);
        Self { date, value }
    }

    /// Calendar year of the observation.
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Calendar month of the observation (1-12).
    pub fn month(&self) -> u32 {
        self.date.month()
    }
}

/// Extract the observation values in sequence order.
pub fn observation_values(observations: &[MonthlyObservation]) -> Vec<f64> {
    observations.iter().map(|o| o.value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_snaps_to_first_of_month() {
        let obs = MonthlyObservation::new(date(2020, 3, 17), 4.0);
        assert_eq!(obs.date, date(2020, 3, 1));
        assert_eq!(obs.year(), 2020);
        assert_eq!(obs.month(), 3);
    }

    #[test]
    fn test_values_in_sequence_order() {
        let series = vec![
            MonthlyObservation::new(date(2020, 1, 1), 10.0),
            MonthlyObservation::new(date(2020, 2, 1), 12.0),
        ];
        assert_eq!(observation_values(&series), vec![10.0, 12.0]);
    }

    #[test]
    fn test_serializes_date_as_iso_string() {
        let obs = MonthlyObservation::new(date(2020, 1, 1), 10.0);
        let json = serde_json::to_string(&obs).unwrap();
        assert_eq!(json, r#"{"date":"2020-01-01","value":10.0}"#);
    }
}
