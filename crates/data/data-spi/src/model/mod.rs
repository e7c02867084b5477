//! Data models for the monthly accident series.

mod calendar;
mod observation;
mod raw_record;

pub use calendar::{add_months, month_start, months_between};
pub use observation::{observation_values, MonthlyObservation};
pub use raw_record::RawRecord;
