//! Data Service Provider Interface
//!
//! Defines the record and observation types shared by the normalizer and the
//! forecasting library, plus the contract every raw-record source implements.
//!
//! - [`RawRecord`]: one row of the source table, fields still untyped where the
//!   source is known to be noisy
//! - [`MonthlyObservation`]: one clean (month, value) point
//! - [`RecordSource`]: anything that can yield raw records
//! - [`DataError`]: errors raised while reading a source

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::RecordSource;
pub use error::{DataError, Result};
pub use model::{
    add_months, month_start, months_between, observation_values, MonthlyObservation, RawRecord,
};
