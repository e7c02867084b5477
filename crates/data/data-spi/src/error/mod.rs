//! Error types for record sources.

mod data_error;

pub use data_error::{DataError, Result};
