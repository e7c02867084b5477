//! Monthly accident series normalization
//!
//! Reads the municipal accident table and reduces one (category, metric)
//! slice of it to a clean, strictly increasing monthly series.
//!
//! - [`CsvRecordSource`]: delimited-text reader with header trimming
//! - [`Selection`] / [`ColumnMapping`]: which slice to keep and where to find it
//! - [`normalize`] / [`normalize_with_report`]: the pure normalization pass
//!
//! ## Example
//!
//! ```rust
//! use data::{normalize, RawRecord, Selection};
//!
//! let rows = vec![
//!     RawRecord::new(2020, "X", "insgesamt", "202001", "10"),
//!     RawRecord::new(2020, "X", "insgesamt", "Summe", "120"),
//! ];
//! let series = normalize(&rows, &Selection::new("X", "insgesamt", 2020));
//! assert_eq!(series.len(), 1);
//! assert_eq!(series[0].value, 10.0);
//! ```

pub mod csv_source;
pub mod normalizer;
pub mod selection;

pub use data_spi::*;

pub use csv_source::CsvRecordSource;
pub use normalizer::{
    classify, extract_month, normalize, normalize_with_report, parse_value, NormalizationReport,
    RowRejection,
};
pub use selection::{ColumnMapping, Selection, ANNUAL_TOTAL_SENTINEL};

use tracing::info;

/// Read every record from `source` and normalize the requested slice.
pub fn load_series(
    source: &dyn RecordSource,
    selection: &Selection,
) -> Result<(Vec<MonthlyObservation>, NormalizationReport)> {
    let records = source.read_records()?;
    info!(source = source.name(), rows = records.len(), "records loaded");
    Ok(normalize_with_report(&records, selection))
}
