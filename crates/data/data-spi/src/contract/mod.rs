//! Contracts implemented by record sources.

mod record_source;

pub use record_source::RecordSource;
