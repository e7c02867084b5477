//! Data error types.

use thiserror::Error;

/// Record source errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataError {
    /// The source could not be opened or read
    #[error("I/O error: {0}")]
    Io(String),

    /// The delimited text could not be parsed at all
    #[error("CSV error: {0}")]
    Csv(String),

    /// A required column is absent from the header row
    #[error("Missing column: '{0}'")]
    MissingColumn(String),
}

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::Io(err.to_string())
    }
}
