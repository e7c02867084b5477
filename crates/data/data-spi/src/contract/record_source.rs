//! Record source trait definition.

use crate::error::Result;
use crate::model::RawRecord;

/// Trait for sources that can produce the raw rows of an accident table.
///
/// Implementations are expected to perform one bulk read; the normalizer
/// never calls back into the source.
pub trait RecordSource: Send + Sync {
    /// Source name, used in log output.
    fn name(&self) -> &str;

    /// Read every well-formed row, in original order.
    fn read_records(&self) -> Result<Vec<RawRecord>>;
}

impl RecordSource for Vec<RawRecord> {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn read_records(&self) -> Result<Vec<RawRecord>> {
        Ok(self.clone())
    }
}
