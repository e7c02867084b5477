//! Delimited-text record source.
//!
//! The accident table is published as CSV with a handful of irregularities:
//! header names padded with spaces, a UTF-8 byte-order mark on the first
//! header, and rows for months that have no value yet. Column lookup trims
//! headers; rows that cannot yield a [`RawRecord`] are skipped and counted.

use crate::selection::ColumnMapping;
use data_spi::{DataError, RawRecord, RecordSource, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
enum Origin {
    File(PathBuf),
    Text(String),
}

/// CSV-backed [`RecordSource`].
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    origin: Origin,
    name: String,
    mapping: ColumnMapping,
    delimiter: u8,
}

/// Positions of the mapped columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    year: usize,
    category: usize,
    metric: usize,
    month: usize,
    value: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord, mapping: &ColumnMapping) -> Result<Self> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let find = |wanted: &str| {
            let wanted = wanted.trim();
            names
                .iter()
                .position(|name| *name == wanted)
                .ok_or_else(|| DataError::MissingColumn(wanted.to_string()))
        };

        Ok(Self {
            year: find(mapping.year.as_str())?,
            category: find(mapping.category.as_str())?,
            metric: find(mapping.metric.as_str())?,
            month: find(mapping.month.as_str())?,
            value: find(mapping.value.as_str())?,
        })
    }

    fn extract(&self, row: &csv::StringRecord) -> Option<RawRecord> {
        let year = row.get(self.year)?.trim().parse::<i32>().ok()?;
        Some(RawRecord {
            year,
            category: row.get(self.category)?.to_string(),
            metric: row.get(self.metric)?.to_string(),
            month: row.get(self.month)?.to_string(),
            value: row.get(self.value)?.to_string(),
        })
    }
}

impl CsvRecordSource {
    /// Source reading the file at `path` on each call to `read_records`.
    pub fn from_path<P: AsRef<Path>>(path: P, mapping: ColumnMapping) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: path.display().to_string(),
            origin: Origin::File(path),
            mapping,
            delimiter: b',',
        }
    }

    /// Source over text already in memory.
    pub fn from_reader<R: Read>(mut reader: R, mapping: ColumnMapping) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self {
            origin: Origin::Text(text),
            name: "reader".to_string(),
            mapping,
            delimiter: b',',
        })
    }

    /// Use a field delimiter other than `,`.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn parse<R: Read>(&self, input: R) -> Result<Vec<RawRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(input);

        let headers = reader
            .headers()
            .map_err(|e| DataError::Csv(e.to_string()))?
            .clone();
        let columns = ColumnIndex::resolve(&headers, &self.mapping)?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (line, result) in reader.records().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    if let csv::ErrorKind::Io(io) = e.kind() {
                        return Err(DataError::Io(io.to_string()));
                    }
                    debug!(line = line + 2, error = %e, "skipping unreadable row");
                    skipped += 1;
                    continue;
                }
            };
            match columns.extract(&row) {
                Some(record) => records.push(record),
                None => {
                    debug!(line = line + 2, "skipping row without a usable year or field");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!(source = %self.name, skipped, "malformed rows skipped while reading");
        }
        Ok(records)
    }
}

impl RecordSource for CsvRecordSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_records(&self) -> Result<Vec<RawRecord>> {
        match &self.origin {
            Origin::File(path) => {
                let file = File::open(path)
                    .map_err(|e| DataError::Io(format!("{}: {}", path.display(), e)))?;
                self.parse(file)
            }
            Origin::Text(text) => self.parse(text.as_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &str) -> CsvRecordSource {
        CsvRecordSource::from_reader(text.as_bytes(), ColumnMapping::default()).unwrap()
    }

    #[test]
    fn test_headers_are_trimmed() {
        let csv = " MONATSZAHL , AUSPRAEGUNG ,JAHR , MONAT,WERT \n\
                   Alkoholunfälle,insgesamt,2020,202001,28\n";
        let records = source(csv).read_records().unwrap();
        assert_eq!(
            records,
            vec![RawRecord::new(2020, "Alkoholunfälle", "insgesamt", "202001", "28")]
        );
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let csv = "\u{feff}JAHR,MONATSZAHL,AUSPRAEGUNG,MONAT,WERT\n2019,X,insgesamt,201901,3\n";
        let records = source(csv).read_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2019);
    }

    #[test]
    fn test_missing_column() {
        let csv = "JAHR,MONATSZAHL,AUSPRAEGUNG,WERT\n2020,X,insgesamt,1\n";
        let err = source(csv).read_records().unwrap_err();
        assert_eq!(err, DataError::MissingColumn("MONAT".to_string()));
    }

    #[test]
    fn test_rows_with_bad_year_or_missing_fields_are_skipped() {
        let csv = "JAHR,MONATSZAHL,AUSPRAEGUNG,MONAT,WERT\n\
                   zwanzig,X,insgesamt,202001,1\n\
                   2020,X,insgesamt\n\
                   2020,X,insgesamt,202002,2\n";
        let records = source(csv).read_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].month, "202002");
    }

    #[test]
    fn test_empty_value_is_kept_raw() {
        let csv = "JAHR,MONATSZAHL,AUSPRAEGUNG,MONAT,WERT\n2021,X,insgesamt,202105,\n";
        let records = source(csv).read_records().unwrap();
        assert_eq!(records[0].value, "");
    }

    #[test]
    fn test_custom_delimiter_and_mapping() {
        let mapping = ColumnMapping {
            year: "year".to_string(),
            category: "cat".to_string(),
            metric: "kind".to_string(),
            month: "month".to_string(),
            value: "count".to_string(),
        };
        let csv = "year;cat;kind;month;count\n2018;A;B;7;11\n";
        let records = CsvRecordSource::from_reader(csv.as_bytes(), mapping)
            .unwrap()
            .with_delimiter(b';')
            .read_records()
            .unwrap();
        assert_eq!(records, vec![RawRecord::new(2018, "A", "B", "7", "11")]);
    }

    #[test]
    fn test_missing_file() {
        let source = CsvRecordSource::from_path("/nonexistent/accidents.csv", ColumnMapping::default());
        assert!(matches!(source.read_records(), Err(DataError::Io(_))));
    }
}
