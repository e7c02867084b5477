//! Integration tests for the data crate
//!
//! Reads CSV files from disk the way the training step does.

use data::{
    load_series, month_start, ColumnMapping, CsvRecordSource, DataError, RecordSource, Selection,
};
use std::io::Write;
use tempfile::NamedTempFile;

const HEADER: &str = "MONATSZAHL ,AUSPRAEGUNG , JAHR,MONAT ,WERT,VORJAHRESWERT";

fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".csv").unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_load_series_from_file() {
    let file = write_csv(&[
        "Alkoholunfälle,insgesamt,2021,202101,,16",
        "Alkoholunfälle,insgesamt,2020,Summe,430,434",
        "Alkoholunfälle,insgesamt,2020,202002,40,53",
        "Alkoholunfälle,insgesamt,2020,202001,28,22",
        "Alkoholunfälle,Verletzte und Getötete,2020,202001,12,9",
        "Verkehrsunfälle,insgesamt,2020,202001,3000,3100",
    ]);

    let source = CsvRecordSource::from_path(file.path(), ColumnMapping::default());
    let (series, report) = load_series(&source, &Selection::default()).unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].date, month_start(2020, 1).unwrap());
    assert_eq!(series[0].value, 28.0);
    assert_eq!(series[1].date, month_start(2020, 2).unwrap());
    assert_eq!(series[1].value, 40.0);

    assert_eq!(report.rows_seen, 6);
    assert_eq!(report.annual_totals, 1);
    assert_eq!(report.outside_slice, 3);
}

#[test]
fn test_bare_month_encoding_from_file() {
    let file = write_csv(&[
        "Alkoholunfälle,insgesamt,2000,1,78,",
        "Alkoholunfälle,insgesamt,2000,12,60,",
        "Alkoholunfälle,insgesamt,2000,Summe,900,",
    ]);
    let source = CsvRecordSource::from_path(file.path(), ColumnMapping::default());
    let (series, _) = load_series(&source, &Selection::default()).unwrap();

    let dates: Vec<_> = series.iter().map(|o| o.date).collect();
    assert_eq!(
        dates,
        vec![month_start(2000, 1).unwrap(), month_start(2000, 12).unwrap()]
    );
}

#[test]
fn test_reading_twice_gives_same_records() {
    let file = write_csv(&["Alkoholunfälle,insgesamt,2020,202001,28,22"]);
    let source = CsvRecordSource::from_path(file.path(), ColumnMapping::default());
    assert_eq!(source.read_records().unwrap(), source.read_records().unwrap());
}

#[test]
fn test_missing_value_column_is_reported() {
    let mut file = NamedTempFile::with_suffix(".csv").unwrap();
    writeln!(file, "MONATSZAHL,AUSPRAEGUNG,JAHR,MONAT").unwrap();
    writeln!(file, "Alkoholunfälle,insgesamt,2020,202001").unwrap();
    file.flush().unwrap();

    let source = CsvRecordSource::from_path(file.path(), ColumnMapping::default());
    let err = load_series(&source, &Selection::default()).unwrap_err();
    assert_eq!(err, DataError::MissingColumn("WERT".to_string()));
}
