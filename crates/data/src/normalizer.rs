//! Normalization of raw rows into a monthly series.
//!
//! Every row goes through [`classify`], which either produces a
//! [`MonthlyObservation`] or names the reason it was dropped. Surviving
//! observations are stably sorted by date; when a month occurs more than once
//! the first occurrence in original row order wins.

use crate::selection::Selection;
use data_spi::{month_start, MonthlyObservation, RawRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a row did not become an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RowRejection {
    /// Category, metric or year outside the requested slice
    #[error("row outside the requested slice")]
    OutsideSlice,

    /// Yearly aggregate, not a calendar month
    #[error("annual total row")]
    AnnualTotal,

    /// Month field does not end in a month number 1-12
    #[error("malformed month field")]
    MalformedMonth,

    /// Value is not a finite, non-negative number
    #[error("malformed value")]
    MalformedValue,
}

/// Counts of what happened to each input row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub rows_seen: usize,
    pub kept: usize,
    pub outside_slice: usize,
    pub annual_totals: usize,
    pub malformed_month: usize,
    pub malformed_value: usize,
    /// Later rows for a month that was already observed
    pub duplicates: usize,
}

impl NormalizationReport {
    fn record(&mut self, rejection: RowRejection) {
        match rejection {
            RowRejection::OutsideSlice => self.outside_slice += 1,
            RowRejection::AnnualTotal => self.annual_totals += 1,
            RowRejection::MalformedMonth => self.malformed_month += 1,
            RowRejection::MalformedValue => self.malformed_value += 1,
        }
    }

    /// Total rows that did not make it into the output.
    pub fn dropped(&self) -> usize {
        self.rows_seen - self.kept
    }
}

/// Month number from the trailing two characters of a month field.
///
/// Accepts bare months ("1", "12") and year+month codes ("202001").
/// Both tail characters must be ASCII digits, so a sign or an inner space in
/// the tail ("+1", "2020 1") makes the month malformed rather than numeric.
pub fn extract_month(field: &str) -> Option<u32> {
    let field = field.trim();
    let tail_start = field
        .char_indices()
        .rev()
        .nth(1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let tail = &field[tail_start..];

    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month = tail.parse::<u32>().ok()?;
    (1..=12).contains(&month).then_some(month)
}

/// Parse a count, accepting only finite values `>= 0`.
pub fn parse_value(field: &str) -> Option<f64> {
    let value = field.trim().parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 {
        // -0.0 would otherwise survive and serialize differently from 0.0
        Some(value + 0.0)
    } else {
        None
    }
}

/// Decide whether a single row becomes an observation.
pub fn classify(
    record: &RawRecord,
    selection: &Selection,
) -> Result<MonthlyObservation, RowRejection> {
    if !selection.matches(record) {
        return Err(RowRejection::OutsideSlice);
    }
    if selection.is_annual_total(&record.month) {
        return Err(RowRejection::AnnualTotal);
    }
    let month = extract_month(&record.month).ok_or(RowRejection::MalformedMonth)?;
    let date = month_start(record.year, month).ok_or(RowRejection::MalformedMonth)?;
    let value = parse_value(&record.value).ok_or(RowRejection::MalformedValue)?;

    Ok(MonthlyObservation { date, value })
}

/// Normalize `records` into a strictly increasing monthly series.
pub fn normalize(records: &[RawRecord], selection: &Selection) -> Vec<MonthlyObservation> {
    normalize_with_report(records, selection).0
}

/// Like [`normalize`], also returning per-reason drop counts.
pub fn normalize_with_report(
    records: &[RawRecord],
    selection: &Selection,
) -> (Vec<MonthlyObservation>, NormalizationReport) {
    let mut report = NormalizationReport {
        rows_seen: records.len(),
        ..Default::default()
    };

    let mut series = Vec::new();
    for (row, record) in records.iter().enumerate() {
        match classify(record, selection) {
            Ok(observation) => series.push(observation),
            Err(rejection) => {
                if matches!(
                    rejection,
                    RowRejection::MalformedMonth | RowRejection::MalformedValue
                ) {
                    debug!(
                        row,
                        month = %record.month,
                        value = %record.value,
                        reason = %rejection,
                        "dropping malformed row"
                    );
                }
                report.record(rejection);
            }
        }
    }

    // Stable: equal dates keep their original row order.
    series.sort_by_key(|o| o.date);
    let before = series.len();
    series.dedup_by(|later, first| {
        if later.date == first.date {
            warn!(
                date = %later.date,
                kept = first.value,
                dropped = later.value,
                "duplicate month, keeping first occurrence"
            );
            true
        } else {
            false
        }
    });
    report.duplicates = before - series.len();
    report.kept = series.len();

    info!(
        category = %selection.category,
        metric = %selection.metric,
        cutoff_year = selection.cutoff_year,
        rows_seen = report.rows_seen,
        kept = report.kept,
        outside_slice = report.outside_slice,
        annual_totals = report.annual_totals,
        malformed_month = report.malformed_month,
        malformed_value = report.malformed_value,
        duplicates = report.duplicates,
        "normalized monthly series"
    );

    (series, report)
}
