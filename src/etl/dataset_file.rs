/// Tidy dataset hand-off file
///
/// UTF-8 CSV with header `Date,<metric>...,Year,Month`, one row per month in
/// ascending date order. Missing values are empty fields. The file is
/// rewritten wholesale on every run.
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::models::{DatedRecord, MonthlyRecord, TidyDataset};

pub const DATE_COLUMN: &str = "Date";
pub const YEAR_COLUMN: &str = "Year";
pub const MONTH_COLUMN: &str = "Month";

/// True when `name` would clash with one of the fixed Date/Year/Month columns
pub fn is_reserved_column(name: &str) -> bool {
    let name = name.trim();
    [DATE_COLUMN, YEAR_COLUMN, MONTH_COLUMN]
        .iter()
        .any(|column| column.eq_ignore_ascii_case(name))
}

#[derive(Error, Debug)]
pub enum DatasetFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    #[error("Column appears more than once: {0}")]
    DuplicateColumn(String),

    #[error("Invalid value at line {line}, column {column}: {msg}")]
    InvalidField {
        line: u64,
        column: String,
        msg: String,
    },
}

/// Write `dataset` to `path`, replacing any previous file atomically
pub fn write_dataset(dataset: &TidyDataset, path: &Path) -> Result<(), DatasetFileError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::Writer::from_writer(temp.as_file_mut());

        let mut header = Vec::with_capacity(dataset.metrics.len() + 3);
        header.push(DATE_COLUMN);
        header.extend(dataset.metrics.iter().map(String::as_str));
        header.push(YEAR_COLUMN);
        header.push(MONTH_COLUMN);
        writer.write_record(&header)?;

        for dated in &dataset.records {
            let record = &dated.record;
            let mut row = Vec::with_capacity(header.len());
            row.push(dated.date.format("%Y-%m-%d").to_string());
            for metric in &dataset.metrics {
                row.push(record.value(metric).map(|v| v.to_string()).unwrap_or_default());
            }
            row.push(record.year.to_string());
            row.push(record.month.to_string());
            writer.write_record(&row)?;
        }
        writer.flush()?;
    }
    temp.persist(path).map_err(|e| DatasetFileError::Io(e.error))?;

    info!(
        "Wrote {} monthly records to {}",
        dataset.len(),
        path.display()
    );
    Ok(())
}

/// Read a dataset previously written by [`write_dataset`]
///
/// Every column other than Date/Year/Month is a metric.
pub fn read_dataset(path: &Path) -> Result<TidyDataset, DatasetFileError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let mut seen = HashSet::new();
    if let Some(dup) = headers.iter().find(|h| !seen.insert(*h)) {
        return Err(DatasetFileError::DuplicateColumn(dup.to_string()));
    }
    let position = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(DatasetFileError::MissingColumn(name))
    };
    let date_idx = position(DATE_COLUMN)?;
    let year_idx = position(YEAR_COLUMN)?;
    let month_idx = position(MONTH_COLUMN)?;

    let metric_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| ![date_idx, year_idx, month_idx].contains(idx))
        .map(|(idx, name)| (idx, name.to_string()))
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map_or(0, |p| p.line());
        let field = |idx: usize| row.get(idx).unwrap_or_default();
        let invalid = |idx: usize, msg: String| DatasetFileError::InvalidField {
            line,
            column: headers.get(idx).unwrap_or_default().to_string(),
            msg,
        };

        let date = NaiveDate::parse_from_str(field(date_idx), "%Y-%m-%d")
            .map_err(|e| invalid(date_idx, e.to_string()))?;
        let year = field(year_idx)
            .parse::<i32>()
            .map_err(|e| invalid(year_idx, e.to_string()))?;
        let month = field(month_idx)
            .parse::<u32>()
            .map_err(|e| invalid(month_idx, e.to_string()))?;
        if date.year() != year {
            return Err(invalid(
                year_idx,
                format!("{year} does not match date {date}"),
            ));
        }
        if date.month() != month {
            return Err(invalid(
                month_idx,
                format!("{month} does not match date {date}"),
            ));
        }

        let mut values = BTreeMap::new();
        for (idx, metric) in &metric_columns {
            let raw = field(*idx);
            let value = if raw.is_empty() {
                None
            } else {
                Some(
                    raw.parse::<f64>()
                        .map_err(|e| invalid(*idx, format!("{raw}: {e}")))?,
                )
            };
            values.insert(metric.clone(), value);
        }

        records.push(DatedRecord {
            date,
            record: MonthlyRecord {
                year,
                month,
                values,
            },
        });
    }

    records.sort_by_key(|r| r.date);
    Ok(TidyDataset {
        metrics: metric_columns.into_iter().map(|(_, name)| name).collect(),
        records,
    })
}
