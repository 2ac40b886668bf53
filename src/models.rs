use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Half-open row range `[start_row, end_row)` of a metric block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricBounds {
    pub start_row: usize,
    pub end_row: usize,
}

impl MetricBounds {
    /// Range clamped so that `start_row <= end_row` always holds
    pub fn new(start_row: usize, end_row: usize) -> Self {
        Self {
            start_row,
            end_row: end_row.max(start_row),
        }
    }

    pub fn len(&self) -> usize {
        self.end_row - self.start_row
    }

    pub fn is_empty(&self) -> bool {
        self.start_row == self.end_row
    }

    pub fn rows(&self) -> std::ops::Range<usize> {
        self.start_row..self.end_row
    }
}

/// One (year, month) observation
///
/// `None` means the report had no usable value for that metric; it is never
/// replaced by zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRecord {
    pub year: i32,
    pub month: u32,
    pub values: BTreeMap<String, Option<f64>>,
}

impl MonthlyRecord {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            values: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> (i32, u32) {
        (self.year, self.month)
    }

    /// Value of `metric`, `None` when absent or without a value
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied().flatten()
    }

    pub fn has_any_value(&self) -> bool {
        self.values.values().any(Option::is_some)
    }
}

/// A record together with its derived first-of-month calendar date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedRecord {
    pub date: NaiveDate,
    pub record: MonthlyRecord,
}

/// Merged, date-sorted monthly table
///
/// `metrics` is the column order of the persisted file; every record carries
/// an entry for every metric.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TidyDataset {
    pub metrics: Vec<String>,
    pub records: Vec<DatedRecord>,
}

impl TidyDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_metric(&self, metric: &str) -> bool {
        self.metrics.iter().any(|m| m == metric)
    }

    /// Distinct years in ascending order
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.record.year).collect();
        years.dedup();
        years
    }

    pub fn find(&self, year: i32, month: u32) -> Option<&MonthlyRecord> {
        self.records
            .iter()
            .map(|r| &r.record)
            .find(|r| r.year == year && r.month == month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_never_inverted() {
        let bounds = MetricBounds::new(9, 4);
        assert_eq!(bounds.start_row, 9);
        assert_eq!(bounds.end_row, 9);
        assert!(bounds.is_empty());
        assert_eq!(bounds.len(), 0);
    }

    #[test]
    fn test_record_value_distinguishes_missing() {
        let mut record = MonthlyRecord::new(2022, 4);
        record.values.insert("Visitor Volume".to_string(), Some(3_200_000.0));
        record.values.insert("Room Nights".to_string(), None);

        assert_eq!(record.value("Visitor Volume"), Some(3_200_000.0));
        assert_eq!(record.value("Room Nights"), None);
        assert_eq!(record.value("Unknown"), None);
        assert!(record.has_any_value());
        assert_eq!(record.key(), (2022, 4));
    }
}
