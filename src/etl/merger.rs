use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, info};

use crate::etl::dataset_file::is_reserved_column;
use crate::models::{DatedRecord, MonthlyRecord, TidyDataset};
use crate::utils::first_of_month;

#[derive(Error, Debug, PartialEq)]
pub enum MergeError {
    #[error("Duplicate record for {year}-{month:02}: two sources cover the same month")]
    DuplicateRecord { year: i32, month: u32 },

    #[error("Invalid calendar month {year}-{month}")]
    InvalidDate { year: i32, month: u32 },

    #[error("Metric '{0}' clashes with a fixed dataset column")]
    ReservedMetric(String),
}

/// Merge per-source records into one date-sorted dataset
///
/// Metric columns are the sorted union of every source's metrics; a record
/// from a source without metric `M` holds `None` for `M`. Two records on the
/// same (year, month) are an error, never resolved by overwrite, and so is
/// a metric named like one of the Date/Year/Month columns.
pub fn merge(per_source: Vec<Vec<MonthlyRecord>>) -> Result<TidyDataset, MergeError> {
    let mut by_month: BTreeMap<(i32, u32), MonthlyRecord> = BTreeMap::new();
    let mut metrics: BTreeSet<String> = BTreeSet::new();

    for records in per_source {
        for record in records {
            if let Some(name) = record.values.keys().find(|name| is_reserved_column(name)) {
                return Err(MergeError::ReservedMetric(name.clone()));
            }
            metrics.extend(record.values.keys().cloned());
            match by_month.entry(record.key()) {
                Entry::Occupied(_) => {
                    return Err(MergeError::DuplicateRecord {
                        year: record.year,
                        month: record.month,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }
    }

    let mut records = Vec::with_capacity(by_month.len());
    for ((year, month), mut record) in by_month {
        let date = first_of_month(year, month).ok_or(MergeError::InvalidDate { year, month })?;
        for metric in &metrics {
            record.values.entry(metric.clone()).or_insert(None);
        }
        records.push(DatedRecord { date, record });
    }

    let dataset = TidyDataset {
        metrics: metrics.into_iter().collect(),
        records,
    };
    debug!("Metric columns: {:?}", dataset.metrics);
    info!(
        "Merged {} monthly records across {} metrics",
        dataset.len(),
        dataset.metrics.len()
    );
    Ok(dataset)
}
