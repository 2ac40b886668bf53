/// Year-over-year comparisons on the tidy dataset
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::models::TidyDataset;

/// Why an event-impact figure could not be computed
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum InsufficientBaselineData {
    #[error("metric '{0}' is not in the dataset")]
    UnknownMetric(String),

    #[error("no record for {year}-{month:02}")]
    MissingEventRecord { year: i32, month: u32 },

    #[error("no value for {year}-{month:02}")]
    MissingEventValue { year: i32, month: u32 },

    #[error("no other year has a value for month {month:02}")]
    NoBaseline { month: u32 },

    #[error("baseline mean for month {month:02} is zero")]
    ZeroBaseline { month: u32 },
}

/// Month x year table of one metric; cells without a value are absent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPivot {
    pub metric: String,
    pub cells: BTreeMap<u32, BTreeMap<i32, f64>>,
}

impl MonthlyPivot {
    pub fn get(&self, month: u32, year: i32) -> Option<f64> {
        self.cells.get(&month).and_then(|by_year| by_year.get(&year)).copied()
    }

    /// Years with at least one value, ascending
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self
            .cells
            .values()
            .flat_map(|by_year| by_year.keys().copied())
            .collect();
        years.into_iter().collect()
    }
}

/// Pivot `metric` into month rows and year columns
///
/// Returns `None` when the dataset has no such column; such a metric is simply
/// not analyzable.
pub fn pivot_by_month_across_years(dataset: &TidyDataset, metric: &str) -> Option<MonthlyPivot> {
    if !dataset.has_metric(metric) {
        return None;
    }

    let mut cells: BTreeMap<u32, BTreeMap<i32, f64>> = BTreeMap::new();
    for dated in &dataset.records {
        let record = &dated.record;
        if let Some(value) = record.value(metric) {
            cells
                .entry(record.month)
                .or_default()
                .insert(record.year, value);
        }
    }

    Some(MonthlyPivot {
        metric: metric.to_string(),
        cells,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactStats {
    pub event_value: f64,
    pub baseline_mean: f64,
    /// Years that contributed to the baseline
    pub baseline_years: Vec<i32>,
    pub percent_difference: f64,
}

/// Compare the event month against the same calendar month in other years
///
/// `percent_difference = (event - baseline_mean) / baseline_mean * 100`.
pub fn event_impact(
    dataset: &TidyDataset,
    metric: &str,
    event_year: i32,
    event_month: u32,
) -> Result<ImpactStats, InsufficientBaselineData> {
    if !dataset.has_metric(metric) {
        return Err(InsufficientBaselineData::UnknownMetric(metric.to_string()));
    }

    let event = dataset.find(event_year, event_month).ok_or(
        InsufficientBaselineData::MissingEventRecord {
            year: event_year,
            month: event_month,
        },
    )?;
    let event_value = event
        .value(metric)
        .ok_or(InsufficientBaselineData::MissingEventValue {
            year: event_year,
            month: event_month,
        })?;

    let baseline: Vec<(i32, f64)> = dataset
        .records
        .iter()
        .map(|dated| &dated.record)
        .filter(|r| r.month == event_month && r.year != event_year)
        .filter_map(|r| r.value(metric).map(|v| (r.year, v)))
        .collect();

    if baseline.is_empty() {
        return Err(InsufficientBaselineData::NoBaseline { month: event_month });
    }

    let baseline_mean = baseline.iter().map(|(_, v)| v).sum::<f64>() / baseline.len() as f64;
    if baseline_mean == 0.0 {
        return Err(InsufficientBaselineData::ZeroBaseline { month: event_month });
    }

    Ok(ImpactStats {
        event_value,
        baseline_mean,
        baseline_years: baseline.iter().map(|(year, _)| *year).collect(),
        percent_difference: (event_value - baseline_mean) / baseline_mean * 100.0,
    })
}
