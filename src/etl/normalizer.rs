/// Sheet normalization
///
/// Turns the wide report layout (metrics as rows, months as every-other
/// column) into one `MonthlyRecord` per month.
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::etl::dataset_file::is_reserved_column;
use crate::grid::RawGrid;
use crate::models::{MetricBounds, MonthlyRecord};

pub struct SheetNormalizer {
    date_columns: Vec<usize>,
    name_column: usize,
}

impl SheetNormalizer {
    pub fn new(layout: &LayoutConfig) -> Self {
        Self {
            date_columns: layout.date_columns.clone(),
            name_column: layout.name_column,
        }
    }

    /// Metric names over `bounds`, trimmed, in row order
    ///
    /// Returns `(row, name)` pairs. A name repeated further down the block is
    /// dropped so each record has a single value per metric. Names that clash
    /// with the Date/Year/Month columns of the dataset file are dropped too.
    pub fn metric_names(&self, grid: &RawGrid, bounds: MetricBounds) -> Vec<(usize, String)> {
        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(bounds.len());

        for row in bounds.rows() {
            let Some(name) = grid.get(row, self.name_column).as_text() else {
                continue;
            };
            if is_reserved_column(&name) {
                warn!("Skipping metric '{}' at row {}: name is a reserved column", name, row);
                continue;
            }
            if !seen.insert(name.clone()) {
                warn!("Duplicate metric '{}' at row {}, keeping first occurrence", name, row);
                continue;
            }
            names.push((row, name));
        }

        names
    }

    /// Build the monthly records of one report year
    ///
    /// Months are numbered 1..N in `date_columns` order, which must already be
    /// chronological. Months where every metric lacks a value are dropped.
    pub fn normalize(&self, grid: &RawGrid, year: i32, bounds: MetricBounds) -> Vec<MonthlyRecord> {
        if bounds.is_empty() {
            return Vec::new();
        }

        let metrics = self.metric_names(grid, bounds);
        let mut records = Vec::with_capacity(self.date_columns.len());

        for (idx, &col) in self.date_columns.iter().enumerate() {
            let month = idx as u32 + 1;
            let values: BTreeMap<String, Option<f64>> = metrics
                .iter()
                .map(|(row, name)| (name.clone(), grid.get(*row, col).as_number()))
                .collect();

            let record = MonthlyRecord { year, month, values };
            if record.has_any_value() {
                records.push(record);
            } else {
                debug!("Dropping {}-{:02}: no metric has a value", year, month);
            }
        }

        debug!(
            "Normalized {} months x {} metrics for {}",
            records.len(),
            metrics.len(),
            year
        );
        records
    }
}
