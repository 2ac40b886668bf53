/// Chart series for the year-over-year comparison plots
///
/// Each metric gets one JSON document with a line per year over the twelve
/// calendar months, plus the highlighted event point. Rendering is left to
/// whatever plotting front end consumes these files.
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::comparative::MonthlyPivot;
use crate::config::EventConfig;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearLine {
    pub year: i32,
    /// January first; `None` where the month has no value
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMarker {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub metric: String,
    pub title: String,
    pub x_labels: Vec<String>,
    pub lines: Vec<YearLine>,
    pub event: Option<EventMarker>,
}

impl ChartSeries {
    pub fn from_pivot(pivot: &MonthlyPivot, event: &EventConfig) -> Self {
        let lines = pivot
            .years()
            .into_iter()
            .map(|year| YearLine {
                year,
                values: (1..=12).map(|month| pivot.get(month, year)).collect(),
            })
            .collect();

        let event_marker = pivot.get(event.month, event.year).map(|value| EventMarker {
            label: format!("{} ({})", event.name, event.year),
            year: event.year,
            month: event.month,
            value,
        });

        Self {
            metric: pivot.metric.clone(),
            title: format!("Year-over-year comparison of {}", pivot.metric),
            x_labels: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
            lines,
            event: event_marker,
        }
    }

    /// `comparison_<metric>.json` with spaces as underscores, lower case
    pub fn file_name(&self) -> String {
        format!("comparison_{}.json", self.slug())
    }

    /// File name with a numeric suffix, used when two metrics share a slug
    pub fn numbered_file_name(&self, n: usize) -> String {
        format!("comparison_{}_{n}.json", self.slug())
    }

    fn slug(&self) -> String {
        self.metric
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                ' ' | '/' | '\\' => '_',
                other => other,
            })
            .collect()
    }

    /// Write the series into `dir` under [`ChartSeries::file_name`]
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, std::io::Error> {
        self.write_as(dir, &self.file_name())
    }

    /// Write the series into `dir` as `file_name`, returning the file path
    pub fn write_as(&self, dir: &Path, file_name: &str) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(path)
    }
}
