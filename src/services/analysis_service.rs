use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::analysis::{
    event_impact, pivot_by_month_across_years, ChartSeries, ImpactStats, InsufficientBaselineData,
};
use crate::config::{Config, EventConfig};
use crate::etl::dataset_file::{read_dataset, DatasetFileError};
use crate::models::TidyDataset;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Failed to load processed dataset {path}: {source}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: DatasetFileError,
    },

    #[error("Failed to write chart series: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricImpact {
    pub metric: String,
    pub result: Result<ImpactStats, InsufficientBaselineData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub event: EventConfig,
    pub charts: Vec<PathBuf>,
    pub impacts: Vec<MetricImpact>,
    /// Requested metrics that the dataset does not have
    pub missing_metrics: Vec<String>,
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Event impact: {} ({:02}/{})",
            self.event.name, self.event.month, self.event.year
        )?;
        for impact in &self.impacts {
            match &impact.result {
                Ok(stats) => writeln!(
                    f,
                    "  {}: {:.2} vs {:.2} baseline ({:+.2}%)",
                    impact.metric,
                    stats.event_value,
                    stats.baseline_mean,
                    stats.percent_difference
                )?,
                Err(reason) => writeln!(f, "  {}: not computable ({})", impact.metric, reason)?,
            }
        }
        if !self.missing_metrics.is_empty() {
            writeln!(f, "Metrics not found: {}", self.missing_metrics.join(", "))?;
        }
        write!(f, "Charts written: {}", self.charts.len())
    }
}

/// Drives the comparison charts and the event-impact report
pub struct AnalysisService {
    config: Config,
}

impl AnalysisService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn load_dataset(&self) -> Result<TidyDataset, AnalysisError> {
        let path = self.config.processed_data_file();
        read_dataset(&path).map_err(|source| AnalysisError::Dataset { path, source })
    }

    /// Analyze `requested` metrics, or every metric when the list is empty
    #[instrument(skip(self))]
    pub fn run(&self, requested: &[String]) -> Result<AnalysisReport, AnalysisError> {
        let dataset = self.load_dataset()?;
        info!(
            "Loaded {} monthly records with {} metrics",
            dataset.len(),
            dataset.metrics.len()
        );
        self.analyze(&dataset, requested)
    }

    pub fn analyze(
        &self,
        dataset: &TidyDataset,
        requested: &[String],
    ) -> Result<AnalysisReport, AnalysisError> {
        let (metrics, missing_metrics) = select_metrics(dataset, requested);
        if !missing_metrics.is_empty() {
            warn!("Metrics not found in dataset: {}", missing_metrics.join(", "));
        }

        let event = &self.config.event;
        let mut charts = Vec::with_capacity(metrics.len());
        let mut impacts = Vec::with_capacity(metrics.len());
        let mut file_names = HashSet::new();

        for metric in metrics {
            if let Some(pivot) = pivot_by_month_across_years(dataset, &metric) {
                let series = ChartSeries::from_pivot(&pivot, event);
                let mut file_name = series.file_name();
                let mut n = 2;
                while !file_names.insert(file_name.clone()) {
                    warn!("Chart file {} already used, numbering '{}'", file_name, metric);
                    file_name = series.numbered_file_name(n);
                    n += 1;
                }
                let path = series.write_as(&self.config.graph_output_dir, &file_name)?;
                info!("Chart series saved to {}", path.display());
                charts.push(path);
            }

            let result = event_impact(dataset, &metric, event.year, event.month);
            if let Err(reason) = &result {
                warn!("Impact for '{}' not computable: {}", metric, reason);
            }
            impacts.push(MetricImpact { metric, result });
        }

        Ok(AnalysisReport {
            event: event.clone(),
            charts,
            impacts,
            missing_metrics,
        })
    }
}

/// Split `requested` into metrics present in the dataset and missing ones
fn select_metrics(dataset: &TidyDataset, requested: &[String]) -> (Vec<String>, Vec<String>) {
    if requested.is_empty() {
        return (dataset.metrics.clone(), Vec::new());
    }
    requested
        .iter()
        .cloned()
        .partition(|metric| dataset.has_metric(metric))
}
