use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::etl::{
    merge, write_dataset, DatasetFileError, MergeError, MetricBlockDetector, SheetNormalizer,
};
use crate::importers::{discover_sources, LoadError, RawSheetLoader};
use crate::models::MonthlyRecord;
use crate::utils::extract_year;

/// Why a single source was left out of the run
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum SkipReason {
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("no year in file name")]
    YearUnresolvable,

    #[error("no metric rows found")]
    EmptyMetricBlock,

    #[error("metric rows found but every month is empty")]
    NoMonthlyValues,
}

/// Run-level failures; these abort the ETL run
#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    #[error("Source discovery failed: {0}")]
    Discovery(#[from] LoadError),

    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("Failed to persist dataset: {0}")]
    Persist(#[from] DatasetFileError),
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedSource {
    pub path: PathBuf,
    pub year: i32,
    pub months: usize,
    pub metrics: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Outcome of one ETL run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub processed: Vec<ProcessedSource>,
    pub skipped: Vec<SkippedSource>,
    pub months_consolidated: usize,
    pub years: Vec<i32>,
    /// `None` when nothing was consolidated and no file was written
    pub output: Option<PathBuf>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sources processed: {}", self.processed.len())?;
        for source in &self.processed {
            writeln!(
                f,
                "  {} ({}): {} months, {} metrics",
                source.path.display(),
                source.year,
                source.months,
                source.metrics
            )?;
        }
        writeln!(f, "Sources skipped: {}", self.skipped.len())?;
        for source in &self.skipped {
            writeln!(f, "  {}: {}", source.path.display(), source.reason)?;
        }
        writeln!(
            f,
            "Months consolidated: {} across {} year(s)",
            self.months_consolidated,
            self.years.len()
        )?;
        match &self.output {
            Some(path) => write!(f, "Output: {}", path.display()),
            None => write!(f, "Output: none (no data consolidated)"),
        }
    }
}

/// Runs the yearly report ETL end to end
///
/// 1. Discovers source workbooks in the raw directory
/// 2. Per source: year from file name, year sheet, metric block, monthly records
/// 3. Merges all sources (duplicate months abort the run)
/// 4. Overwrites the tidy dataset file
pub struct EtlService {
    config: Config,
    loader: RawSheetLoader,
    detector: MetricBlockDetector,
    normalizer: SheetNormalizer,
}

impl EtlService {
    pub fn new(config: Config) -> Self {
        Self {
            loader: RawSheetLoader::new(config.layout.clone()),
            detector: MetricBlockDetector::new(&config.layout),
            normalizer: SheetNormalizer::new(&config.layout),
            config,
        }
    }

    /// Normalize a single source workbook
    #[instrument(skip(self), fields(source = %path.display()))]
    pub fn process_source(&self, path: &Path) -> Result<(i32, Vec<MonthlyRecord>), SkipReason> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let year = extract_year(&file_name).ok_or(SkipReason::YearUnresolvable)?;

        info!("Processing {} for year {}", file_name, year);
        let grid = self
            .loader
            .load(path, year)
            .map_err(|e| SkipReason::SourceUnavailable(e.to_string()))?;

        let bounds = self.detector.detect_bounds(&grid);
        if bounds.is_empty() {
            return Err(SkipReason::EmptyMetricBlock);
        }

        let records = self.normalizer.normalize(&grid, year, bounds);
        if records.is_empty() {
            return Err(SkipReason::NoMonthlyValues);
        }
        Ok((year, records))
    }

    #[instrument(skip(self))]
    pub fn run(&self) -> Result<RunSummary, EtlError> {
        let start_time = Instant::now();
        info!(
            "Starting tourism ETL from {}",
            self.config.raw_data_dir.display()
        );

        let sources = discover_sources(&self.config.raw_data_dir, &self.config.source_extension)?;
        if sources.is_empty() {
            warn!(
                "No .{} files found in {}",
                self.config.source_extension,
                self.config.raw_data_dir.display()
            );
        }

        let mut summary = RunSummary::default();
        let mut per_source = Vec::with_capacity(sources.len());

        for path in sources {
            match self.process_source(&path) {
                Ok((year, records)) => {
                    let metrics = records.first().map_or(0, |r| r.values.len());
                    summary.processed.push(ProcessedSource {
                        path,
                        year,
                        months: records.len(),
                        metrics,
                    });
                    per_source.push(records);
                }
                Err(reason) => {
                    warn!("Skipping {}: {}", path.display(), reason);
                    summary.skipped.push(SkippedSource { path, reason });
                }
            }
        }

        let dataset = merge(per_source)?;
        summary.months_consolidated = dataset.len();
        summary.years = dataset.years();

        if dataset.is_empty() {
            warn!("No data was consolidated, leaving output untouched");
        } else {
            let output = self.config.processed_data_file();
            write_dataset(&dataset, &output)?;
            summary.output = Some(output);
        }

        info!(
            "ETL finished in {:.2}s: {} processed, {} skipped, {} months",
            start_time.elapsed().as_secs_f64(),
            summary.processed.len(),
            summary.skipped.len(),
            summary.months_consolidated
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EtlService {
        EtlService::new(Config::default())
    }

    #[test]
    fn test_year_unresolvable_is_skip_not_error() {
        let result = service().process_source(Path::new("/data/raw/executive_summary.xlsx"));
        assert_eq!(result.unwrap_err(), SkipReason::YearUnresolvable);
    }

    #[test]
    fn test_unopenable_source_is_unavailable() {
        let result = service().process_source(Path::new("/nonexistent/Las Vegas 2021.xlsx"));
        assert!(matches!(result, Err(SkipReason::SourceUnavailable(_))));
    }

    #[test]
    fn test_summary_display_lists_skips() {
        let summary = RunSummary {
            processed: vec![ProcessedSource {
                path: PathBuf::from("Las Vegas 2022.xlsx"),
                year: 2022,
                months: 12,
                metrics: 9,
            }],
            skipped: vec![SkippedSource {
                path: PathBuf::from("summary.xlsx"),
                reason: SkipReason::YearUnresolvable,
            }],
            months_consolidated: 12,
            years: vec![2022],
            output: None,
        };

        let text = summary.to_string();
        assert!(text.contains("Sources processed: 1"));
        assert!(text.contains("summary.xlsx: no year in file name"));
        assert!(text.contains("Months consolidated: 12 across 1 year(s)"));
    }
}
