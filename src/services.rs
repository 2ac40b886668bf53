pub mod analysis_service;
pub mod etl_service;

pub use analysis_service::{AnalysisError, AnalysisReport, AnalysisService, MetricImpact};
pub use etl_service::{
    EtlError, EtlService, ProcessedSource, RunSummary, SkipReason, SkippedSource,
};
