// ETL normalization layer
//
// Raw LVCVA report grids go through three steps:
// - metric_block: find the rows holding named metrics
// - normalizer: pivot those rows into one record per month
// - merger: combine all report years into one date-sorted dataset
// dataset_file persists the result as the CSV hand-off file.

pub mod dataset_file;
pub mod merger;
pub mod metric_block;
pub mod normalizer;

pub use dataset_file::{read_dataset, write_dataset, DatasetFileError};
pub use merger::{merge, MergeError};
pub use metric_block::MetricBlockDetector;
pub use normalizer::SheetNormalizer;
