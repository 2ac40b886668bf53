// ! Raw report workbook loading and source discovery

pub mod sheet_loader;

pub use sheet_loader::{discover_sources, LoadError, RawSheetLoader};
