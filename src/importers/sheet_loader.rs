use calamine::{open_workbook_auto, Reader};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LayoutConfig;
use crate::grid::RawGrid;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open workbook {path}: {msg}")]
    WorkbookOpen { path: PathBuf, msg: String },

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Failed to list source directory {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reader for the yearly LVCVA report workbooks
///
/// Each workbook carries one sheet per report year, named after the layout's
/// sheet prefix and the year (e.g. `Las Vegas 2022`).
pub struct RawSheetLoader {
    layout: LayoutConfig,
}

impl RawSheetLoader {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Load the year sheet of `path` as an untyped grid
    ///
    /// Looks up the exact sheet name first; if a vintage drifted on
    /// surrounding whitespace (e.g. `"Las Vegas  2021 "`), the first sheet whose
    /// trimmed name matches is used instead.
    pub fn load(&self, path: &Path, year: i32) -> Result<RawGrid, LoadError> {
        let expected = self.layout.sheet_name(year);
        debug!("Opening {} (sheet '{}')", path.display(), expected);

        let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::WorkbookOpen {
            path: path.to_path_buf(),
            msg: e.to_string(),
        })?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = if sheet_names.iter().any(|name| name == &expected) {
            expected.clone()
        } else {
            let wanted = normalize_sheet_name(&expected);
            match sheet_names
                .into_iter()
                .find(|name| normalize_sheet_name(name) == wanted)
            {
                Some(name) => {
                    warn!(
                        "Sheet '{}' not found in {}, using '{}'",
                        expected,
                        path.display(),
                        name
                    );
                    name
                }
                None => return Err(LoadError::SheetNotFound(expected)),
            }
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|_| LoadError::SheetNotFound(sheet_name.clone()))?;

        let grid = RawGrid::from_range(&range);
        debug!(
            "Loaded sheet '{}': {} rows x {} columns",
            sheet_name,
            grid.height(),
            grid.width()
        );
        Ok(grid)
    }
}

fn normalize_sheet_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// List the source workbooks in `dir` whose extension matches `extension`
///
/// Matching is case-insensitive and the result is sorted by path, so the
/// processing order does not depend on directory iteration order.
pub fn discover_sources(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, LoadError> {
    let wanted = extension.trim_start_matches('.').to_lowercase();
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Discovery {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Discovery {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.to_lowercase() == wanted);
        if matches {
            sources.push(path);
        }
    }

    sources.sort();
    info!(
        "Found {} .{} source(s) in {}",
        sources.len(),
        wanted,
        dir.display()
    );
    Ok(sources)
}
