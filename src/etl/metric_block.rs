/// Metric block detection
///
/// LVCVA report sheets have no header row. Below the month-end date row sits
/// a run of named metric rows ("Visitor Volume", "Occupancy Rate", ...) whose
/// length changes between vintages, followed by blank rows and/or footnotes.
/// The detector finds that run so nothing downstream depends on a hard-coded
/// block length.
use tracing::debug;

use crate::config::LayoutConfig;
use crate::grid::RawGrid;
use crate::models::MetricBounds;

pub struct MetricBlockDetector {
    name_column: usize,
    date_row: usize,
    footer_keywords: Vec<String>,
}

impl MetricBlockDetector {
    pub fn new(layout: &LayoutConfig) -> Self {
        Self {
            name_column: layout.name_column,
            date_row: layout.date_row,
            footer_keywords: layout
                .footer_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Detect `[start_row, end_row)` of the metric block
    ///
    /// Scanning starts on the row after the date row, skips leading rows with a
    /// blank name cell, then extends while the name cell is filled, is not a
    /// footer marker and the row is not blank across the whole grid.
    pub fn detect_bounds(&self, grid: &RawGrid) -> MetricBounds {
        let height = grid.height();
        let mut start_row = self.date_row + 1;

        while start_row < height && grid.get(start_row, self.name_column).is_blank() {
            start_row += 1;
        }

        let mut end_row = start_row;
        while end_row < height {
            let cell = grid.get(end_row, self.name_column);
            if cell.is_blank() || grid.is_row_blank(end_row) {
                break;
            }
            if self.is_footer(cell.as_text().as_deref().unwrap_or_default()) {
                debug!("Footer marker at row {}", end_row);
                break;
            }
            end_row += 1;
        }

        let bounds = MetricBounds::new(start_row, end_row);
        debug!(
            "Metric block rows {}..{} ({} metrics)",
            bounds.start_row,
            bounds.end_row,
            bounds.len()
        );
        bounds
    }

    fn is_footer(&self, name: &str) -> bool {
        let folded = name.trim().to_lowercase();
        self.footer_keywords
            .iter()
            .any(|keyword| folded.starts_with(keyword.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellValue;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    /// Layout with dates on row 1 and two month columns (1 and 2)
    fn layout() -> LayoutConfig {
        LayoutConfig {
            date_row: 1,
            date_columns: vec![1, 2],
            ..LayoutConfig::default()
        }
    }

    fn sheet(body: Vec<Vec<CellValue>>) -> RawGrid {
        let mut rows = vec![
            vec![text("Las Vegas Year-to-Date Executive Summary")],
            vec![CellValue::Empty, text("2022-01-31"), text("2022-02-28")],
        ];
        rows.extend(body);
        RawGrid::from_rows(rows)
    }

    #[test]
    fn test_block_right_after_date_row() {
        let grid = sheet(vec![
            vec![text("Visitor Volume"), num(2_500_000.0), num(2_600_000.0)],
            vec![text("Occupancy"), num(71.2), num(75.0)],
        ]);

        let bounds = MetricBlockDetector::new(&layout()).detect_bounds(&grid);
        assert_eq!(bounds, MetricBounds::new(2, 4));
    }

    #[test]
    fn test_skips_leading_spacer_rows() {
        let grid = sheet(vec![
            vec![CellValue::Empty],
            vec![text("  "), num(9.0)],
            vec![text("Visitor Volume"), num(1.0), num(2.0)],
        ]);

        let bounds = MetricBlockDetector::new(&layout()).detect_bounds(&grid);
        assert_eq!(bounds, MetricBounds::new(4, 5));
    }

    #[test]
    fn test_stops_at_blank_row_and_ignores_following_rows() {
        let grid = sheet(vec![
            vec![text("Visitor Volume"), num(1.0), num(2.0)],
            vec![CellValue::Empty],
            vec![text("Convention Attendance"), num(3.0), num(4.0)],
        ]);

        let bounds = MetricBlockDetector::new(&layout()).detect_bounds(&grid);
        assert_eq!(bounds, MetricBounds::new(2, 3));
    }

    #[test]
    fn test_footer_marker_is_case_insensitive_and_excluded() {
        let grid = sheet(vec![
            vec![text("Visitor Volume"), num(1.0), num(2.0)],
            vec![text("Average Daily Room Rate"), num(150.0), num(160.0)],
            vec![text("SOURCE: LVCVA"), CellValue::Empty],
            vec![text("Gaming Revenue"), num(5.0), num(6.0)],
        ]);

        let bounds = MetricBlockDetector::new(&layout()).detect_bounds(&grid);
        assert_eq!(bounds, MetricBounds::new(2, 4));
    }

    #[test]
    fn test_footer_with_leading_whitespace() {
        let grid = sheet(vec![
            vec![text("Visitor Volume"), num(1.0)],
            vec![text("   Notes: preliminary figures")],
        ]);

        let bounds = MetricBlockDetector::new(&layout()).detect_bounds(&grid);
        assert_eq!(bounds, MetricBounds::new(2, 3));
    }

    #[test]
    fn test_metric_row_without_values_stays_in_block() {
        let grid = sheet(vec![
            vec![text("Visitor Volume"), num(1.0)],
            vec![text("Room Inventory")],
        ]);

        let bounds = MetricBlockDetector::new(&layout()).detect_bounds(&grid);
        assert_eq!(bounds.len(), 2);
    }

    #[test]
    fn test_block_length_drift_between_vintages() {
        let short = sheet(vec![
            vec![text("Visitor Volume"), num(1.0)],
            vec![text("Occupancy"), num(2.0)],
        ]);
        let long = sheet(vec![
            vec![text("Visitor Volume"), num(1.0)],
            vec![text("Occupancy"), num(2.0)],
            vec![text("Average Daily Room Rate"), num(3.0)],
            vec![text("Room Nights Occupied"), num(4.0)],
            vec![text("Note: 2023 adds two rows")],
        ]);

        let detector = MetricBlockDetector::new(&layout());
        assert_eq!(detector.detect_bounds(&short).len(), 2);
        assert_eq!(detector.detect_bounds(&long).len(), 4);
    }

    #[test]
    fn test_no_metrics_gives_empty_range() {
        let grid = sheet(vec![vec![CellValue::Empty], vec![CellValue::Empty]]);

        let bounds = MetricBlockDetector::new(&layout()).detect_bounds(&grid);
        assert!(bounds.is_empty());
        assert!(bounds.start_row <= bounds.end_row);
    }

    #[test]
    fn test_only_footer_gives_empty_range_at_footer() {
        let grid = sheet(vec![vec![text("Source: LVCVA")]]);

        let bounds = MetricBlockDetector::new(&layout()).detect_bounds(&grid);
        assert_eq!(bounds, MetricBounds::new(2, 2));
    }

    #[test]
    fn test_grid_shorter_than_date_row() {
        let grid = RawGrid::from_rows(vec![vec![text("title")]]);
        let detector = MetricBlockDetector::new(&LayoutConfig::default());

        let bounds = detector.detect_bounds(&grid);
        assert!(bounds.is_empty());
        assert_eq!(bounds.start_row, 7);
    }

    #[test]
    fn test_empty_grid() {
        let bounds = MetricBlockDetector::new(&layout()).detect_bounds(&RawGrid::default());
        assert!(bounds.is_empty());
    }
}
