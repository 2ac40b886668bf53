/// Untyped spreadsheet grid
///
/// A `RawGrid` is the positional view of one report sheet exactly as it was
/// read: no header row, no type inference beyond the three cell kinds below.
/// Coordinates are absolute sheet positions (row 0 is the first sheet row even
/// when it is blank), so layout constants line up with what a person sees in
/// the workbook.
use calamine::{Data, Range};

/// A single raw cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// True for empty cells and for text that is only whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Trimmed textual form of the cell, `None` when blank
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Empty => None,
        }
    }

    /// Numeric coercion: unparseable or non-finite values become `None`, never 0
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Empty => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            // Excel serial, kept numeric so date rows stay comparable
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                CellValue::Text(s.clone())
            }
            Data::Bool(b) => CellValue::Text(b.to_string()),
            Data::Error(_) | Data::Empty => CellValue::Empty,
        }
    }
}

static EMPTY: CellValue = CellValue::Empty;

/// Immutable rows x columns grid of raw cells
///
/// Only the used area is stored; everything above or left of `origin` and
/// everything past the stored rows reads as `Empty`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawGrid {
    origin: (usize, usize),
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

impl RawGrid {
    /// Build a grid from explicit rows; short rows are padded with `Empty`
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self {
            origin: (0, 0),
            rows,
            width,
        }
    }

    /// Build a grid from a calamine worksheet range
    ///
    /// calamine trims leading empty rows/columns off a range. The range start
    /// is kept as the grid origin so indices match absolute sheet coordinates
    /// without allocating the trimmed area.
    pub fn from_range(range: &Range<Data>) -> Self {
        let (Some((start_row, start_col)), Some((end_row, end_col))) = (range.start(), range.end())
        else {
            return Self::default();
        };

        let origin = (start_row as usize, start_col as usize);
        let used_width = (end_col - start_col) as usize + 1;
        let rows = range
            .rows()
            .map(|row| row.iter().map(CellValue::from).collect())
            .collect();

        Self {
            origin,
            rows,
            width: origin.1 + used_width,
        }
    }

    pub fn height(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            self.origin.0 + self.rows.len()
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell at `(row, col)`; positions outside the grid read as `Empty`
    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        let (Some(row), Some(col)) = (row.checked_sub(self.origin.0), col.checked_sub(self.origin.1))
        else {
            return &EMPTY;
        };
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// True when every cell of the row is blank (or the row does not exist)
    pub fn is_row_blank(&self, row: usize) -> bool {
        row.checked_sub(self.origin.0)
            .and_then(|row| self.rows.get(row))
            .map_or(true, |cells| cells.iter().all(CellValue::is_blank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_blank_detection() {
        assert!(CellValue::Empty.is_blank());
        assert!(text("   ").is_blank());
        assert!(!text("Visitor Volume").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_as_number_never_coerces_to_zero() {
        assert_eq!(CellValue::Number(42.5).as_number(), Some(42.5));
        assert_eq!(text(" 87.3 ").as_number(), Some(87.3));
        assert_eq!(text("n/a").as_number(), None);
        assert_eq!(text("").as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_as_text_trims() {
        assert_eq!(text("  Visitor Volume ").as_text().as_deref(), Some("Visitor Volume"));
        assert_eq!(text(" ").as_text(), None);
        assert_eq!(CellValue::Number(3.0).as_text().as_deref(), Some("3"));
    }

    #[test]
    fn test_from_rows_pads_and_reads_out_of_bounds_as_empty() {
        let grid = RawGrid::from_rows(vec![
            vec![text("a")],
            vec![text("b"), CellValue::Number(1.0), CellValue::Number(2.0)],
        ]);

        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.get(0, 2), &CellValue::Empty);
        assert_eq!(grid.get(10, 10), &CellValue::Empty);
        assert_eq!(grid.get(1, 2), &CellValue::Number(2.0));
    }

    #[test]
    fn test_is_row_blank() {
        let grid = RawGrid::from_rows(vec![
            vec![CellValue::Empty, text("  ")],
            vec![CellValue::Empty, CellValue::Number(1.0)],
        ]);

        assert!(grid.is_row_blank(0));
        assert!(!grid.is_row_blank(1));
        assert!(grid.is_row_blank(5));
    }

    #[test]
    fn test_from_range_restores_absolute_coordinates() {
        let mut range = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Visitor Volume".to_string()));
        range.set_value((3, 2), Data::Float(3.5));

        let grid = RawGrid::from_range(&range);

        assert_eq!(grid.height(), 4);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.get(2, 1), &text("Visitor Volume"));
        assert_eq!(grid.get(3, 2), &CellValue::Number(3.5));
        assert!(grid.is_row_blank(0));
    }

    #[test]
    fn test_from_range_does_not_allocate_trimmed_area() {
        let mut range = Range::new((1_000_000, 200), (1_000_001, 201));
        range.set_value((1_000_000, 200), Data::Float(1.0));
        range.set_value((1_000_001, 201), Data::String("stray".to_string()));

        let grid = RawGrid::from_range(&range);

        assert_eq!(grid.rows.len(), 2);
        assert!(grid.rows.iter().all(|row| row.len() == 2));
        assert_eq!(grid.height(), 1_000_002);
        assert_eq!(grid.width(), 202);
        assert_eq!(grid.get(1_000_000, 200), &CellValue::Number(1.0));
        assert_eq!(grid.get(1_000_001, 201), &text("stray"));
        assert_eq!(grid.get(1_000_000, 199), &CellValue::Empty);
        assert!(grid.is_row_blank(6));
    }
}
