#![allow(dead_code)]

use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;

/// Row holding the month-end dates in the default report layout
pub const DATE_ROW: u32 = 6;

#[derive(Debug, Clone)]
pub enum Cell {
    Num(f64),
    Text(&'static str),
    Blank,
}

pub fn nums(values: &[f64]) -> Vec<Cell> {
    values.iter().map(|v| Cell::Num(*v)).collect()
}

/// Builder for a yearly LVCVA-style executive summary workbook
///
/// Row 0 holds a title, row 6 the month-end dates in every other column
/// starting at column 1 (the columns in between hold "% Chg"), metric rows
/// follow. Values are written under the date columns; each metric also gets a
/// percent-change value in the neighbouring column that must be ignored.
#[derive(Debug, Clone)]
pub struct ReportFixture {
    year: i32,
    sheet_name: String,
    leading_blank_rows: u32,
    metrics: Vec<(String, Vec<Cell>)>,
    footer: Option<&'static str>,
    blank_before_footer: bool,
}

impl ReportFixture {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            sheet_name: format!("Las Vegas {year}"),
            leading_blank_rows: 0,
            metrics: Vec::new(),
            footer: None,
            blank_before_footer: false,
        }
    }

    pub fn sheet_name(mut self, name: &str) -> Self {
        self.sheet_name = name.to_string();
        self
    }

    pub fn leading_blank_rows(mut self, rows: u32) -> Self {
        self.leading_blank_rows = rows;
        self
    }

    pub fn metric(mut self, name: &str, cells: Vec<Cell>) -> Self {
        self.metrics.push((name.to_string(), cells));
        self
    }

    pub fn footer(mut self, text: &'static str, blank_before: bool) -> Self {
        self.footer = Some(text);
        self.blank_before_footer = blank_before;
        self
    }

    pub fn write(&self, path: &Path) -> Result<(), XlsxError> {
        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name)?;
        sheet.write_string(0, 0, "Las Vegas Year-to-Date Executive Summary")?;
        sheet.write_string(2, 0, format!("Calendar Year {}", self.year))?;

        for month in 0..12u16 {
            let col = 1 + month * 2;
            let date = format!("{}-{:02}-01", self.year, month + 1);
            sheet.write_string(DATE_ROW, col, date)?;
            sheet.write_string(DATE_ROW, col + 1, "% Chg")?;
        }

        let mut row = DATE_ROW + 1 + self.leading_blank_rows;
        for (name, cells) in &self.metrics {
            sheet.write_string(row, 0, name.as_str())?;
            for (month, cell) in cells.iter().enumerate() {
                let col = 1 + month as u16 * 2;
                match cell {
                    Cell::Num(value) => {
                        sheet.write_number(row, col, *value)?;
                        sheet.write_number(row, col + 1, 0.042)?;
                    }
                    Cell::Text(text) => {
                        sheet.write_string(row, col, *text)?;
                    }
                    Cell::Blank => {}
                }
            }
            row += 1;
        }

        if let Some(footer) = self.footer {
            if self.blank_before_footer {
                row += 1;
            }
            sheet.write_string(row, 0, footer)?;
            sheet.write_string(row + 1, 0, "Hotel/Motel Occupancy includes weekend rates")?;
        }

        let notes = workbook.add_worksheet();
        notes.set_name("Definitions")?;
        notes.write_string(0, 0, "Visitor Volume: estimated number of visitors")?;

        workbook.save(path)?;
        Ok(())
    }
}
