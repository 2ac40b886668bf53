/// Shared utility functions for the tourism ETL
use chrono::NaiveDate;
use regex::Regex;

/// Extract the reporting year from a source identifier (usually a file name)
///
/// The year is the first standalone run of exactly four digits that falls in
/// 1900-2099. Digits glued to longer runs (e.g. `202203`) do not count, but
/// separators such as `_`, `-`, spaces or letters do delimit a run.
///
/// Returns `None` when no such token exists; the caller decides whether to
/// skip the source.
///
/// # Examples
///
/// ```
/// use tourism_etl::utils::extract_year;
///
/// assert_eq!(extract_year("Las Vegas 2022.xlsx"), Some(2022));
/// assert_eq!(extract_year("lvcva_ytd_2019_final.xlsx"), Some(2019));
/// assert_eq!(extract_year("executive-summary-2023-2024.xlsx"), Some(2023));
/// assert_eq!(extract_year("summary.xlsx"), None);
/// ```
pub fn extract_year(identifier: &str) -> Option<i32> {
    let re = Regex::new(r"\d+").ok()?;
    let year = re
        .find_iter(identifier)
        .filter(|m| m.as_str().len() == 4)
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .find(|year| (1900..=2099).contains(year));
    year
}

/// First calendar day of `(year, month)`, `None` for an invalid month
pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}
