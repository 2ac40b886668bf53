use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid report layout: {0}")]
    InvalidLayout(String),
}

/// Cell layout of one family of yearly report workbooks
///
/// Row and column indices are 0-based absolute sheet positions.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Sheet names are `sheet_prefix` followed by the report year
    pub sheet_prefix: String,
    /// Row holding the month-end dates
    pub date_row: usize,
    /// Month columns, January first
    pub date_columns: Vec<usize>,
    /// Column holding the metric names
    pub name_column: usize,
    /// Lower-case prefixes that mark the start of footer text
    pub footer_keywords: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sheet_prefix: "Las Vegas ".to_string(),
            date_row: 6,
            date_columns: (1..25).step_by(2).collect(),
            name_column: 0,
            footer_keywords: ["source", "note", "notes", "nota"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl LayoutConfig {
    /// Month columns starting at `first`, every `stride` columns
    pub fn strided_date_columns(first: usize, stride: usize, months: usize) -> Vec<usize> {
        (0..months).map(|i| first + i * stride).collect()
    }

    pub fn sheet_name(&self, year: i32) -> String {
        format!("{}{}", self.sheet_prefix, year)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.date_columns.is_empty() {
            return Err(ConfigError::InvalidLayout(
                "at least one date column is required".to_string(),
            ));
        }
        if self.date_columns.len() > 12 {
            return Err(ConfigError::InvalidLayout(format!(
                "{} date columns listed, a report year has at most 12 months",
                self.date_columns.len()
            )));
        }
        if self.footer_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::InvalidLayout(
                "footer keyword list is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// The event whose month is compared against the same month in other years
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventConfig {
    pub name: String,
    pub year: i32,
    pub month: u32,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            name: "Shows BTS".to_string(),
            year: 2022,
            month: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub raw_data_dir: PathBuf,
    pub processed_data_dir: PathBuf,
    pub graph_output_dir: PathBuf,
    pub source_extension: String,
    pub output_file_name: String,
    pub layout: LayoutConfig,
    pub event: EventConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw_data_dir: PathBuf::from("data/raw"),
            processed_data_dir: PathBuf::from("data/processed"),
            graph_output_dir: PathBuf::from("output/graphs"),
            source_extension: "xlsx".to_string(),
            output_file_name: "vegas_tourism_yearly.csv".to_string(),
            layout: LayoutConfig::default(),
            event: EventConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let default_layout = &defaults.layout;

        let first_date_column = parse_var("TOURISM_FIRST_DATE_COLUMN", 1usize)?;
        let stride = parse_var("TOURISM_DATE_COLUMN_STRIDE", 2usize)?;
        let months = parse_var("TOURISM_MONTH_COUNT", 12usize)?;
        if stride == 0 {
            return Err(ConfigError::InvalidValue {
                key: "TOURISM_DATE_COLUMN_STRIDE",
                value: "0".to_string(),
            });
        }

        let footer_keywords = match env::var("TOURISM_FOOTER_KEYWORDS") {
            Ok(raw) => raw
                .split(',')
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            Err(_) => default_layout.footer_keywords.clone(),
        };

        let layout = LayoutConfig {
            sheet_prefix: env::var("TOURISM_SHEET_PREFIX")
                .unwrap_or_else(|_| default_layout.sheet_prefix.clone()),
            date_row: parse_var("TOURISM_DATE_ROW", default_layout.date_row)?,
            date_columns: LayoutConfig::strided_date_columns(first_date_column, stride, months),
            name_column: parse_var("TOURISM_NAME_COLUMN", default_layout.name_column)?,
            footer_keywords,
        };
        layout.validate()?;

        let event_month = parse_var("TOURISM_EVENT_MONTH", defaults.event.month)?;
        if !(1..=12).contains(&event_month) {
            return Err(ConfigError::InvalidValue {
                key: "TOURISM_EVENT_MONTH",
                value: event_month.to_string(),
            });
        }

        Ok(Config {
            raw_data_dir: env::var("TOURISM_RAW_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.raw_data_dir),
            processed_data_dir: env::var("TOURISM_PROCESSED_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.processed_data_dir),
            graph_output_dir: env::var("TOURISM_GRAPH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.graph_output_dir),
            source_extension: env::var("TOURISM_SOURCE_EXTENSION")
                .unwrap_or(defaults.source_extension),
            output_file_name: env::var("TOURISM_OUTPUT_FILE").unwrap_or(defaults.output_file_name),
            layout,
            event: EventConfig {
                name: env::var("TOURISM_EVENT_NAME").unwrap_or(defaults.event.name),
                year: parse_var("TOURISM_EVENT_YEAR", defaults.event.year)?,
                month: event_month,
            },
        })
    }

    /// Well-known path of the tidy dataset hand-off file
    pub fn processed_data_file(&self) -> PathBuf {
        self.processed_data_dir.join(&self.output_file_name)
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}
