//! Error types for drivecurate operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CurateError>;

#[derive(Error, Debug)]
pub enum CurateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Shape mismatch: source has {source_rows} rows, target has {target_rows} rows")]
    ShapeMismatch {
        source_rows: usize,
        target_rows: usize,
    },

    #[error("No priority defined for value '{value}' in column '{column}'")]
    LookupError { column: String, value: String },

    #[error("Missing column '{column}' in {table}")]
    MissingColumn { column: String, table: String },

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Column '{column}' holds a non-integer value: {value}")]
    InvalidNumber { column: String, value: String },

    #[error("Missing auxiliary configuration key: {key}")]
    MissingConfigKey { key: String },

    #[error("Invalid value '{value}' for auxiliary configuration key '{key}'")]
    InvalidConfigValue { key: String, value: String },

    #[error("No exclusion table entry for {family} firmware {major}.{minor}")]
    UnmappedRevision { family: String, major: u32, minor: u32 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl CurateError {
    pub fn missing_column(column: impl Into<String>, table: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            table: table.into(),
        }
    }

    pub fn lookup(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::LookupError {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn sheet_not_found(name: impl Into<String>) -> Self {
        Self::SheetNotFound { name: name.into() }
    }

    pub fn invalid_number(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn missing_config_key(key: impl Into<String>) -> Self {
        Self::MissingConfigKey { key: key.into() }
    }

    pub fn invalid_config_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }
}
