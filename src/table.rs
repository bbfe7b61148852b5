//! In-memory table model shared by the comparison and curation pipelines

use crate::error::{CurateError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar cell value as produced by the loaders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// A cell is either a value or missing
pub type Cell = Option<Value>;

/// A row maps column name to cell, in table column order
pub type Row = IndexMap<String, Cell>;

/// Text used for a missing cell wherever a canonical string is needed
pub const MISSING_TEXT: &str = "nan";

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Canonical string form used for comparison and membership tests.
    ///
    /// Integral floats keep a trailing `.0` so that `1.0` and `1` stay distinct.
    pub fn canonical(&self) -> String {
        match self {
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => format_float(*f),
            Self::Text(s) => s.clone(),
        }
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) if f.is_finite() => Some(*f),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// Shortest round-trip text, switching to exponent form outside `1e-4..1e16`
fn format_float(f: f64) -> String {
    if f.is_nan() {
        return MISSING_TEXT.to_string();
    }
    if f.is_infinite() {
        let text = if f > 0.0 { "inf" } else { "-inf" };
        return text.to_string();
    }

    let scientific = format!("{:e}", f);
    if let Some((mantissa, exponent)) = scientific.split_once('e') {
        if let Ok(exponent) = exponent.parse::<i32>() {
            if f != 0.0 && !(-4..16).contains(&exponent) {
                let sign = if exponent < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
            }
        }
    }

    if f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

/// Canonical text of a cell, with missing cells rendered as `nan`
pub fn cell_text(cell: Option<&Value>) -> String {
    cell.map(Value::canonical)
        .unwrap_or_else(|| MISSING_TEXT.to_string())
}

/// Ordered rows over a fixed column set
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new<S: Into<String>>(name: impl Into<String>, columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row given cells in column order; missing trailing cells are filled as missing
    pub fn push_row(&mut self, cells: impl IntoIterator<Item = Cell>) {
        let mut cells = cells.into_iter();
        let row = self
            .columns
            .iter()
            .map(|col| (col.clone(), cells.next().flatten()))
            .collect();
        self.rows.push(row);
    }

    /// Same table with a new row set; every row is re-keyed to this table's columns
    pub fn with_rows(&self, rows: impl IntoIterator<Item = Row>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|col| (col.clone(), row.get(col).cloned().flatten()))
                    .collect()
            })
            .collect();

        Self {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Fail with `MissingColumn` unless the column exists
    pub fn require_column(&self, column: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(CurateError::missing_column(column, self.describe()))
        }
    }

    /// Value of a cell, `None` when missing or out of range
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column)).and_then(Option::as_ref)
    }

    /// New table keeping only rows matching the predicate, in order
    pub fn filter_rows(&self, mut keep: impl FnMut(&Row) -> bool) -> Self {
        Self {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// Project onto an allow-list of columns, keeping this table's column order
    pub fn select(&self, allow_list: &[String]) -> Result<Self> {
        for column in allow_list {
            self.require_column(column)?;
        }

        let columns: Vec<String> = self
            .columns
            .iter()
            .filter(|c| allow_list.contains(c))
            .cloned()
            .collect();

        let projected = Self {
            name: self.name.clone(),
            columns,
            rows: Vec::new(),
        };
        Ok(projected.with_rows(self.rows.iter().cloned()))
    }

    fn describe(&self) -> String {
        if self.name.is_empty() {
            "table".to_string()
        } else {
            format!("table '{}'", self.name)
        }
    }
}
