//! Positional cell-by-cell comparison of two parameter tables

use crate::error::{CurateError, Result};
use crate::table::{cell_text, Table, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How two cells are judged equal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// Canonical string equality; `1.0` and `1` differ
    #[default]
    Exact,
    /// Cells that both parse as numbers compare by value, everything else as `Exact`
    Numeric,
}

/// Per-column difference flags, one flag per row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    row_count: usize,
    flags: IndexMap<String, Vec<bool>>,
}

impl ComparisonResult {
    /// Compared columns, in the order they were requested
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Flags for one column
    pub fn column_flags(&self, column: &str) -> Option<&[bool]> {
        self.flags.get(column).map(Vec::as_slice)
    }

    pub fn is_different(&self, row: usize, column: &str) -> bool {
        self.column_flags(column)
            .and_then(|flags| flags.get(row).copied())
            .unwrap_or(false)
    }

    /// Row indices flagged in a column, top to bottom
    pub fn differing_rows<'a>(&'a self, column: &str) -> impl Iterator<Item = usize> + 'a {
        self.column_flags(column)
            .unwrap_or_default()
            .iter()
            .enumerate()
            .filter_map(|(i, flagged)| flagged.then_some(i))
    }

    /// Number of flagged cells across all columns
    pub fn total_differences(&self) -> usize {
        self.flags
            .values()
            .map(|flags| flags.iter().filter(|f| **f).count())
            .sum()
    }

    pub fn has_differences(&self) -> bool {
        self.flags.values().any(|flags| flags.iter().any(|f| *f))
    }

    /// Boolean table view of the result, one column per compared column
    pub fn to_table(&self) -> Table {
        let mut table = Table::new("comparison", self.flags.keys().cloned());
        for row in 0..self.row_count {
            table.push_row(
                self.flags
                    .values()
                    .map(|flags| Some(Value::Bool(flags[row]))),
            );
        }
        table
    }
}

/// Compares two tables row by row over a column set
#[derive(Debug, Clone, Copy, Default)]
pub struct DifferenceEngine {
    mode: ComparisonMode,
}

impl DifferenceEngine {
    pub fn new(mode: ComparisonMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    /// Compare `source` against `target` over `columns`.
    ///
    /// Rows are aligned by position. Tables of different length fail with
    /// `ShapeMismatch` and no partial result is produced.
    pub fn compare(&self, source: &Table, target: &Table, columns: &[String]) -> Result<ComparisonResult> {
        if columns.is_empty() {
            return Err(CurateError::invalid_input("No columns selected for comparison"));
        }

        if source.len() != target.len() {
            return Err(CurateError::ShapeMismatch {
                source_rows: source.len(),
                target_rows: target.len(),
            });
        }

        for column in columns {
            source.require_column(column)?;
            target.require_column(column)?;
        }

        let flags = columns
            .iter()
            .map(|column| {
                let column_flags = (0..source.len())
                    .map(|row| {
                        self.cells_differ(source.value(row, column), target.value(row, column))
                    })
                    .collect();
                (column.clone(), column_flags)
            })
            .collect();

        Ok(ComparisonResult {
            row_count: source.len(),
            flags,
        })
    }

    fn cells_differ(&self, expected: Option<&Value>, actual: Option<&Value>) -> bool {
        if self.mode == ComparisonMode::Numeric {
            let numbers = (
                expected.and_then(Value::as_f64),
                actual.and_then(Value::as_f64),
            );
            if let (Some(a), Some(b)) = numbers {
                return a != b;
            }
        }

        cell_text(expected) != cell_text(actual)
    }
}

/// Exact-mode comparison
pub fn compare(source: &Table, target: &Table, columns: &[String]) -> Result<ComparisonResult> {
    DifferenceEngine::default().compare(source, target, columns)
}
