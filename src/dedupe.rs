//! Priority-based removal of duplicated parameters

use crate::error::{CurateError, Result};
use crate::table::{cell_text, Row, Table, Value};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Collapses rows sharing a key to the row with the best (lowest) priority rank
#[derive(Debug, Clone, Copy)]
pub struct Deduplicator<'a> {
    /// Column whose values must end up unique
    pub key_column: &'a str,
    /// Categorical column ranked through `priorities`
    pub priority_column: &'a str,
    /// Column the surviving rows are re-sorted by
    pub display_order_column: &'a str,
    /// Rank per category, lower is preferred
    pub priorities: &'a IndexMap<String, i64>,
}

impl Deduplicator<'_> {
    /// Keep one row per key.
    ///
    /// Rows are stable-sorted by descending rank, the last row of each key
    /// survives, and survivors are stable-sorted by the display-order column.
    pub fn dedupe(&self, table: &Table) -> Result<Table> {
        for column in [self.key_column, self.priority_column, self.display_order_column] {
            table.require_column(column)?;
        }

        let mut ranked = table
            .rows()
            .iter()
            .map(|row| self.rank(row).map(|rank| (rank, row)))
            .collect::<Result<Vec<(i64, &Row)>>>()?;
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        let mut last_position = HashMap::new();
        for (position, (_, row)) in ranked.iter().enumerate() {
            last_position.insert(self.key_of(row), position);
        }

        let mut survivors: Vec<&Row> = ranked
            .iter()
            .enumerate()
            .filter(|(position, (_, row))| last_position.get(&self.key_of(row)) == Some(position))
            .map(|(_, (_, row))| *row)
            .collect();

        survivors.sort_by(|a, b| {
            display_order(
                a.get(self.display_order_column).and_then(Option::as_ref),
                b.get(self.display_order_column).and_then(Option::as_ref),
            )
        });

        Ok(table.with_rows(survivors.into_iter().cloned()))
    }

    fn rank(&self, row: &Row) -> Result<i64> {
        let category = cell_text(row.get(self.priority_column).and_then(Option::as_ref));
        self.priorities
            .get(&category)
            .copied()
            .ok_or_else(|| CurateError::lookup(self.priority_column, category))
    }

    fn key_of(&self, row: &Row) -> String {
        cell_text(row.get(self.key_column).and_then(Option::as_ref))
    }
}

/// Ascending order: numbers by value, then text, then missing cells
fn display_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.canonical().cmp(&b.canonical()),
        },
    }
}
