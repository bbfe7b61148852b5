//! Difference report built from a comparison result

use crate::compare::ComparisonResult;
use crate::error::Result;
use crate::table::{cell_text, Cell, Table};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

pub const PORT_NUMBER: &str = "Port Number";
pub const PARAMETER_NUMBER: &str = "Parameter Number";
pub const PARAMETER_NAME: &str = "Parameter Name";
pub const EXPECTED_VALUE: &str = "Expected Value";
pub const ACTUAL_VALUE: &str = "Actual Value";

/// Title prefix of per-column exports, followed by the column name
pub const EXPORT_TITLE_PREFIX: &str = "Differences in ";

/// Column layout of every per-column export table
pub const EXPORT_COLUMNS: [&str; 5] = [
    PORT_NUMBER,
    PARAMETER_NUMBER,
    PARAMETER_NAME,
    EXPECTED_VALUE,
    ACTUAL_VALUE,
];

/// Parameter columns of a Rhino export, compared when none are given
pub const DEFAULT_COMPARE_COLUMNS: [&str; 9] = [
    PORT_NUMBER,
    PARAMETER_NUMBER,
    PARAMETER_NAME,
    "Parameter Max Value",
    "Parameter Min Value",
    "Parameter Default Value",
    "Parameter Unit",
    "Parameter Writable",
    "Value Does Not Default",
];

const SECTION_RULE_WIDTH: usize = 100;

/// Identifying columns copied from the expected table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyColumns {
    pub port_number: Cell,
    pub parameter_number: Cell,
    pub parameter_name: Cell,
}

/// One differing cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceRecord {
    pub row_index: usize,
    pub column_name: String,
    pub key_columns: KeyColumns,
    pub expected_value: Cell,
    pub actual_value: Cell,
}

/// All differences of one compared column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSection {
    pub column: String,
    pub differences: Vec<DifferenceRecord>,
}

/// Grouped difference report; columns without differences have no section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub compared_columns: Vec<String>,
    pub sections: Vec<ColumnSection>,
}

impl Report {
    pub fn is_identical(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn difference_count(&self) -> usize {
        self.sections.iter().map(|s| s.differences.len()).sum()
    }

    pub fn records(&self) -> impl Iterator<Item = &DifferenceRecord> {
        self.sections.iter().flat_map(|s| s.differences.iter())
    }

    /// Plain-text body of the report
    pub fn render_text(&self) -> String {
        if self.is_identical() {
            return format!(
                "No differences found: tables are identical in columns: {}\n",
                self.compared_columns.join(", ")
            );
        }

        let mut out = String::new();
        for section in &self.sections {
            let _ = writeln!(out, "\nDifferences in {}", section.column);
            let _ = writeln!(out, "{}", "*".repeat(SECTION_RULE_WIDTH));
            out.push_str(&render_aligned(&section_rows(section)));
        }
        out
    }

    /// Write the report as plain text, replacing any previous file
    pub fn write_text(&self, path: &Path, header: Option<&ReportHeader>) -> Result<()> {
        let mut content = String::new();
        if let Some(header) = header {
            content.push_str(&header.render(&self.compared_columns));
        }
        content.push_str(&self.render_text());
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Provenance block written above a saved report
#[derive(Debug, Clone)]
pub struct ReportHeader {
    pub generated: DateTime<Local>,
    pub expected_source: String,
    pub actual_source: String,
}

impl ReportHeader {
    pub fn new(expected_source: impl Into<String>, actual_source: impl Into<String>) -> Self {
        Self {
            generated: Local::now(),
            expected_source: expected_source.into(),
            actual_source: actual_source.into(),
        }
    }

    fn render(&self, columns: &[String]) -> String {
        format!(
            "Parameter comparison report\nGenerated: {}\nExpected: {}\nActual: {}\nColumns: {}\n",
            self.generated.format("%Y-%m-%d %H:%M:%S"),
            self.expected_source,
            self.actual_source,
            columns.join(", ")
        )
    }
}

/// Names of the identifying columns in the compared tables
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    pub port_column: String,
    pub number_column: String,
    pub name_column: String,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self {
            port_column: PORT_NUMBER.to_string(),
            number_column: PARAMETER_NUMBER.to_string(),
            name_column: PARAMETER_NAME.to_string(),
        }
    }
}

impl ReportFormatter {
    /// Build the grouped report, one section per column with at least one difference
    pub fn format(&self, source: &Table, target: &Table, comparison: &ComparisonResult) -> Result<Report> {
        for column in [&self.port_column, &self.number_column, &self.name_column] {
            source.require_column(column)?;
        }

        let sections = comparison
            .columns()
            .filter_map(|column| {
                let differences: Vec<DifferenceRecord> = comparison
                    .differing_rows(column)
                    .map(|row| self.record(source, target, row, column))
                    .collect();

                (!differences.is_empty()).then(|| ColumnSection {
                    column: column.to_string(),
                    differences,
                })
            })
            .collect();

        Ok(Report {
            compared_columns: comparison.columns().map(str::to_string).collect(),
            sections,
        })
    }

    /// One `(title, table)` pair per column with differences, ready for export
    pub fn export_per_column(
        &self,
        source: &Table,
        target: &Table,
        comparison: &ComparisonResult,
    ) -> Result<Vec<(String, Table)>> {
        let report = self.format(source, target, comparison)?;

        Ok(report
            .sections
            .iter()
            .map(|section| {
                let title = format!("{}{}", EXPORT_TITLE_PREFIX, section.column);
                let mut table = Table::new(title.clone(), EXPORT_COLUMNS);
                for record in &section.differences {
                    table.push_row([
                        record.key_columns.port_number.clone(),
                        record.key_columns.parameter_number.clone(),
                        record.key_columns.parameter_name.clone(),
                        record.expected_value.clone(),
                        record.actual_value.clone(),
                    ]);
                }
                (title, table)
            })
            .collect())
    }

    fn record(&self, source: &Table, target: &Table, row: usize, column: &str) -> DifferenceRecord {
        DifferenceRecord {
            row_index: row,
            column_name: column.to_string(),
            key_columns: KeyColumns {
                port_number: source.value(row, &self.port_column).cloned(),
                parameter_number: source.value(row, &self.number_column).cloned(),
                parameter_name: source.value(row, &self.name_column).cloned(),
            },
            expected_value: source.value(row, column).cloned(),
            actual_value: target.value(row, column).cloned(),
        }
    }
}

fn section_rows(section: &ColumnSection) -> Vec<[String; 5]> {
    let header = EXPORT_COLUMNS.map(str::to_string);
    let body = section.differences.iter().map(|d| {
        [
            cell_text(d.key_columns.port_number.as_ref()),
            cell_text(d.key_columns.parameter_number.as_ref()),
            cell_text(d.key_columns.parameter_name.as_ref()),
            cell_text(d.expected_value.as_ref()),
            cell_text(d.actual_value.as_ref()),
        ]
    });
    std::iter::once(header).chain(body).collect()
}

/// Right-aligned fixed-width rendering, header first
fn render_aligned(rows: &[[String; 5]]) -> String {
    let mut widths = [0usize; 5];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:>width$}", cell, width = width))
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}
