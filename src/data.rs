//! Table loading and export: CSV through DuckDB, workbooks through calamine

use crate::error::{CurateError, Result};
use crate::table::{Cell, Table, Value};
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use duckdb::Connection;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Extensions opened as workbooks; everything else is read as CSV
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

const EXPORT_TABLE: &str = "export_table";

/// CSV reader and writer backed by an in-memory DuckDB connection
pub struct DataProcessor {
    connection: Connection,
}

impl DataProcessor {
    pub fn new() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute("SET enable_progress_bar=false", [])?;
        Ok(Self { connection })
    }

    /// Load a CSV file with every column read as text; empty fields are missing
    pub fn load_csv(&self, file_path: &Path, allow_list: Option<&[String]>) -> Result<Table> {
        if !file_path.is_file() {
            return Err(CurateError::invalid_input(format!(
                "File not found: {}",
                file_path.display()
            )));
        }

        let create_view_sql = format!(
            "CREATE OR REPLACE VIEW data_view AS SELECT * FROM read_csv({}, header = true, all_varchar = true)",
            sql_literal(&file_path.to_string_lossy())
        );
        self.connection
            .execute(&create_view_sql, [])
            .map_err(|e| convert_duckdb_error(e, file_path))?;

        let columns = self.view_columns()?;
        let mut table = Table::new(table_name(file_path), columns.iter().cloned());

        let mut stmt = self.connection.prepare("SELECT * FROM data_view")?;
        let rows = stmt.query_map([], |row| {
            let mut cells: Vec<Cell> = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                let cell = match row.get_ref(i)? {
                    duckdb::types::ValueRef::Null => None,
                    duckdb::types::ValueRef::Text(s) => Some(Value::Text(String::from_utf8_lossy(s).to_string())),
                    other => Some(Value::Text(format!("{:?}", other))),
                };
                cells.push(cell);
            }
            Ok(cells)
        })?;

        for row in rows {
            table.push_row(row.map_err(|e| {
                CurateError::invalid_input(format!(
                    "Failed to read row from {}: {}",
                    file_path.display(),
                    e
                ))
            })?);
        }

        log::debug!("Loaded {} rows from {}", table.len(), file_path.display());
        project(table, allow_list)
    }

    /// Column names of the current view, in file order
    fn view_columns(&self) -> Result<Vec<String>> {
        let mut stmt = self.connection.prepare("DESCRIBE data_view")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut columns = Vec::new();
        for name in names {
            columns.push(name?);
        }
        Ok(columns)
    }

    /// Write a table as CSV with a header row and no index column, replacing the file
    pub fn write_csv(&self, table: &Table, path: &Path) -> Result<()> {
        if table.columns().is_empty() {
            return Err(CurateError::invalid_input(format!(
                "Table '{}' has no columns to write",
                table.name()
            )));
        }

        let column_defs = table
            .columns()
            .iter()
            .map(|c| format!("{} VARCHAR", sql_identifier(c)))
            .collect::<Vec<_>>()
            .join(", ");
        self.connection.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} ({})",
            EXPORT_TABLE, column_defs
        ))?;

        {
            let mut appender = self.connection.appender(EXPORT_TABLE)?;
            for row in table.rows() {
                let values: Vec<Option<String>> = table
                    .columns()
                    .iter()
                    .map(|c| row.get(c).and_then(Option::as_ref).map(Value::canonical))
                    .collect();
                appender.append_row(duckdb::appender_params_from_iter(values))?;
            }
            appender.flush()?;
        }

        self.connection.execute_batch(&format!(
            "COPY {} TO {} (HEADER, DELIMITER ','); DROP TABLE {};",
            EXPORT_TABLE,
            sql_literal(&path.to_string_lossy()),
            EXPORT_TABLE
        ))?;

        log::debug!("Wrote {} rows to {}", table.len(), path.display());
        Ok(())
    }
}

/// Multi-sheet workbook opened once and read sheet by sheet
pub struct WorkbookReader {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
}

impl WorkbookReader {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CurateError::invalid_input(format!(
                "File not found: {}",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            workbook: open_workbook_auto(path)?,
        })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// Read one sheet; the first row is the header
    pub fn load_sheet(&mut self, name: &str, allow_list: Option<&[String]>) -> Result<Table> {
        if !self.sheet_names().iter().any(|s| s == name) {
            return Err(CurateError::sheet_not_found(format!(
                "{} in {}",
                name,
                self.path.display()
            )));
        }

        let range = self.workbook.worksheet_range(name)?;
        let mut rows = range.rows();

        let Some(header) = rows.next() else {
            return Ok(Table::new(name, Vec::<String>::new()));
        };
        let columns: Vec<String> = header.iter().map(|c| c.to_string().trim().to_string()).collect();

        let mut table = Table::new(name, columns);
        for row in rows {
            let cells: Vec<Cell> = row.iter().map(workbook_cell).collect();
            if cells.iter().all(Option::is_none) {
                continue;
            }
            table.push_row(cells);
        }

        log::debug!("Loaded {} rows from sheet '{}'", table.len(), name);
        project(table, allow_list)
    }
}

/// Load a CSV file, or one sheet of a workbook (first sheet when `sheet` is `None`)
pub fn load_table(path: &Path, sheet: Option<&str>, allow_list: Option<&[String]>) -> Result<Table> {
    if is_workbook(path) {
        let mut reader = WorkbookReader::open(path)?;
        let name = match sheet {
            Some(name) => name.to_string(),
            None => reader
                .sheet_names()
                .into_iter()
                .next()
                .ok_or_else(|| CurateError::invalid_input(format!("{} has no sheets", path.display())))?,
        };
        reader.load_sheet(&name, allow_list)
    } else {
        if let Some(sheet) = sheet {
            log::warn!("Ignoring sheet '{}' for non-workbook file {}", sheet, path.display());
        }
        DataProcessor::new()?.load_csv(path, allow_list)
    }
}

pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| WORKBOOK_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn workbook_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Value::Text(s.clone())),
        Data::Int(i) => Some(Value::Int(*i)),
        Data::Float(f) => Some(workbook_number(*f)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => Some(Value::Text(dt.to_string())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::Text(s.clone())),
    }
}

/// Workbooks store every number as a float; whole numbers load as integers
fn workbook_number(f: f64) -> Value {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Value::Int(f as i64)
    } else {
        Value::Float(f)
    }
}

fn project(table: Table, allow_list: Option<&[String]>) -> Result<Table> {
    match allow_list {
        Some(columns) => table.select(columns),
        None => Ok(table),
    }
}

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn sql_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn sql_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Map DuckDB load failures onto input errors with the file name attached
fn convert_duckdb_error(error: duckdb::Error, file_path: &Path) -> CurateError {
    let error_msg = error.to_string();

    if error_msg.contains("CSV Error")
        || error_msg.contains("Invalid CSV")
        || error_msg.contains("Unterminated quoted field")
    {
        CurateError::invalid_input(format!(
            "Malformed CSV file '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else if error_msg.contains("No files found") || error_msg.contains("does not exist") {
        CurateError::invalid_input(format!("File not found: {}", file_path.display()))
    } else if error_msg.contains("UTF-8") || error_msg.contains("encoding") {
        CurateError::invalid_input(format!(
            "File encoding error '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else {
        CurateError::DuckDb(error)
    }
}
