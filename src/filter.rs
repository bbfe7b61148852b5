//! Row exclusion stages

use crate::error::{CurateError, Result};
use crate::table::Table;
use regex::Regex;

/// Markers that stand for an empty cell in exclusion lists
pub const BLANK_MARKERS: [&str; 3] = ["", "nan", "NaN"];

/// Remove rows whose `column` value is one of `banned`.
///
/// Missing cells never match by membership. They are removed only when
/// `banned` contains a blank marker.
pub fn exclude_by_values<S: AsRef<str>>(table: &Table, column: &str, banned: &[S]) -> Result<Table> {
    table.require_column(column)?;

    let drop_missing = banned
        .iter()
        .any(|value| BLANK_MARKERS.contains(&value.as_ref()));

    Ok(table.filter_rows(|row| match row.get(column).and_then(Option::as_ref) {
        Some(value) => {
            let text = value.canonical();
            !banned.iter().any(|b| b.as_ref() == text)
        }
        None => !drop_missing,
    }))
}

/// Remove rows whose `column` text contains a match of `pattern`
pub fn exclude_by_pattern(table: &Table, column: &str, pattern: &str) -> Result<Table> {
    let regex = Regex::new(pattern).map_err(|source| CurateError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    exclude_by_regex(table, column, &regex)
}

/// Same as [`exclude_by_pattern`] with a compiled expression
pub fn exclude_by_regex(table: &Table, column: &str, regex: &Regex) -> Result<Table> {
    table.require_column(column)?;

    Ok(table.filter_rows(|row| match row.get(column).and_then(Option::as_ref) {
        Some(value) => !regex.is_match(&value.canonical()),
        None => true,
    }))
}
