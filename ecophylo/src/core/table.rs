//! Rows of tab-delimited input tables, keyed by header column.

use std::collections::BTreeMap;
use std::path::Path;

use crate::core::error::ConfigError;

/// One table row: header column name -> cell value.
pub type Row = BTreeMap<String, String>;

/// Return the non-empty value of `column` in `row`.
///
/// `line` is the 1-indexed data line, used only for the error message.
pub fn require_column<'a>(
    table: &Path,
    row: &'a Row,
    line: usize,
    column: &str,
) -> Result<&'a str, ConfigError> {
    match row.get(column).map(|value| value.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        Some(_) => Err(ConfigError::MalformedTable {
            table: table.to_path_buf(),
            detail: format!("row {line} has an empty '{column}' value"),
        }),
        None => Err(ConfigError::MalformedTable {
            table: table.to_path_buf(),
            detail: format!("missing required column '{column}'"),
        }),
    }
}
