//! Tab-delimited table loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::core::table::Row;

/// Source of table rows keyed by header column.
///
/// Resolution only needs fully materialized rows; implementations decide how
/// paths are located and parsed.
pub trait TableReader {
    fn read_rows(&self, path: &Path) -> Result<Vec<Row>>;
}

/// Reads TSV files from disk, resolving relative paths against `root`.
#[derive(Debug, Clone)]
pub struct TsvReader {
    root: PathBuf,
}

impl TsvReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TableReader for TsvReader {
    fn read_rows(&self, path: &Path) -> Result<Vec<Row>> {
        let full_path = self.root.join(path);
        if !full_path.is_file() {
            bail!("no such file: {}", full_path.display());
        }
        let contents = fs::read_to_string(&full_path)
            .with_context(|| format!("read table {}", full_path.display()))?;
        let rows = parse_tsv(&contents).with_context(|| format!("parse table {}", path.display()))?;
        debug!(path = %full_path.display(), rows = rows.len(), "table loaded");
        Ok(rows)
    }
}

/// Parse TSV text whose first non-blank line is the header.
///
/// Blank lines are skipped. Every data line must have as many fields as the
/// header.
pub fn parse_tsv(contents: &str) -> Result<Vec<Row>> {
    let mut lines = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());
    let Some((_, header)) = lines.next() else {
        bail!("table is empty (expected a header line)");
    };
    let columns: Vec<String> = header.split('\t').map(|c| c.trim().to_string()).collect();

    let mut rows = Vec::new();
    for (index, line) in lines {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != columns.len() {
            bail!(
                "line {} has {} fields but the header has {}",
                index + 1,
                fields.len(),
                columns.len()
            );
        }
        let row: Row = columns
            .iter()
            .cloned()
            .zip(fields.into_iter().map(|f| f.trim().to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}
