//! Test-only helpers: in-memory tables and small configurations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde_json::{Value, json};

use crate::core::table::Row;
use crate::io::table::{TableReader, parse_tsv};

/// [`TableReader`] backed by TSV text held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTables {
    tables: BTreeMap<PathBuf, String>,
}

impl InMemoryTables {
    /// One metagenome (`sample1`) and one reference (`RiboL2`), under the
    /// default table names.
    pub fn sample() -> Self {
        Self::default()
            .with_table(
                "metagenomes.txt",
                "name\tcontigs_db_path\nsample1\tdata/sample1/CONTIGS.db\n",
            )
            .with_table("external_hmm_list.txt", "name\tpath\nRiboL2\thmms/RiboL2\n")
    }

    pub fn with_table(mut self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.tables.insert(path.into(), contents.to_string());
        self
    }
}

impl TableReader for InMemoryTables {
    fn read_rows(&self, path: &Path) -> Result<Vec<Row>> {
        let contents = self
            .tables
            .get(path)
            .ok_or_else(|| anyhow!("no table registered at {}", path.display()))?;
        parse_tsv(contents)
    }
}

/// Config with only the metagenomes catalog, matching [`InMemoryTables::sample`].
pub fn minimal_config() -> Value {
    json!({
        "metagenomes": "metagenomes.txt",
        "external_genomes": null,
        "external_hmm_list": "external_hmm_list.txt",
    })
}

/// Temporary directory holding `files`, given as `(relative path, contents)`.
pub fn temp_workspace(files: &[(&str, &str)]) -> Result<tempfile::TempDir> {
    let temp = tempfile::tempdir()?;
    for (name, contents) in files {
        write_file(temp.path(), name, contents)?;
    }
    Ok(temp)
}

/// Write `contents` to `root/name`, creating parent directories.
pub fn write_file(root: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, contents)?;
    Ok(path)
}
