//! Input catalogs: metagenomes and external genomes.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::error::{ConfigError, NameConflict, NameSource};
use crate::core::table::{Row, require_column};

/// Which of the two input catalogs an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Metagenomes,
    ExternalGenomes,
}

impl CatalogKind {
    /// Top-level config key holding this catalog's table path.
    pub fn config_key(self) -> &'static str {
        match self {
            CatalogKind::Metagenomes => "metagenomes",
            CatalogKind::ExternalGenomes => "external_genomes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub contigs_db_path: PathBuf,
}

impl CatalogEntry {
    /// Directory holding the entry's contigs database.
    pub fn input_dir(&self) -> PathBuf {
        self.contigs_db_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

/// A catalog table parsed into entries, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputCatalog {
    pub kind: CatalogKind,
    pub source: PathBuf,
    pub entries: Vec<CatalogEntry>,
}

impl InputCatalog {
    /// Build a catalog from rows with `name` and `contigs_db_path` columns.
    pub fn from_rows(kind: CatalogKind, source: &Path, rows: &[Row]) -> Result<Self, ConfigError> {
        let mut entries = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let line = index + 1;
            let name = require_column(source, row, line, "name")?;
            let path = require_column(source, row, line, "contigs_db_path")?;
            entries.push(CatalogEntry {
                name: name.to_string(),
                contigs_db_path: PathBuf::from(path),
            });
        }
        Ok(Self {
            kind,
            source: source.to_path_buf(),
            entries,
        })
    }
}

/// One input dataset after both catalogs are combined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputEntry {
    pub name: String,
    pub contigs_db_path: PathBuf,
    pub input_dir: PathBuf,
    pub catalog: CatalogKind,
}

/// All input datasets, metagenomes first, with globally unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputSet {
    pub entries: Vec<InputEntry>,
}

impl InputSet {
    /// Combine the supplied catalogs, rejecting any name seen twice.
    pub fn combine<'a, I>(catalogs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = &'a InputCatalog>,
    {
        let mut entries: Vec<InputEntry> = Vec::new();
        for catalog in catalogs {
            for entry in &catalog.entries {
                if let Some(first) = entries.iter().find(|seen| seen.name == entry.name) {
                    return Err(ConfigError::DuplicateEntryName {
                        name: entry.name.clone(),
                        conflict: NameConflict::Duplicate {
                            first: NameSource::Catalog(first.catalog),
                            second: NameSource::Catalog(catalog.kind),
                        },
                    });
                }
                entries.push(InputEntry {
                    name: entry.name.clone(),
                    contigs_db_path: entry.contigs_db_path.clone(),
                    input_dir: entry.input_dir(),
                    catalog: catalog.kind,
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Distinct input directories, sorted.
    pub fn unique_dirs(&self) -> BTreeSet<&Path> {
        self.entries
            .iter()
            .map(|entry| entry.input_dir.as_path())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
