//! Reference HMM list (`external_hmm_list`).

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::error::{ConfigError, NameConflict, NameSource};
use crate::core::table::{Row, require_column};

/// Separator used when reference names are interpolated into file names.
/// Downstream steps split generated names on it, so names must not contain it.
pub const RESERVED_SEPARATOR: char = '_';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub name: String,
    pub path: PathBuf,
}

/// Reference identifiers in source-file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReferenceSet {
    references: Vec<Reference>,
}

impl ReferenceSet {
    /// Build from rows with `name` and `path` columns.
    ///
    /// Rejects names containing the reserved separator, repeated names, and
    /// empty lists.
    pub fn from_rows(source: &Path, rows: &[Row]) -> Result<Self, ConfigError> {
        let mut references: Vec<Reference> = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let line = index + 1;
            let name = require_column(source, row, line, "name")?;
            let path = require_column(source, row, line, "path")?;
            if name.contains(RESERVED_SEPARATOR) {
                return Err(ConfigError::DuplicateEntryName {
                    name: name.to_string(),
                    conflict: NameConflict::ReservedSeparator {
                        source: source.to_path_buf(),
                    },
                });
            }
            if references.iter().any(|seen| seen.name == name) {
                return Err(ConfigError::DuplicateEntryName {
                    name: name.to_string(),
                    conflict: NameConflict::Duplicate {
                        first: NameSource::ReferenceList,
                        second: NameSource::ReferenceList,
                    },
                });
            }
            references.push(Reference {
                name: name.to_string(),
                path: PathBuf::from(path),
            });
        }
        if references.is_empty() {
            return Err(ConfigError::EmptyReferenceList {
                table: source.to_path_buf(),
            });
        }
        Ok(Self { references })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.references.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a Reference;
    type IntoIter = std::slice::Iter<'a, Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.references.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(entries: &[(&str, &str)]) -> Vec<Row> {
        entries
            .iter()
            .map(|(name, path)| {
                Row::from([
                    ("name".to_string(), name.to_string()),
                    ("path".to_string(), path.to_string()),
                ])
            })
            .collect()
    }

    #[test]
    fn keeps_source_order() {
        let set = ReferenceSet::from_rows(
            Path::new("hmms.txt"),
            &rows(&[("RiboL2", "hmms/L2"), ("RiboS3", "hmms/S3"), ("RecA", "hmms/RecA")]),
        )
        .expect("references");
        assert_eq!(set.names(), vec!["RiboL2", "RiboS3", "RecA"]);
    }

    #[test]
    fn rejects_underscore_in_name() {
        let err = ReferenceSet::from_rows(Path::new("hmms.txt"), &rows(&[("Ribo_L2", "hmms/L2")]))
            .expect_err("underscore");
        assert_eq!(
            err,
            ConfigError::DuplicateEntryName {
                name: "Ribo_L2".to_string(),
                conflict: NameConflict::ReservedSeparator {
                    source: PathBuf::from("hmms.txt")
                },
            }
        );
    }

    #[test]
    fn rejects_repeated_name() {
        let err = ReferenceSet::from_rows(
            Path::new("hmms.txt"),
            &rows(&[("RiboL2", "a"), ("RiboL2", "b")]),
        )
        .expect_err("duplicate");
        assert!(err.to_string().contains("appears more than once in the reference list"));
    }

    #[test]
    fn rejects_empty_list() {
        let err = ReferenceSet::from_rows(Path::new("hmms.txt"), &[]).expect_err("empty");
        assert_eq!(
            err,
            ConfigError::EmptyReferenceList {
                table: PathBuf::from("hmms.txt")
            }
        );
    }
}
