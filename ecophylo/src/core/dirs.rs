//! Output directory layout.
//!
//! Directories are addressed by [`DirKey`], never by free-form strings. The
//! default table is static; users may relocate any directory through the
//! `output_dirs` config section.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::error::{ConfigError, ParameterViolation};
use crate::core::key_path::KeyPath;

/// Config section that overrides directory locations.
pub const OUTPUT_DIRS: &str = "output_dirs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DirKey {
    #[serde(rename = "LOGS_DIR")]
    Logs,
    #[serde(rename = "EXTRACTED_RIBO_PROTEINS_DIR")]
    ExtractedRiboProteins,
    #[serde(rename = "RIBOSOMAL_PROTEIN_FASTAS")]
    RibosomalProteinFastas,
    #[serde(rename = "MSA")]
    Msa,
    #[serde(rename = "RIBOSOMAL_PROTEIN_MSA_STATS")]
    RibosomalProteinMsaStats,
    #[serde(rename = "TREES")]
    Trees,
    #[serde(rename = "MISC_DATA")]
    MiscData,
    #[serde(rename = "SCG_NT_FASTAS")]
    ScgNtFastas,
    #[serde(rename = "RIBOSOMAL_PROTEIN_FASTAS_RENAMED")]
    RibosomalProteinFastasRenamed,
}

impl DirKey {
    pub const ALL: [DirKey; 9] = [
        DirKey::Logs,
        DirKey::ExtractedRiboProteins,
        DirKey::RibosomalProteinFastas,
        DirKey::Msa,
        DirKey::RibosomalProteinMsaStats,
        DirKey::Trees,
        DirKey::MiscData,
        DirKey::ScgNtFastas,
        DirKey::RibosomalProteinFastasRenamed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DirKey::Logs => "LOGS_DIR",
            DirKey::ExtractedRiboProteins => "EXTRACTED_RIBO_PROTEINS_DIR",
            DirKey::RibosomalProteinFastas => "RIBOSOMAL_PROTEIN_FASTAS",
            DirKey::Msa => "MSA",
            DirKey::RibosomalProteinMsaStats => "RIBOSOMAL_PROTEIN_MSA_STATS",
            DirKey::Trees => "TREES",
            DirKey::MiscData => "MISC_DATA",
            DirKey::ScgNtFastas => "SCG_NT_FASTAS",
            DirKey::RibosomalProteinFastasRenamed => "RIBOSOMAL_PROTEIN_FASTAS_RENAMED",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Default location, relative to the working directory.
    pub fn default_path(self) -> &'static str {
        match self {
            DirKey::Logs => "EXTERNAL_ECO_PHYLO_WORKFLOW/00_LOGS",
            DirKey::ExtractedRiboProteins => "EXTERNAL_ECO_PHYLO_WORKFLOW/01_REFERENCE_PROTEIN_DATA",
            DirKey::RibosomalProteinFastas => "EXTERNAL_ECO_PHYLO_WORKFLOW/02_NR_FASTAS",
            DirKey::Msa => "EXTERNAL_ECO_PHYLO_WORKFLOW/03_MSA",
            DirKey::RibosomalProteinMsaStats => "EXTERNAL_ECO_PHYLO_WORKFLOW/04_SEQUENCE_STATS",
            DirKey::Trees => "EXTERNAL_ECO_PHYLO_WORKFLOW/05_TREES",
            DirKey::MiscData => "EXTERNAL_ECO_PHYLO_WORKFLOW/06_MISC_DATA",
            DirKey::ScgNtFastas => "EXTERNAL_ECO_PHYLO_WORKFLOW/07_SCG_NT_FASTAS",
            DirKey::RibosomalProteinFastasRenamed => {
                "EXTERNAL_ECO_PHYLO_WORKFLOW/08_RIBOSOMAL_PROTEIN_FASTAS_RENAMED"
            }
        }
    }
}

/// Resolved directory for every [`DirKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DirLayout {
    dirs: BTreeMap<DirKey, PathBuf>,
}

impl Default for DirLayout {
    fn default() -> Self {
        Self {
            dirs: DirKey::ALL
                .into_iter()
                .map(|key| (key, PathBuf::from(key.default_path())))
                .collect(),
        }
    }
}

impl DirLayout {
    /// The default table as a config section (`DIR_NAME -> path`).
    pub fn default_section() -> Value {
        let section: Map<String, Value> = DirKey::ALL
            .into_iter()
            .map(|key| (key.name().to_string(), Value::from(key.default_path())))
            .collect();
        Value::Object(section)
    }

    /// Keys in an `output_dirs` section that name no known directory.
    pub fn unknown_keys(section: &Value) -> Vec<ParameterViolation> {
        section
            .as_object()
            .map(|map| {
                map.keys()
                    .filter(|key| DirKey::from_name(key).is_none())
                    .map(|key| ParameterViolation::UnknownDirectory { key: key.clone() })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Apply an `output_dirs` section on top of the defaults.
    ///
    /// Unknown keys are ignored here; report them with [`Self::unknown_keys`].
    pub fn from_section(section: &Value) -> Result<Self, ConfigError> {
        let section_path = KeyPath::from([OUTPUT_DIRS]);
        let map = section.as_object().ok_or_else(|| ConfigError::InvalidValue {
            path: section_path.clone(),
            expected: "a mapping of directory names to paths",
        })?;
        let mut layout = Self::default();
        for (name, value) in map {
            let Some(key) = DirKey::from_name(name) else {
                continue;
            };
            let path = value
                .as_str()
                .filter(|path| !path.trim().is_empty())
                .ok_or_else(|| ConfigError::InvalidValue {
                    path: section_path.child(name.as_str()),
                    expected: "a non-empty path",
                })?;
            layout.dirs.insert(key, PathBuf::from(path));
        }
        Ok(layout)
    }

    pub fn get(&self, key: DirKey) -> &Path {
        self.dirs
            .get(&key)
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(key.default_path()))
    }
}
