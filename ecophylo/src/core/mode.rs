//! Execution mode derived from which input catalogs were supplied.

use serde::Serialize;

use crate::core::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionMode {
    /// Only the metagenomes catalog was supplied.
    #[serde(rename = "metagenomes")]
    MetagenomesOnly,
    /// Only the external genomes catalog was supplied.
    #[serde(rename = "external_genomes")]
    ExternalGenomesOnly,
    #[serde(rename = "both")]
    Both,
}

impl ExecutionMode {
    pub fn resolve(
        metagenomes_present: bool,
        external_genomes_present: bool,
    ) -> Result<Self, ConfigError> {
        match (metagenomes_present, external_genomes_present) {
            (false, false) => Err(ConfigError::NoInputSource),
            (true, false) => Ok(ExecutionMode::MetagenomesOnly),
            (false, true) => Ok(ExecutionMode::ExternalGenomesOnly),
            (true, true) => Ok(ExecutionMode::Both),
        }
    }

    pub fn includes_metagenomes(self) -> bool {
        matches!(self, ExecutionMode::MetagenomesOnly | ExecutionMode::Both)
    }

    pub fn includes_external_genomes(self) -> bool {
        matches!(self, ExecutionMode::ExternalGenomesOnly | ExecutionMode::Both)
    }

    pub fn label(self) -> &'static str {
        match self {
            ExecutionMode::MetagenomesOnly => "metagenomes",
            ExecutionMode::ExternalGenomesOnly => "external_genomes",
            ExecutionMode::Both => "both",
        }
    }
}
