//! User-facing configuration errors.
//!
//! Every variant is fatal for the `resolve` call that produced it. None are
//! retryable: the core performs no network or process I/O.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::catalog::CatalogKind;
use crate::core::key_path::KeyPath;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("config path '{path}' has no default and no override")]
    MissingDefault { path: KeyPath },

    #[error("config path '{path}' must be {expected}")]
    InvalidValue { path: KeyPath, expected: &'static str },

    #[error("invalid parameters in config:\n- {}", join_violations(.0))]
    InvalidParameters(Vec<ParameterViolation>),

    #[error("config is for workflow '{found}' but this is the '{expected}' workflow")]
    WorkflowMismatch { expected: String, found: String },

    #[error("config_version '{found}' is not supported (expected '{expected}')")]
    ConfigVersionMismatch { expected: String, found: String },

    #[error("no input source: set 'metagenomes', 'external_genomes', or both")]
    NoInputSource,

    #[error("table {} is not properly formatted: {detail}", .table.display())]
    MalformedTable { table: PathBuf, detail: String },

    #[error("entry name '{name}' {conflict}")]
    DuplicateEntryName { name: String, conflict: NameConflict },

    #[error("'external_hmm_list' must point to a reference list")]
    MissingReferenceList,

    #[error("reference list {} has no entries", .table.display())]
    EmptyReferenceList { table: PathBuf },

    #[error("no tree engine enabled: set 'iqtree.run' or 'fasttree.run' to true")]
    NoEngineSelected,
}

/// Why an entry or reference name was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameConflict {
    /// The name already appeared in `first`; seen again in `second`.
    Duplicate { first: NameSource, second: NameSource },
    /// The name contains the reserved `_` separator.
    ReservedSeparator { source: PathBuf },
}

impl fmt::Display for NameConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameConflict::Duplicate { first, second } if first == second => {
                write!(f, "appears more than once in {first}")
            }
            NameConflict::Duplicate { first, second } => {
                write!(f, "appears in both {first} and {second}")
            }
            NameConflict::ReservedSeparator { source } => write!(
                f,
                "in {} contains '_', which is reserved in generated file names",
                source.display()
            ),
        }
    }
}

/// Table an entry name was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    Catalog(CatalogKind),
    ReferenceList,
}

impl fmt::Display for NameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameSource::Catalog(kind) => write!(f, "the {} catalog", kind.config_key()),
            NameSource::ReferenceList => f.write_str("the reference list"),
        }
    }
}

/// One offending key found while validating the merged configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterViolation {
    /// Top-level key that is neither a rule nor a general parameter.
    UnknownSection { key: String },
    /// Rule entry whose value is not a mapping of parameters.
    NotAMapping { rule: String },
    /// Parameter the rule does not accept.
    UnknownParameter { rule: String, key: String },
    /// `output_dirs` entry naming a directory the workflow does not define.
    UnknownDirectory { key: String },
    /// Value at `path` does not have the documented shape.
    WrongShape { path: String, detail: String },
}

impl fmt::Display for ParameterViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterViolation::UnknownSection { key } => {
                write!(f, "'{key}' is not a rule or general parameter of this workflow")
            }
            ParameterViolation::NotAMapping { rule } => {
                write!(f, "rule '{rule}' must map parameter names to values")
            }
            ParameterViolation::UnknownParameter { rule, key } => {
                write!(f, "rule '{rule}' does not accept parameter '{key}'")
            }
            ParameterViolation::UnknownDirectory { key } => {
                write!(f, "output_dirs has no directory named '{key}'")
            }
            ParameterViolation::WrongShape { path, detail } => write!(f, "'{path}': {detail}"),
        }
    }
}

fn join_violations(violations: &[ParameterViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n- ")
}
