//! Terminal target planning.
//!
//! For every reference, in list order, the plan holds five fixed artifacts
//! followed by one tree per enabled engine:
//!
//! 1. renamed sequence table (`RIBOSOMAL_PROTEIN_FASTAS/R/R_external_gene_calls_all_renamed.tsv`)
//! 2. per-step sequence counts (`RIBOSOMAL_PROTEIN_MSA_STATS/R/R_stats.tsv`)
//! 3. interactive state import marker (`R_state_imported.done`)
//! 4. name reformatting marker (`R_combined.done`)
//! 5. merged misc data (`MISC_DATA/R_misc.tsv`)
//! 6. tree (`TREES/R/R.iqtree` and/or `TREES/R/R.nwk`)

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::dirs::{DirKey, DirLayout};
use crate::core::engine::{EngineSelection, TreeEngine};
use crate::core::error::ConfigError;
use crate::core::references::{Reference, ReferenceSet};

/// Fixed artifacts emitted per reference before its tree targets.
pub const FIXED_TARGETS_PER_REFERENCE: usize = 5;

/// Ordered output paths the pipeline must produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TargetList {
    targets: Vec<PathBuf>,
}

impl TargetList {
    fn push(&mut self, target: PathBuf) {
        self.targets.push(target);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.targets.iter().map(PathBuf::as_path)
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Enumerate every terminal target.
///
/// Fails with [`ConfigError::NoEngineSelected`] before emitting anything when
/// no tree engine is enabled.
pub fn plan_targets(
    references: &ReferenceSet,
    engines: &EngineSelection,
    dirs: &DirLayout,
) -> Result<TargetList, ConfigError> {
    engines.require_any()?;

    let mut targets = TargetList::default();
    for reference in references {
        for target in fixed_targets(reference, dirs) {
            targets.push(target);
        }
        for engine in engines.enabled() {
            targets.push(tree_target(reference, engine, dirs));
        }
    }
    Ok(targets)
}

fn fixed_targets(
    reference: &Reference,
    dirs: &DirLayout,
) -> [PathBuf; FIXED_TARGETS_PER_REFERENCE] {
    let name = reference.name.as_str();
    [
        dirs.get(DirKey::RibosomalProteinFastas)
            .join(name)
            .join(format!("{name}_external_gene_calls_all_renamed.tsv")),
        dirs.get(DirKey::RibosomalProteinMsaStats)
            .join(name)
            .join(format!("{name}_stats.tsv")),
        PathBuf::from(format!("{name}_state_imported.done")),
        PathBuf::from(format!("{name}_combined.done")),
        dirs.get(DirKey::MiscData).join(format!("{name}_misc.tsv")),
    ]
}

fn tree_target(reference: &Reference, engine: TreeEngine, dirs: &DirLayout) -> PathBuf {
    let name = reference.name.as_str();
    dirs.get(DirKey::Trees)
        .join(name)
        .join(format!("{name}.{}", engine.extension()))
}
