//! Staged workflow resolution.
//!
//! `merge -> validate -> load -> mode -> engines -> plan`. Each stage is a
//! function from the previous stage's output to the next stage's input, and
//! the whole pipeline yields one immutable [`ResolvedWorkflow`]. Any stage
//! failing aborts before targets are planned.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::core::catalog::{CatalogKind, InputCatalog, InputSet};
use crate::core::dirs::{DirLayout, OUTPUT_DIRS};
use crate::core::engine::EngineSelection;
use crate::core::error::ConfigError;
use crate::core::key_path::KeyPath;
use crate::core::mode::ExecutionMode;
use crate::core::params::ParameterStore;
use crate::core::planner::{TargetList, plan_targets};
use crate::core::references::ReferenceSet;
use crate::core::table::Row;
use crate::definition::{
    CONFIG_VERSION, EXTERNAL_GENOMES, EXTERNAL_HMM_LIST, METAGENOMES, METAGENOMICS_RULE,
    WORKFLOW_NAME, WorkflowDefinition,
};
use crate::io::config::shape_violations;
use crate::io::table::TableReader;

/// How the upstream metagenomics workflow should be launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetagenomicsSettings {
    pub clusterize: bool,
    pub cluster_submission_params: Option<String>,
}

/// Everything the execution engine needs, resolved and validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedWorkflow {
    pub workflow_name: String,
    pub mode: ExecutionMode,
    pub inputs: InputSet,
    pub references: ReferenceSet,
    pub engines: EngineSelection,
    pub metagenomics: MetagenomicsSettings,
    pub dirs: DirLayout,
    pub rule_params: BTreeMap<String, Map<String, Value>>,
    pub targets: TargetList,
}

/// Output of the merge and validate stages.
struct ValidatedConfig {
    store: ParameterStore,
    dirs: DirLayout,
}

/// Table paths named by the configuration.
struct InputSources {
    metagenomes: Option<PathBuf>,
    external_genomes: Option<PathBuf>,
    references: PathBuf,
}

/// Output of the load stage.
struct LoadedInputs {
    inputs: InputSet,
    references: ReferenceSet,
}

impl WorkflowDefinition {
    /// Resolve `user_config` into a complete, validated plan.
    ///
    /// Tables named by the configuration are read through `tables`. Every call
    /// rebuilds all derived state from scratch.
    pub fn resolve(
        &self,
        user_config: &Value,
        tables: &dyn TableReader,
    ) -> Result<ResolvedWorkflow> {
        let store = merge_stage(self, user_config)?;
        let validated = validate_stage(self, user_config, store)?;
        let sources = input_sources(&validated.store)?;
        let loaded = load_stage(&sources, tables)?;
        let mode = mode_stage(&sources)?;
        let engines = engine_stage(&validated.store)?;
        let metagenomics = metagenomics_settings(&validated.store)?;

        let targets = plan_targets(&loaded.references, &engines, &validated.dirs)?;
        info!(
            workflow = self.name,
            mode = mode.label(),
            inputs = loaded.inputs.len(),
            references = loaded.references.len(),
            targets = targets.len(),
            "workflow resolved"
        );

        let rule_params = self
            .registry
            .rules()
            .iter()
            .map(|rule| (rule.name.clone(), validated.store.rule_params(&rule.name)))
            .collect();

        Ok(ResolvedWorkflow {
            workflow_name: self.name.to_string(),
            mode,
            inputs: loaded.inputs,
            references: loaded.references,
            engines,
            metagenomics,
            dirs: validated.dirs,
            rule_params,
            targets,
        })
    }
}

fn merge_stage(
    definition: &WorkflowDefinition,
    user_config: &Value,
) -> Result<ParameterStore, ConfigError> {
    let store = ParameterStore::new(
        &definition.defaults,
        user_config,
        &definition.required_paths(),
    )?;
    debug!("config merged");
    Ok(store)
}

fn validate_stage(
    definition: &WorkflowDefinition,
    user_config: &Value,
    store: ParameterStore,
) -> Result<ValidatedConfig> {
    let dirs_section = store.get(&KeyPath::from([OUTPUT_DIRS]))?;
    let mut violations = shape_violations(user_config)?;
    violations.extend(
        definition
            .registry
            .collect_violations(store.merged(), &definition.general_params),
    );
    violations.extend(DirLayout::unknown_keys(dirs_section));
    if !violations.is_empty() {
        return Err(ConfigError::InvalidParameters(violations).into());
    }

    let workflow_name = store.get_str(&KeyPath::from([WORKFLOW_NAME]))?;
    if workflow_name != definition.name {
        return Err(ConfigError::WorkflowMismatch {
            expected: definition.name.to_string(),
            found: workflow_name.to_string(),
        }
        .into());
    }
    let version_path = KeyPath::from([CONFIG_VERSION]);
    let version = match store.get(&version_path)? {
        Value::String(version) => version.clone(),
        Value::Number(version) => version.to_string(),
        _ => {
            return Err(ConfigError::InvalidValue {
                path: version_path,
                expected: "a version string",
            }
            .into());
        }
    };
    if version != definition.config_version {
        return Err(ConfigError::ConfigVersionMismatch {
            expected: definition.config_version.to_string(),
            found: version,
        }
        .into());
    }

    let dirs = DirLayout::from_section(dirs_section)?;
    debug!("config validated");
    Ok(ValidatedConfig { store, dirs })
}

fn input_sources(store: &ParameterStore) -> Result<InputSources, ConfigError> {
    let optional_path = |key: &str| -> Result<Option<PathBuf>, ConfigError> {
        Ok(store.get_optional_str(&KeyPath::from([key]))?.map(PathBuf::from))
    };
    let references = optional_path(EXTERNAL_HMM_LIST)?.ok_or(ConfigError::MissingReferenceList)?;
    Ok(InputSources {
        metagenomes: optional_path(METAGENOMES)?,
        external_genomes: optional_path(EXTERNAL_GENOMES)?,
        references,
    })
}

fn load_stage(sources: &InputSources, tables: &dyn TableReader) -> Result<LoadedInputs> {
    let mut catalogs = Vec::new();
    for (kind, path) in [
        (CatalogKind::Metagenomes, &sources.metagenomes),
        (CatalogKind::ExternalGenomes, &sources.external_genomes),
    ] {
        let Some(path) = path else {
            debug!(catalog = kind.config_key(), "catalog not supplied");
            continue;
        };
        let key = kind.config_key();
        let rows = tables.read_rows(path).with_context(|| {
            format!(
                "load '{key}' table {} (set '{key}' to null or \"\" if this catalog is not used)",
                path.display()
            )
        })?;
        catalogs.push(InputCatalog::from_rows(kind, path, &rows)?);
    }
    let inputs = InputSet::combine(&catalogs)?;

    let rows = read_table(tables, &sources.references, EXTERNAL_HMM_LIST)?;
    let references = ReferenceSet::from_rows(&sources.references, &rows)?;
    debug!(
        inputs = inputs.len(),
        references = references.len(),
        "inputs loaded"
    );
    Ok(LoadedInputs {
        inputs,
        references,
    })
}

fn read_table(tables: &dyn TableReader, path: &Path, key: &str) -> Result<Vec<Row>> {
    tables
        .read_rows(path)
        .with_context(|| format!("load '{key}' table {}", path.display()))
}

fn mode_stage(sources: &InputSources) -> Result<ExecutionMode, ConfigError> {
    ExecutionMode::resolve(
        sources.metagenomes.is_some(),
        sources.external_genomes.is_some(),
    )
}

fn engine_stage(store: &ParameterStore) -> Result<EngineSelection, ConfigError> {
    let engines = EngineSelection::from_params(store)?;
    engines.require_any()?;
    debug!(engines = ?engines.enabled().collect::<Vec<_>>(), "tree engines selected");
    Ok(engines)
}

fn metagenomics_settings(store: &ParameterStore) -> Result<MetagenomicsSettings, ConfigError> {
    let clusterize = store.get_bool(&KeyPath::from([METAGENOMICS_RULE, "clusterize"]))?;
    let cluster_submission_params = store
        .get_optional_str(&KeyPath::from([METAGENOMICS_RULE, "cluster_submission_params"]))?
        .map(str::to_string);
    Ok(MetagenomicsSettings {
        clusterize,
        cluster_submission_params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::TreeEngine;
    use crate::core::error::{NameConflict, NameSource, ParameterViolation};
    use crate::test_support::{InMemoryTables, minimal_config};
    use serde_json::json;

    fn config_error(err: &anyhow::Error) -> &ConfigError {
        err.downcast_ref::<ConfigError>()
            .unwrap_or_else(|| panic!("expected ConfigError, got {err:#}"))
    }

    fn resolve(config: Value, tables: &InMemoryTables) -> Result<ResolvedWorkflow> {
        WorkflowDefinition::external_ecophylo().resolve(&config, tables)
    }

    #[test]
    fn end_to_end_single_metagenome_iqtree() {
        let tables = InMemoryTables::default()
            .with_table("m.txt", "name\tcontigs_db_path\nsample1\tdata/sample1/CONTIGS.db\n")
            .with_table("hmms.txt", "name\tpath\nRiboL2\tribo.hmm\n");
        let config = json!({
            "metagenomes": "m.txt",
            "external_genomes": null,
            "external_hmm_list": "hmms.txt",
            "iqtree": {"run": true},
            "fasttree": {"run": false},
        });

        let plan = resolve(config, &tables).expect("resolve");
        assert_eq!(plan.mode, ExecutionMode::MetagenomesOnly);
        assert_eq!(plan.targets.len(), 6);
        let tree = plan.targets.iter().last().expect("tree target");
        assert!(tree.starts_with("EXTERNAL_ECO_PHYLO_WORKFLOW/05_TREES"));
        assert!(tree.ends_with("RiboL2.iqtree"));
        assert_eq!(
            plan.inputs.entries[0].input_dir,
            PathBuf::from("data/sample1")
        );
    }

    #[test]
    fn both_catalogs_resolve_to_both_mode() {
        let tables = InMemoryTables::sample().with_table(
            "external-genomes.txt",
            "name\tcontigs_db_path\nEcoli\tgenomes/Ecoli.db\n",
        );
        let mut config = minimal_config();
        config["external_genomes"] = json!("external-genomes.txt");
        let plan = resolve(config, &tables).expect("resolve");
        assert_eq!(plan.mode, ExecutionMode::Both);
        assert_eq!(plan.inputs.names(), vec!["sample1", "Ecoli"]);
    }

    #[test]
    fn no_catalog_is_no_input_source() {
        let mut config = minimal_config();
        config["metagenomes"] = json!("");
        let err = resolve(config, &InMemoryTables::sample()).expect_err("no input");
        assert_eq!(config_error(&err), &ConfigError::NoInputSource);
    }

    #[test]
    fn collects_every_unknown_parameter_before_failing() {
        let mut config = minimal_config();
        config["iqtree"]["--bogus"] = json!(1);
        config["align_muscle"] = json!({"--maxiters": 2});
        config["not_a_rule"] = json!({});
        config["output_dirs"] = json!({"PLOTS": "plots"});
        let err = resolve(config, &InMemoryTables::sample()).expect_err("violations");
        let ConfigError::InvalidParameters(violations) = config_error(&err) else {
            panic!("expected InvalidParameters, got {err:#}");
        };
        assert_eq!(violations.len(), 4);
        assert!(violations.contains(&ParameterViolation::UnknownParameter {
            rule: "iqtree".to_string(),
            key: "--bogus".to_string()
        }));
        assert!(violations.contains(&ParameterViolation::UnknownDirectory {
            key: "PLOTS".to_string()
        }));
    }

    #[test]
    fn shape_errors_are_reported_with_parameter_violations() {
        let mut config = minimal_config();
        config["metagenome"] = json!("metagenomes.txt");
        config["align_muscle"] = json!(4);
        config["iqtree"] = json!({"run": "yes", "--bogus": 1});
        config["fasttree"] = json!({"threads": 0});
        let err = resolve(config, &InMemoryTables::sample()).expect_err("violations");
        let ConfigError::InvalidParameters(violations) = config_error(&err) else {
            panic!("expected InvalidParameters, got {err:#}");
        };
        assert_eq!(violations.len(), 5, "{violations:?}");
        assert!(violations.contains(&ParameterViolation::UnknownSection {
            key: "metagenome".to_string()
        }));
        assert!(violations.contains(&ParameterViolation::NotAMapping {
            rule: "align_muscle".to_string()
        }));
        assert!(violations.contains(&ParameterViolation::UnknownParameter {
            rule: "iqtree".to_string(),
            key: "--bogus".to_string()
        }));
        let shapes: Vec<&str> = violations
            .iter()
            .filter_map(|violation| match violation {
                ParameterViolation::WrongShape { path, .. } => Some(path.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(shapes, vec!["iqtree.run", "fasttree.threads"]);
    }

    #[test]
    fn validation_runs_before_tables_are_read() {
        let mut config = minimal_config();
        config["fasttree"]["-gamma"] = json!(true);
        let err = resolve(config, &InMemoryTables::default()).expect_err("violations");
        assert!(matches!(
            config_error(&err),
            ConfigError::InvalidParameters(_)
        ));
    }

    #[test]
    fn passthrough_params_are_kept_in_rule_params() {
        let mut config = minimal_config();
        config["iqtree"]["-bb"] = json!(1000);
        let plan = resolve(config, &InMemoryTables::sample()).expect("resolve");
        let iqtree = &plan.rule_params["iqtree"];
        assert_eq!(iqtree.get("-bb"), Some(&json!(1000)));
        assert_eq!(iqtree.get("-m"), Some(&json!("MFP")));
        assert_eq!(iqtree.get("threads"), Some(&json!(5)));
        assert!(plan.rule_params.contains_key("cat_misc_data_to_one_file"));
    }

    #[test]
    fn underscore_reference_rejected_before_planning() {
        let tables = InMemoryTables::sample()
            .with_table("external_hmm_list.txt", "name\tpath\nRibo_L2\tribo.hmm\n");
        let err = resolve(minimal_config(), &tables).expect_err("underscore");
        assert!(matches!(
            config_error(&err),
            ConfigError::DuplicateEntryName {
                conflict: NameConflict::ReservedSeparator { .. },
                ..
            }
        ));
    }

    #[test]
    fn duplicate_names_across_catalogs_are_rejected() {
        let tables = InMemoryTables::sample().with_table(
            "external-genomes.txt",
            "name\tcontigs_db_path\nsample1\tgenomes/sample1.db\n",
        );
        let mut config = minimal_config();
        config["external_genomes"] = json!("external-genomes.txt");
        let err = resolve(config, &tables).expect_err("duplicate");
        assert_eq!(
            config_error(&err),
            &ConfigError::DuplicateEntryName {
                name: "sample1".to_string(),
                conflict: NameConflict::Duplicate {
                    first: NameSource::Catalog(CatalogKind::Metagenomes),
                    second: NameSource::Catalog(CatalogKind::ExternalGenomes),
                },
            }
        );
    }

    #[test]
    fn no_engine_selected_fails() {
        let mut config = minimal_config();
        config["fasttree"] = json!({"run": false});
        config["iqtree"] = json!({"run": false});
        let err = resolve(config, &InMemoryTables::sample()).expect_err("no engine");
        assert_eq!(config_error(&err), &ConfigError::NoEngineSelected);
    }

    #[test]
    fn default_engine_is_fasttree() {
        let plan = resolve(minimal_config(), &InMemoryTables::sample()).expect("resolve");
        assert_eq!(
            plan.engines.enabled().collect::<Vec<_>>(),
            vec![TreeEngine::FastTree]
        );
        let tree = plan.targets.iter().last().expect("tree");
        assert_eq!(tree.extension().and_then(|e| e.to_str()), Some("nwk"));
    }

    #[test]
    fn workflow_name_must_match() {
        let mut config = minimal_config();
        config["workflow_name"] = json!("metagenomics");
        let err = resolve(config, &InMemoryTables::sample()).expect_err("mismatch");
        assert_eq!(
            config_error(&err),
            &ConfigError::WorkflowMismatch {
                expected: "external_ecophylo".to_string(),
                found: "metagenomics".to_string()
            }
        );
    }

    #[test]
    fn numeric_config_version_is_accepted() {
        let mut config = minimal_config();
        config["config_version"] = json!(1);
        resolve(config, &InMemoryTables::sample()).expect("resolve");

        let mut config = minimal_config();
        config["config_version"] = json!("2");
        let err = resolve(config, &InMemoryTables::sample()).expect_err("version");
        assert!(matches!(
            config_error(&err),
            ConfigError::ConfigVersionMismatch { .. }
        ));
    }

    #[test]
    fn missing_reference_list_is_reported() {
        let mut config = minimal_config();
        config["external_hmm_list"] = Value::Null;
        let err = resolve(config, &InMemoryTables::sample()).expect_err("no references");
        assert_eq!(config_error(&err), &ConfigError::MissingReferenceList);
    }

    #[test]
    fn unreadable_table_is_not_a_config_error() {
        let mut config = minimal_config();
        config["metagenomes"] = json!("missing.txt");
        let err = resolve(config, &InMemoryTables::sample()).expect_err("missing table");
        assert!(err.downcast_ref::<ConfigError>().is_none());
        assert!(format!("{err:#}").contains("load 'metagenomes' table missing.txt"));
    }

    #[test]
    fn metagenomics_settings_follow_config() {
        let mut config = minimal_config();
        config["run_metagenomics_workflow"] =
            json!({"clusterize": true, "cluster_submission_params": "--partition=short"});
        let plan = resolve(config, &InMemoryTables::sample()).expect("resolve");
        assert_eq!(
            plan.metagenomics,
            MetagenomicsSettings {
                clusterize: true,
                cluster_submission_params: Some("--partition=short".to_string()),
            }
        );
    }

    #[test]
    fn output_dir_override_moves_trees() {
        let mut config = minimal_config();
        config["output_dirs"] = json!({"TREES": "trees"});
        let plan = resolve(config, &InMemoryTables::sample()).expect("resolve");
        assert_eq!(
            plan.targets.iter().last(),
            Some(Path::new("trees/RiboL2/RiboL2.nwk"))
        );
    }

    #[test]
    fn repeated_resolution_is_identical() {
        let definition = WorkflowDefinition::external_ecophylo();
        let tables = InMemoryTables::sample();
        let first = definition.resolve(&minimal_config(), &tables).expect("first");
        let second = definition.resolve(&minimal_config(), &tables).expect("second");
        assert_eq!(first, second);
    }
}
