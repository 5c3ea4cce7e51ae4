//! Workflow definitions: rules, parameter whitelists, defaults, directories.

use serde_json::{Value, json};

use crate::core::dirs::{DirLayout, OUTPUT_DIRS};
use crate::core::engine::TreeEngine;
use crate::core::key_path::KeyPath;
use crate::core::registry::{ADDITIONAL_PARAMS, RuleRegistry, RuleSpec};

pub const WORKFLOW_NAME: &str = "workflow_name";
pub const CONFIG_VERSION: &str = "config_version";
pub const METAGENOMES: &str = "metagenomes";
pub const EXTERNAL_GENOMES: &str = "external_genomes";
pub const EXTERNAL_HMM_LIST: &str = "external_hmm_list";

/// Rule that launches the upstream metagenomics workflow.
pub const METAGENOMICS_RULE: &str = "run_metagenomics_workflow";

/// Static description of a workflow. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct WorkflowDefinition {
    pub name: &'static str,
    pub config_version: &'static str,
    pub registry: RuleRegistry,
    pub general_params: Vec<&'static str>,
    pub defaults: Value,
}

impl WorkflowDefinition {
    /// The external ecophylo workflow: reference-protein trees across
    /// metagenomes and/or external genomes.
    pub fn external_ecophylo() -> Self {
        let mut registry = RuleRegistry::default();
        for (rule, params) in [
            ("anvi_run_hmms_hmmsearch", &[][..]),
            (
                "filter_hmm_hits_by_query_coverage",
                &["--hmm-source", "--query-coverage", ADDITIONAL_PARAMS][..],
            ),
            ("anvi_get_sequences_for_hmm_hits_SCGs", &["--hmm-source"][..]),
            ("anvi_estimate_scg_taxonomy_for_SCGs", &["--metagenome-mode"][..]),
            ("filter_for_scg_sequences_and_metadata", &[][..]),
            ("cat_ribo_proteins_to_one_fasta", &[][..]),
            ("anvi_script_reformat_fasta", &[][..]),
            ("cat_misc_data_to_one_file", &[][..]),
            ("join_renamed_fasta_with_misc_data", &[][..]),
            ("remove_redundant_sequences_mmseqs", &["--min-seq-id"][..]),
            ("align_muscle", &[][..]),
            ("trim_alignment", &["-gt", "-gappyout", ADDITIONAL_PARAMS][..]),
            ("remove_sequences_with_X_percent_gaps", &["--max-percentage-gaps"][..]),
            ("get_gap_count_distribution", &[][..]),
            ("filter_out_outlier_sequences", &["-M"][..]),
            ("anvi_get_sequences_for_gene_calls", &[][..]),
            ("fasttree", &["run"][..]),
            ("iqtree", &["run", "-m", ADDITIONAL_PARAMS][..]),
            (METAGENOMICS_RULE, &["clusterize", "cluster_submission_params"][..]),
        ] {
            registry.register(RuleSpec::new(rule, params));
        }

        let defaults = json!({
            WORKFLOW_NAME: "external_ecophylo",
            CONFIG_VERSION: "1",
            METAGENOMES: "metagenomes.txt",
            EXTERNAL_GENOMES: "external-genomes.txt",
            EXTERNAL_HMM_LIST: "external_hmm_list.txt",
            OUTPUT_DIRS: DirLayout::default_section(),
            "anvi_script_reformat_fasta": {"threads": 5},
            "anvi_run_hmms_hmmsearch": {"threads": 5},
            "filter_hmm_hits_by_query_coverage": {"threads": 5, "--query-coverage": 0.8, "--hmm-source": "Bacteria_71"},
            "anvi_estimate_scg_taxonomy_for_SCGs": {"threads": 5, "--metagenome-mode": true},
            "filter_for_scg_sequences_and_metadata": {"threads": 5},
            "cat_ribo_proteins_to_one_fasta": {"threads": 5},
            "anvi_get_sequences_for_hmm_hits_SCGs": {"threads": 5, "--hmm-source": "Bacteria_71"},
            "join_renamed_fasta_with_misc_data": {"threads": 5},
            "remove_redundant_sequences_mmseqs": {"threads": 5, "--min-seq-id": 0.94},
            "align_muscle": {"threads": 5},
            "remove_sequences_with_X_percent_gaps": {"threads": 5, "--max-percentage-gaps": 50},
            "get_gap_count_distribution": {"threads": 5},
            "filter_out_outlier_sequences": {"threads": 5},
            "trim_alignment": {"threads": 5, "-gappyout": true},
            "fasttree": {"run": true, "threads": 5},
            "iqtree": {"run": false, "threads": 5, "-m": "MFP"},
            METAGENOMICS_RULE: {"threads": 10, "clusterize": false, "cluster_submission_params": ""},
        });

        Self {
            name: "external_ecophylo",
            config_version: "1",
            registry,
            general_params: vec![
                WORKFLOW_NAME,
                CONFIG_VERSION,
                METAGENOMES,
                EXTERNAL_GENOMES,
                EXTERNAL_HMM_LIST,
                OUTPUT_DIRS,
            ],
            defaults,
        }
    }

    /// Paths the workflow reads; each must resolve after merging.
    pub fn required_paths(&self) -> Vec<KeyPath> {
        let mut paths: Vec<KeyPath> = self
            .general_params
            .iter()
            .map(|param| KeyPath::from([*param]))
            .collect();
        paths.extend(TreeEngine::ALL.into_iter().map(TreeEngine::run_path));
        paths.push(KeyPath::from([METAGENOMICS_RULE, "clusterize"]));
        paths.push(KeyPath::from([METAGENOMICS_RULE, "cluster_submission_params"]));
        paths
    }

    /// Default configuration document, as written by `--get-default-config`.
    pub fn default_config(&self) -> &Value {
        &self.defaults
    }
}
