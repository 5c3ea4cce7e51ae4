//! Command-line flag table.
//!
//! Flag metadata is a static table keyed by [`FlagId`]. Accessors hand out
//! owned copies; nothing mutates the table.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagId {
    Workflow,
    ConfigFile,
    GetDefaultConfig,
    OutputFile,
    ListTargets,
    ListRules,
}

impl FlagId {
    pub const ALL: [FlagId; 6] = [
        FlagId::Workflow,
        FlagId::ConfigFile,
        FlagId::GetDefaultConfig,
        FlagId::OutputFile,
        FlagId::ListTargets,
        FlagId::ListRules,
    ];

    /// Identifier used for the clap argument.
    pub fn key(self) -> &'static str {
        match self {
            FlagId::Workflow => "workflow",
            FlagId::ConfigFile => "config-file",
            FlagId::GetDefaultConfig => "get-default-config",
            FlagId::OutputFile => "output-file",
            FlagId::ListTargets => "list-targets",
            FlagId::ListRules => "list-rules",
        }
    }
}

/// What a flag takes on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagValue {
    Path,
    Text,
    Switch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    pub names: Vec<&'static str>,
    pub metavar: Option<&'static str>,
    pub default: Option<&'static str>,
    pub required: bool,
    pub value: FlagValue,
    pub help: &'static str,
}

fn table(id: FlagId) -> FlagSpec {
    match id {
        FlagId::Workflow => FlagSpec {
            names: vec!["-w", "--workflow"],
            metavar: Some("WORKFLOW_NAME"),
            default: Some("external_ecophylo"),
            required: false,
            value: FlagValue::Text,
            help: "Workflow to resolve. Only 'external_ecophylo' is available.",
        },
        FlagId::ConfigFile => FlagSpec {
            names: vec!["-c", "--config-file"],
            metavar: Some("CONFIG_FILE"),
            default: None,
            required: false,
            value: FlagValue::Path,
            help: "Workflow configuration (JSON, or TOML when the file ends in .toml). \
                   Keys you leave out fall back to the defaults shown by --get-default-config, \
                   which name both catalogs: set 'metagenomes' or 'external_genomes' to null \
                   or \"\" to leave that catalog out.",
        },
        FlagId::GetDefaultConfig => FlagSpec {
            names: vec!["--get-default-config"],
            metavar: Some("OUTPUT_FILE"),
            default: None,
            required: false,
            value: FlagValue::Path,
            help: "Write the default configuration to OUTPUT_FILE and exit.",
        },
        FlagId::OutputFile => FlagSpec {
            names: vec!["-o", "--output-file"],
            metavar: Some("PLAN_FILE"),
            default: None,
            required: false,
            value: FlagValue::Path,
            help: "Write the resolved plan (mode, inputs, rule parameters, targets) as JSON.",
        },
        FlagId::ListTargets => FlagSpec {
            names: vec!["--list-targets"],
            metavar: None,
            default: None,
            required: false,
            value: FlagValue::Switch,
            help: "Print every target file the workflow must produce, one per line.",
        },
        FlagId::ListRules => FlagSpec {
            names: vec!["--list-rules"],
            metavar: None,
            default: None,
            required: false,
            value: FlagValue::Switch,
            help: "Print every rule and the parameters it accepts in the config file.",
        },
    }
}

/// Command-line spellings of a flag.
pub fn names(id: FlagId) -> Vec<&'static str> {
    table(id).names
}

/// Copy of a flag's table entry.
pub fn spec(id: FlagId) -> FlagSpec {
    table(id)
}

/// Build the clap argument for a flag.
pub fn arg(id: FlagId) -> Arg {
    let spec = spec(id);
    let mut arg = Arg::new(id.key()).help(spec.help).required(spec.required);
    for name in spec.names.iter().copied() {
        if let Some(long) = name.strip_prefix("--") {
            arg = arg.long(long);
        } else if let Some(short) = name.strip_prefix('-').and_then(|s| s.chars().next()) {
            arg = arg.short(short);
        }
    }
    if let Some(metavar) = spec.metavar {
        arg = arg.value_name(metavar);
    }
    if let Some(default) = spec.default {
        arg = arg.default_value(default);
    }
    match spec.value {
        FlagValue::Path => arg.action(ArgAction::Set).value_parser(value_parser!(PathBuf)),
        FlagValue::Text => arg.action(ArgAction::Set),
        FlagValue::Switch => arg.action(ArgAction::SetTrue),
    }
}
