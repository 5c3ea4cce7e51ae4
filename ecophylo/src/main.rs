//! Resolve the external ecophylo workflow: merged rule parameters, execution
//! mode, and the target files the pipeline must produce.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgMatches, Command};
use ecophylo::core::error::ConfigError;
use ecophylo::definition::{EXTERNAL_GENOMES, METAGENOMES, WorkflowDefinition};
use ecophylo::exit_codes;
use ecophylo::flags::{FlagId, arg};
use ecophylo::io::config::{load_config, write_config};
use ecophylo::io::plan_store::write_plan;
use ecophylo::io::table::TsvReader;
use ecophylo::logging;
use ecophylo::resolve::ResolvedWorkflow;
use tracing::debug;

fn cli() -> Command {
    Command::new("ecophylo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve workflow parameters and target files for external ecophylo")
        .args(FlagId::ALL.map(arg))
}

fn main() {
    logging::init();
    let matches = cli().get_matches();
    if let Err(err) = run(&matches) {
        eprintln!("{:#}", err);
        let code = if err.downcast_ref::<ConfigError>().is_some() {
            exit_codes::CONFIG
        } else {
            exit_codes::FAILURE
        };
        std::process::exit(code);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let definition = WorkflowDefinition::external_ecophylo();

    if let Some(workflow) = matches
        .get_one::<String>(FlagId::Workflow.key())
        .filter(|workflow| workflow.as_str() != definition.name)
    {
        return Err(ConfigError::WorkflowMismatch {
            expected: definition.name.to_string(),
            found: workflow.clone(),
        }
        .into());
    }

    if let Some(path) = matches.get_one::<PathBuf>(FlagId::GetDefaultConfig.key()) {
        write_config(path, definition.default_config())?;
        println!("default config written to {}", path.display());
        return Ok(());
    }

    let list_rules = matches.get_flag(FlagId::ListRules.key());
    if list_rules {
        print_rules(&definition);
    }

    let Some(config_path) = matches.get_one::<PathBuf>(FlagId::ConfigFile.key()) else {
        if list_rules {
            return Ok(());
        }
        bail!("missing --config-file (use --get-default-config to start one)");
    };

    let plan = resolve_from_file(&definition, config_path)?;

    if matches.get_flag(FlagId::ListTargets.key()) {
        for target in plan.targets.iter() {
            println!("{}", target.display());
        }
    } else {
        print_summary(&plan);
    }

    if let Some(output) = matches.get_one::<PathBuf>(FlagId::OutputFile.key()) {
        write_plan(output, &plan)?;
        println!("plan written to {}", output.display());
    }
    Ok(())
}

/// Load `config_path` and resolve it, reading tables relative to the
/// current directory.
fn resolve_from_file(
    definition: &WorkflowDefinition,
    config_path: &Path,
) -> Result<ResolvedWorkflow> {
    let config = load_config(config_path)?;
    let cwd = std::env::current_dir().context("read current directory")?;
    debug!(config = %config_path.display(), cwd = %cwd.display(), "resolving workflow");
    definition.resolve(&config, &TsvReader::new(cwd))
}

fn print_rules(definition: &WorkflowDefinition) {
    for rule in definition.registry.rules() {
        println!("{}: {}", rule.name, rule.params.join(", "));
    }
}

fn print_summary(plan: &ResolvedWorkflow) {
    println!("workflow: {}", plan.workflow_name);
    println!("mode: {}", plan.mode.label());
    let catalogs: Vec<&str> = [
        (plan.mode.includes_metagenomes(), METAGENOMES),
        (plan.mode.includes_external_genomes(), EXTERNAL_GENOMES),
    ]
    .into_iter()
    .filter_map(|(included, key)| included.then_some(key))
    .collect();
    println!("catalogs: {}", catalogs.join(", "));
    println!("inputs: {}", plan.inputs.names().join(", "));
    println!("references: {}", plan.references.names().join(", "));
    let engines: Vec<&str> = plan.engines.enabled().map(|engine| engine.rule()).collect();
    println!("tree engines: {}", engines.join(", "));
    println!("targets: {}", plan.targets.len());
}
