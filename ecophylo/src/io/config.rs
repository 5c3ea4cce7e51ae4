//! Workflow configuration documents (`config.json` or `config.toml`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::debug;

use crate::core::error::ParameterViolation;

const CONFIG_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/config/v1.schema.json"
));

/// Load a user configuration document.
///
/// Files ending in `.toml` are parsed as TOML, everything else as JSON. The
/// document's shape is checked later, together with the rule parameters, by
/// [`shape_violations`].
pub fn load_config(path: &Path) -> Result<Value> {
    debug!(path = %path.display(), "loading config");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    parse_config(path, &contents)
}

fn parse_config(path: &Path, contents: &str) -> Result<Value> {
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        return toml::from_str(contents).with_context(|| format!("parse {}", path.display()));
    }
    serde_json::from_str(contents).with_context(|| format!("parse {}", path.display()))
}

/// Check `document` against the config schema, one violation per offending value.
///
/// Only a broken bundled schema is an error; a non-conforming document yields
/// violations.
pub fn shape_violations(document: &Value) -> Result<Vec<ParameterViolation>> {
    let schema: Value = serde_json::from_str(CONFIG_SCHEMA).context("parse config schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    Ok(compiled
        .iter_errors(document)
        .map(|err| ParameterViolation::WrongShape {
            path: dotted(err.instance_path().as_str()),
            detail: err.to_string(),
        })
        .collect())
}

/// `/iqtree/run` -> `iqtree.run`.
fn dotted(pointer: &str) -> String {
    let keys: Vec<String> = pointer
        .split('/')
        .filter(|key| !key.is_empty())
        .map(|key| key.replace("~1", "/").replace("~0", "~"))
        .collect();
    if keys.is_empty() {
        return "<root>".to_string();
    }
    keys.join(".")
}

/// Atomically write a configuration document as pretty JSON (temp file + rename).
pub fn write_config(path: &Path, document: &Value) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(document).context("serialize config json")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let mut tmp_name = path
        .file_name()
        .with_context(|| format!("path has no file name {}", path.display()))?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
