//! Resolved plan export for the execution engine.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::io::config::write_atomic;
use crate::resolve::ResolvedWorkflow;

/// Write the resolved workflow as pretty JSON with a trailing newline.
pub fn write_plan(path: &Path, plan: &ResolvedWorkflow) -> Result<()> {
    debug!(path = %path.display(), targets = plan.targets.len(), "writing plan");
    let mut buf = serde_json::to_string_pretty(plan).context("serialize plan json")?;
    buf.push('\n');
    write_atomic(path, &buf)
}
