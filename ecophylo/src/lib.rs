//! Declarative resolution for the external ecophylo workflow.
//!
//! Given rule definitions, a hierarchical user configuration, and the input
//! tables it names, this crate computes the merged and validated parameters
//! of every rule, the execution mode, and the ordered list of target files
//! the pipeline must produce. Running the rules is left to an external engine.
//!
//! - **[`core`]**: Pure, deterministic logic (merging, whitelists, mode,
//!   engines, target planning). No I/O, fully testable in isolation.
//! - **[`io`]**: Config files, input tables, and plan output.
//!
//! [`definition`] describes the workflow; [`resolve`] runs the staged
//! pipeline that turns a configuration into a [`resolve::ResolvedWorkflow`].

pub mod core;
pub mod definition;
pub mod exit_codes;
pub mod flags;
pub mod io;
pub mod logging;
pub mod resolve;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
