//! Stable exit codes for the `ecophylo` CLI.

/// Command succeeded.
pub const OK: i32 = 0;
/// The configuration or its input tables were rejected.
pub const CONFIG: i32 = 1;
/// Any other failure (unreadable files, parse errors, write errors).
pub const FAILURE: i32 = 2;
