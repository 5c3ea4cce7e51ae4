//! Deterministic, pure workflow-resolution logic.
//!
//! Core modules must be free of I/O side effects. They operate on already
//! loaded configuration documents and table rows and return deterministic
//! outputs suitable for tests.

pub mod catalog;
pub mod dirs;
pub mod engine;
pub mod error;
pub mod key_path;
pub mod mode;
pub mod params;
pub mod planner;
pub mod references;
pub mod registry;
pub mod table;
