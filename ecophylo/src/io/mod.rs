//! I/O helpers: configuration files, input tables, plan output.

pub mod config;
pub mod plan_store;
pub mod table;
