//! Adapters for the framework's ports.
//!
//! - `catalog`: in-process class source
//! - `command`: per-category bridges from definitions to host callbacks
//! - `memory_host`: self-contained host used by the CLI and tests

pub mod catalog;
pub mod command;
pub mod memory_host;
