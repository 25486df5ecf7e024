//! # Directory System integration
//!
//! The Directory System is reached through operator-supplied scripts: one
//! exports the account list to a JSON file, another sets the sync
//! attribute on a single account. This crate wraps both behind the core
//! collaborator traits, plus the execution-policy preflight the scripts
//! need on their native shell.

pub mod error;
pub mod exporter;
pub mod script;
pub mod writeback;

pub use error::{DirectoryError, DirectoryResult};
pub use exporter::DirectoryExporter;
pub use script::ScriptShell;
pub use writeback::{EditCredentials, ScriptWriteBack};
