//! rostersync CLI library.
//!
//! The binary is a thin wrapper; everything testable lives here: YAML
//! configuration with CLI overrides, the run orchestration (fetch →
//! validate → reconcile → persist → notify), and the notification service.

pub mod config;
pub mod error;
pub mod notify;
pub mod runner;

pub use config::{Cli, Settings};
pub use error::{CliError, CliResult};
