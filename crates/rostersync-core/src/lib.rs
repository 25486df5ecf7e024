//! # rostersync core
//!
//! Shared foundation for the rostersync workspace: the typed record models
//! for both systems, the collaborator traits consumed by the reconciliation
//! engine, input validation, and the shared error types.
//!
//! The Source System (the HR roster) is the authoritative copy; the
//! Directory System is reconciled against it. This crate carries no
//! reconciliation logic — only the data contracts the engine and the
//! integration crates agree on.

pub mod config;
pub mod error;
pub mod models;
pub mod traits;
pub mod validate;

pub use config::{ReconcileOptions, UnitSelector};
pub use error::{RetrievalError, RetrievalResult, ValidationError, WriteBackError};
pub use models::{DirectoryRecord, OpaqueId, SourceRecord, SourceUnit};
pub use traits::{DirectoryRecordProvider, SourceRecordProvider, WriteBackService};
