//! # Source System client
//!
//! Retrieves the staff roster from the Source System's REST API: an OAuth2
//! client-credentials token exchange, a per-unit staff count, and a
//! paginated staff listing, cached to disk so repeat runs (and the
//! `skip_fetch` mode) can work offline.
//!
//! All decision logic lives in the engine; this crate only produces the
//! ordered `SourceUnit` sequence.

pub mod auth;
pub mod client;
pub mod error;
pub mod provider;

pub use auth::{SourceAuth, SourceCredentials};
pub use client::SourceClient;
pub use error::{SourceError, SourceResult};
pub use provider::SourceProvider;
