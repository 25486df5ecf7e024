//! # Reconciliation Engine
//!
//! Classifies every Source record and every Directory record through two
//! ordered rule pipelines sharing one mutable run state, with an
//! ambiguous-name pre-pass preventing false-positive identity merges.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    ReconciliationDriver                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌────────────┐   ┌─────────────────┐   ┌────────────────┐  │
//! │  │ Exclusion  │──►│  Source rules   │──►│ Directory rules│  │
//! │  │  pre-pass  │   │ (per record)    │   │ (per account)  │  │
//! │  └────────────┘   └────────┬────────┘   └───────┬────────┘  │
//! │                            │                    │           │
//! │                            ▼                    ▼           │
//! │                  ┌──────────────────────────────────┐       │
//! │                  │   RunState (counters, claims,    │       │
//! │                  │    exclusions, change log)       │       │
//! │                  └──────────────────────────────────┘       │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rules run first-match-wins in a fixed order; a record no rule handles
//! falls through to an unmatched classification performed by the driver.
//! The change log is ordered and its literal text is part of the engine's
//! contract.

pub mod driver;
pub mod error;
pub mod exclusion;
pub mod report;
pub mod rules;
pub mod state;

pub use driver::ReconciliationDriver;
pub use error::{EngineError, EngineResult};
pub use report::RunReport;
pub use rules::{Disposition, DirectoryRule, RunContext, SourceRule};
pub use state::{ExclusionKey, RunCounters, RunState};
