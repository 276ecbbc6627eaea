//! Quarry Core - notebook model and engine-facing contracts
//!
//! This crate holds everything the workbench dispatcher needs that does not
//! touch storage or the outside world directly:
//! - Error and logging facilities
//! - Workbench configuration
//! - Notebook / Snippet / Document model
//! - The `QueryApi` driver trait, its registry and the bundled drivers
//! - Index schema inference and the job handoff contract
//! - The document store contract

#![allow(clippy::result_large_err)]

pub mod config;
pub mod connectors;
pub mod documents;
pub mod errors;
pub mod indexer;
pub mod interpreter;
pub mod logging_facility;
pub mod model;

// Re-export commonly used types
pub use config::{InterpreterConfig, WorkbenchConfig, MANAGED_DESTINATION};
pub use documents::DocumentStore;
pub use errors::{ExError, ExErrorKind, ExResult, QuarryError, Result};
pub use interpreter::{Interpreter, InterpreterRegistry, QueryApi, QueryClient};
pub use model::{Document, Notebook, NotebookRef, NotebookStatus, Snippet};
