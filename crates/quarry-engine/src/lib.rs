//! Quarry Engine - request orchestration layer
//!
//! Coordinates the notebook model, the interpreter drivers, the document
//! store and the indexing job handoff into the workbench's user-facing
//! commands: execute-and-watch actions, batch trash/copy, editor and browse.

pub mod commands;

pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use commands::execute_and_watch::{execute_and_watch, Action, Outcome, WatchRequest};
pub use commands::Workbench;
