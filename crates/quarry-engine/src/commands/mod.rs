//! Command orchestration layer.
//!
//! Every command takes a `Workbench` (the collaborators of one process) and
//! the `RequestContext` of the call, and returns `ExResult`.

pub mod documents;
pub mod editor;
pub mod engine_command;
pub mod execute_and_watch;

use quarry_core::errors::ExError;
use quarry_core::indexer::IndexJobSubmitter;
use quarry_core::{DocumentStore, InterpreterRegistry, WorkbenchConfig};
use quarry_core_types::RequestContext;

/// Collaborators a command runs against
///
/// Borrowed for the duration of one request; the engine holds no state of
/// its own between calls.
#[derive(Clone, Copy)]
pub struct Workbench<'a> {
    pub config: &'a WorkbenchConfig,
    pub registry: &'a InterpreterRegistry,
    pub documents: &'a dyn DocumentStore,
    pub jobs: &'a dyn IndexJobSubmitter,
}

impl<'a> Workbench<'a> {
    pub fn new(
        config: &'a WorkbenchConfig,
        registry: &'a InterpreterRegistry,
        documents: &'a dyn DocumentStore,
        jobs: &'a dyn IndexJobSubmitter,
    ) -> Self {
        Self {
            config,
            registry,
            documents,
            jobs,
        }
    }
}

/// Stamp the request's correlation ids onto an outgoing error
pub(crate) fn with_request(err: ExError, ctx: &RequestContext) -> ExError {
    let err = err.with_request_id(ctx.request_id.clone());
    match &ctx.trace_id {
        Some(trace_id) => err.with_trace_id(trace_id.clone()),
        None => err,
    }
}
