//! Engine-level commands reaching drivers, the document store or the job system.

#![allow(clippy::result_large_err)]

use quarry_core::errors::ExResult;
use quarry_core::model::NotebookRef;
use quarry_core_types::RequestContext;

use super::documents::{copy_notebooks, trash_notebooks, BatchResponse};
use super::editor::{browse, open_editor, open_notebook, BrowseOutcome, BrowseRequest, EditorView};
use super::execute_and_watch::{execute_and_watch, Outcome, WatchRequest};
use super::Workbench;

/// Commands a front end can send to the engine
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Run a post-execution action on a saved snippet.
    ExecuteAndWatch(WatchRequest),
    /// Trash documents on behalf of the caller.
    TrashNotebooks { notebooks: Vec<NotebookRef> },
    /// Copy documents on behalf of the caller.
    CopyNotebooks { notebooks: Vec<NotebookRef> },
    /// Open the editor, optionally on a saved document.
    OpenEditor {
        editor_id: Option<i64>,
        editor_type: String,
        is_mobile: bool,
    },
    /// Open the notebook view, optionally on a saved notebook.
    OpenNotebook { notebook_id: Option<i64> },
    /// Preview a table.
    Browse(BrowseRequest),
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    ExecuteAndWatch(Outcome),
    Batch(BatchResponse),
    Editor(EditorView),
    Browse(BrowseOutcome),
}

/// Apply an engine command within one request.
///
/// Batch commands never fail as a whole; their per-item failures are
/// reported in the `BatchResponse`.
pub fn apply_engine_command(
    cmd: EngineCommand,
    wb: &Workbench<'_>,
    ctx: &RequestContext,
) -> ExResult<EngineCommandResult> {
    match cmd {
        EngineCommand::ExecuteAndWatch(request) => {
            let outcome = execute_and_watch(wb, ctx, &request)?;
            Ok(EngineCommandResult::ExecuteAndWatch(outcome))
        }
        EngineCommand::TrashNotebooks { notebooks } => Ok(EngineCommandResult::Batch(
            trash_notebooks(wb, ctx, &notebooks),
        )),
        EngineCommand::CopyNotebooks { notebooks } => Ok(EngineCommandResult::Batch(
            copy_notebooks(wb, ctx, &notebooks),
        )),
        EngineCommand::OpenEditor {
            editor_id,
            editor_type,
            is_mobile,
        } => {
            let view = open_editor(wb, ctx, editor_id, &editor_type, is_mobile)?;
            Ok(EngineCommandResult::Editor(view))
        }
        EngineCommand::OpenNotebook { notebook_id } => {
            let view = open_notebook(wb, ctx, notebook_id)?;
            Ok(EngineCommandResult::Editor(view))
        }
        EngineCommand::Browse(request) => {
            let outcome = browse(wb, ctx, &request)?;
            Ok(EngineCommandResult::Browse(outcome))
        }
    }
}
