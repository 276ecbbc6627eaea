//! Execute-and-watch: post-execution actions on a saved snippet.
//!
//! ## Action table
//!
//! | action            | export operation                  | outcome                          |
//! |-------------------|-----------------------------------|----------------------------------|
//! | `save_as_table`   | `export_data_as_table`            | editor with synthetic notebook   |
//! | `insert_as_query` | `export_large_data_to_hdfs`       | editor, notebook carries success url |
//! | `index_query`     | temporary table + sample + job    | browse (live) or job status redirect |
//!
//! The action name is validated before anything touches the document store
//! or a driver.
//!
//! ## Logging Ownership
//!
//! This module owns the `execute_and_watch` lifecycle events. Drivers and
//! the job ledger only log at debug/info level inside the call.

#![allow(clippy::result_large_err)]

use std::str::FromStr;

use quarry_core::errors::{ExResult, QuarryError};
use quarry_core::indexer::{
    is_valid_collection_name, FileFormatSpec, IndexInput, JobHandle, SnippetBatchSource,
};
use quarry_core::model::{Notebook, NotebookStatus, Snippet};
use quarry_core::{log_op_end, log_op_error, log_op_start, QueryApi};
use quarry_core_types::RequestContext;
use serde::{Deserialize, Serialize};

use super::editor::EditorView;
use super::{with_request, Workbench};

/// Post-execution action on a snippet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    SaveAsTable,
    InsertAsQuery,
    IndexQuery,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::SaveAsTable => "save_as_table",
            Action::InsertAsQuery => "insert_as_query",
            Action::IndexQuery => "index_query",
        }
    }
}

impl FromStr for Action {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "save_as_table" => Ok(Action::SaveAsTable),
            "insert_as_query" => Ok(Action::InsertAsQuery),
            "index_query" => Ok(Action::IndexQuery),
            other => Err(QuarryError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}

/// Inbound execute-and-watch request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRequest {
    /// Id of the saved document holding the notebook
    pub notebook_id: i64,
    pub snippet_index: usize,
    /// Raw action name as received
    pub action: String,
    /// Table, directory or collection; the managed sentinel for live indexing
    pub destination: String,
    #[serde(default)]
    pub is_mobile: bool,
}

impl WatchRequest {
    pub fn new(
        notebook_id: i64,
        snippet_index: usize,
        action: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            notebook_id,
            snippet_index,
            action: action.into(),
            destination: destination.into(),
            is_mobile: false,
        }
    }
}

/// The single follow-up of an execute-and-watch request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Render the editor on a synthetic notebook wrapping the generated statement
    Editor(EditorView),
    /// Live indexing: go straight to the collection
    RedirectBrowse { name: String },
    /// Static indexing: follow the submitted job
    RedirectJobStatus { job_id: String },
}

impl Outcome {
    /// Target of a redirect outcome
    pub fn redirect_url(&self) -> Option<String> {
        match self {
            Outcome::Editor(_) => None,
            Outcome::RedirectBrowse { name } => Some(format!("/search/browse/{}", name)),
            Outcome::RedirectJobStatus { job_id } => {
                Some(format!("/oozie/list_oozie_workflow/{}/", job_id))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Editor(_) => "editor",
            Outcome::RedirectBrowse { .. } => "redirect_browse",
            Outcome::RedirectJobStatus { .. } => "redirect_job_status",
        }
    }
}

/// Run a post-execution action on one snippet of a saved notebook
///
/// ## Errors
///
/// - `UnknownAction`: the action name is not one of the three actions
/// - `InvalidDestination`: empty destination, or a malformed collection name
/// - `NotFound`: unknown notebook id or snippet index
/// - `UnknownEngine`: the snippet's dialect has no driver
/// - Driver errors (`InvalidStatement`, `NoActiveCursor`, engine failures)
/// - `SubmissionError`: the indexing job was rejected
pub fn execute_and_watch(
    wb: &Workbench<'_>,
    ctx: &RequestContext,
    request: &WatchRequest,
) -> ExResult<Outcome> {
    log_op_start!(
        "execute_and_watch",
        request_id = %ctx.request_id,
        user = ctx.user_or_anonymous(),
        document_id = request.notebook_id,
        action = request.action.as_str()
    );
    let start = std::time::Instant::now();

    let outcome = execute_and_watch_impl(wb, ctx, request).map_err(|e| {
        let e = with_request(e, ctx);
        log_op_error!(
            "execute_and_watch",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        );
        e
    })?;

    log_op_end!(
        "execute_and_watch",
        duration_ms = start.elapsed().as_millis() as u64,
        outcome = outcome.kind()
    );
    Ok(outcome)
}

fn execute_and_watch_impl(
    wb: &Workbench<'_>,
    ctx: &RequestContext,
    request: &WatchRequest,
) -> ExResult<Outcome> {
    let action: Action = request.action.parse()?;

    let destination = request.destination.trim();
    if destination.is_empty() {
        return Err(QuarryError::InvalidDestination {
            destination: request.destination.clone(),
            reason: "Destination cannot be empty".to_string(),
        }
        .into());
    }

    let notebook = wb.documents.get_notebook(request.notebook_id)?;
    let snippet = notebook.snippet(request.snippet_index)?;
    let api = wb.registry.get_api(ctx, snippet)?;

    match action {
        Action::SaveAsTable => {
            let export = api.export_data_as_table(&notebook, snippet, destination, false, None)?;
            let editor = Notebook::synthetic("Execute and watch", &snippet.dialect, export.statement)
                .with_status(NotebookStatus::ReadyExecute)
                .with_database(snippet.database.clone());
            Ok(Outcome::Editor(EditorView::synthetic(
                wb.config,
                editor,
                &snippet.dialect,
                &export.success_url,
                request.is_mobile,
            )))
        }
        Action::InsertAsQuery => {
            let export = api.export_large_data_to_hdfs(&notebook, snippet, destination)?;
            let editor = Notebook::synthetic("Execute and watch", &snippet.dialect, export.statement)
                .with_status(NotebookStatus::ReadyExecute)
                .with_database(snippet.database.clone())
                .with_on_success_url(export.success_url.as_str());
            Ok(Outcome::Editor(EditorView::synthetic(
                wb.config,
                editor,
                &snippet.dialect,
                &export.success_url,
                request.is_mobile,
            )))
        }
        Action::IndexQuery => index_query(wb, ctx, api.as_ref(), &notebook, snippet, destination),
    }
}

/// Index the snippet's rows into a collection
///
/// The managed sentinel selects live indexing into a collection named after
/// the notebook; any other destination is a caller-chosen collection filled
/// by a static job.
fn index_query(
    wb: &Workbench<'_>,
    ctx: &RequestContext,
    api: &dyn QueryApi,
    notebook: &Notebook,
    snippet: &Snippet,
    destination: &str,
) -> ExResult<Outcome> {
    let live_indexing = wb.config.is_managed_destination(destination);
    let destination = if live_indexing {
        notebook.snippet_name(true, true)
    } else {
        if !is_valid_collection_name(destination) {
            return Err(QuarryError::InvalidDestination {
                destination: destination.to_string(),
                reason: "Collection names may only contain letters, digits, '_', '.' and '-'"
                    .to_string(),
            }
            .into());
        }
        destination.to_string()
    };

    tracing::debug!(
        request_id = %ctx.request_id,
        notebook_uuid = %notebook.uuid,
        destination = %destination,
        live_indexing = live_indexing,
        "indexing query"
    );

    // The temporary staging table is generated but never run
    let staging = api.export_data_as_table(notebook, snippet, &destination, true, Some(""))?;
    tracing::debug!(statement = %staging.statement, "staging table statement");

    let handed_off = sample_and_submit(wb, api, notebook, snippet, &destination, live_indexing);
    let closed = api.close_statement(notebook, snippet);
    let job = handed_off?;
    closed?;

    tracing::info!(
        request_id = %ctx.request_id,
        job_id = %job.id,
        destination = %destination,
        live_indexing = live_indexing,
        "index job handed off"
    );

    if live_indexing {
        Ok(Outcome::RedirectBrowse { name: destination })
    } else {
        Ok(Outcome::RedirectJobStatus { job_id: job.id })
    }
}

/// Infer the index schema from a sample and hand the job off
///
/// Live jobs drain the snippet cursor while being submitted.
fn sample_and_submit(
    wb: &Workbench<'_>,
    api: &dyn QueryApi,
    notebook: &Notebook,
    snippet: &Snippet,
    destination: &str,
    live_indexing: bool,
) -> ExResult<JobHandle> {
    let sample = api.fetch_result(notebook, snippet, wb.config.index_sample_rows, true)?;
    let spec = FileFormatSpec::from_sample(&sample);

    if live_indexing {
        let source = SnippetBatchSource::new(api, notebook, snippet);
        wb.jobs.submit_index_job(
            &spec.streaming(),
            IndexInput::Streaming(&source),
            destination,
            &notebook.uuid,
        )
    } else {
        wb.jobs
            .submit_index_job(&spec, IndexInput::Query, destination, &notebook.uuid)
    }
}
