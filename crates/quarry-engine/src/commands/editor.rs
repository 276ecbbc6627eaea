//! Editor and browse views.
//!
//! ## Logging Ownership
//!
//! `open_editor`, `open_notebook` and `browse` own their lifecycle logging;
//! `open_editor` delegates notebook requests without logging them twice. The synthetic
//! editor built by execute-and-watch is logged by that command.

#![allow(clippy::result_large_err)]

use quarry_core::errors::{ExResult, QuarryError};
use quarry_core::interpreter::ExecutionResponse;
use quarry_core::model::{Notebook, NotebookStatus, Snippet};
use quarry_core::{log_op_end, log_op_error, log_op_start, WorkbenchConfig};
use quarry_core_types::RequestContext;
use serde::{Deserialize, Serialize};

use super::{with_request, Workbench};

/// Page template an editor view renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorTemplate {
    Editor,
    Editor2,
    EditorM,
    /// Multi-language notebook page
    Notebook,
}

/// Editor type that selects the notebook view
pub const NOTEBOOK_EDITOR_TYPE: &str = "notebook";

impl EditorTemplate {
    /// The new editor wins over the mobile layout
    pub fn select(config: &WorkbenchConfig, is_mobile: bool) -> Self {
        if config.enable_new_editor {
            EditorTemplate::Editor2
        } else if is_mobile {
            EditorTemplate::EditorM
        } else {
            EditorTemplate::Editor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EditorTemplate::Editor => "editor",
            EditorTemplate::Editor2 => "editor2",
            EditorTemplate::EditorM => "editor_m",
            EditorTemplate::Notebook => "notebook",
        }
    }
}

/// Language entry offered by the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    #[serde(rename = "type")]
    pub dialect: String,
}

impl Language {
    /// Single-language entry named after the editor type, e.g. `Hive SQL`
    pub fn for_editor_type(editor_type: &str) -> Self {
        Self {
            name: format!("{} SQL", title_case(editor_type)),
            dialect: editor_type.to_string(),
        }
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorOptions {
    pub languages: Vec<Language>,
    pub mode: String,
    pub editor_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    #[serde(default)]
    pub mobile: bool,
}

/// Everything needed to render an editor page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorView {
    pub template: EditorTemplate,
    pub editor_type: String,
    pub options: EditorOptions,
    /// Notebook preloaded into the editor, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notebook: Option<Notebook>,
}

impl EditorView {
    /// Editor preloaded with a synthetic notebook for a single language
    pub(crate) fn synthetic(
        config: &WorkbenchConfig,
        notebook: Notebook,
        editor_type: &str,
        success_url: &str,
        is_mobile: bool,
    ) -> Self {
        Self {
            template: EditorTemplate::select(config, is_mobile),
            editor_type: editor_type.to_string(),
            options: EditorOptions {
                languages: vec![Language::for_editor_type(editor_type)],
                mode: "editor".to_string(),
                editor_type: editor_type.to_string(),
                success_url: Some(success_url.to_string()),
                mobile: is_mobile,
            },
            notebook: Some(notebook),
        }
    }

    /// Editor offering every registered interpreter
    fn with_interpreters(
        wb: &Workbench<'_>,
        editor_type: &str,
        notebook: Option<Notebook>,
        is_mobile: bool,
    ) -> Self {
        Self::offering_interpreters(
            wb,
            EditorTemplate::select(wb.config, is_mobile),
            "editor",
            editor_type,
            notebook,
            is_mobile,
        )
    }

    fn offering_interpreters(
        wb: &Workbench<'_>,
        template: EditorTemplate,
        mode: &str,
        editor_type: &str,
        notebook: Option<Notebook>,
        is_mobile: bool,
    ) -> Self {
        let languages = wb
            .registry
            .ordered_interpreters()
            .into_iter()
            .map(|interpreter| Language {
                name: interpreter.name,
                dialect: interpreter.dialect,
            })
            .collect();

        Self {
            template,
            editor_type: editor_type.to_string(),
            options: EditorOptions {
                languages,
                mode: mode.to_string(),
                editor_type: editor_type.to_string(),
                success_url: None,
                mobile: is_mobile,
            },
            notebook,
        }
    }
}

/// Open the editor, optionally on a saved document
///
/// A saved document decides the editor type; `editor_type` only applies
/// to a blank editor. The `notebook` editor type opens the notebook view.
///
/// ## Errors
///
/// - `NotFound`: `editor_id` names no live document
/// - `UnknownEngine`: no interpreter serves the resolved editor type
/// - `Forbidden`: the notebook view is requested while notebooks are hidden
pub fn open_editor(
    wb: &Workbench<'_>,
    ctx: &RequestContext,
    editor_id: Option<i64>,
    editor_type: &str,
    is_mobile: bool,
) -> ExResult<EditorView> {
    if editor_type == NOTEBOOK_EDITOR_TYPE {
        return open_notebook(wb, ctx, editor_id);
    }

    log_op_start!(
        "open_editor",
        request_id = %ctx.request_id,
        editor_type = editor_type,
        editor_id = ?editor_id
    );
    let start = std::time::Instant::now();

    let view = open_editor_impl(wb, ctx, editor_id, editor_type, is_mobile).map_err(|e| {
        let e = with_request(e, ctx);
        log_op_error!(
            "open_editor",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "open_editor",
        duration_ms = start.elapsed().as_millis() as u64,
        template = view.template.as_str()
    );
    Ok(view)
}

fn open_editor_impl(
    wb: &Workbench<'_>,
    ctx: &RequestContext,
    editor_id: Option<i64>,
    editor_type: &str,
    is_mobile: bool,
) -> ExResult<EditorView> {
    let (editor_type, notebook) = match editor_id {
        Some(id) => {
            let document = wb.documents.get_document(id)?;
            let notebook = Notebook::from_document(&document)?;
            (document.editor_type().to_string(), Some(notebook))
        }
        None => (editor_type.to_string(), None),
    };

    if editor_type == NOTEBOOK_EDITOR_TYPE {
        ensure_notebooks_shown(wb.config)?;
        return Ok(EditorView::notebook(wb, notebook));
    }

    wb.registry
        .get_interpreter(&editor_type, ctx.user_or_anonymous())?;

    Ok(EditorView::with_interpreters(
        wb,
        &editor_type,
        notebook,
        is_mobile,
    ))
}

fn ensure_notebooks_shown(config: &WorkbenchConfig) -> ExResult<()> {
    if config.show_notebooks {
        Ok(())
    } else {
        Err(QuarryError::Disabled {
            view: "Notebook view".to_string(),
        }
        .into())
    }
}

impl EditorView {
    fn notebook(wb: &Workbench<'_>, notebook: Option<Notebook>) -> Self {
        Self::offering_interpreters(
            wb,
            EditorTemplate::Notebook,
            NOTEBOOK_EDITOR_TYPE,
            NOTEBOOK_EDITOR_TYPE,
            notebook,
            false,
        )
    }
}

/// Open the notebook view, blank or on a saved notebook
///
/// ## Errors
///
/// - `Forbidden`: notebooks are hidden by `show_notebooks`
/// - `NotFound`: `notebook_id` names no live document
pub fn open_notebook(
    wb: &Workbench<'_>,
    ctx: &RequestContext,
    notebook_id: Option<i64>,
) -> ExResult<EditorView> {
    log_op_start!(
        "open_notebook",
        request_id = %ctx.request_id,
        user = ctx.user_or_anonymous(),
        document_id = ?notebook_id
    );
    let start = std::time::Instant::now();

    let view = open_notebook_impl(wb, notebook_id).map_err(|e| {
        let e = with_request(e, ctx);
        log_op_error!(
            "open_notebook",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "open_notebook",
        duration_ms = start.elapsed().as_millis() as u64
    );
    Ok(view)
}

fn open_notebook_impl(wb: &Workbench<'_>, notebook_id: Option<i64>) -> ExResult<EditorView> {
    ensure_notebooks_shown(wb.config)?;

    let notebook = match notebook_id {
        Some(id) => Some(Notebook::from_document(&wb.documents.get_document(id)?)?),
        None => None,
    };
    Ok(EditorView::notebook(wb, notebook))
}

/// Table preview request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseRequest {
    pub database: String,
    pub table: String,
    /// Dialect of the engine to browse with
    pub source_type: String,
    /// Run the preview now instead of rendering an editor
    pub execute: bool,
    pub namespace: Option<String>,
}

impl BrowseRequest {
    pub fn new(
        database: impl Into<String>,
        table: impl Into<String>,
        source_type: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            source_type: source_type.into(),
            execute: false,
            namespace: None,
        }
    }

    pub fn executing(mut self) -> Self {
        self.execute = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BrowseOutcome {
    /// The preview ran through the engine driver
    Executed {
        notebook: Notebook,
        response: ExecutionResponse,
    },
    Editor(EditorView),
}

/// Preview a table through the engine serving `source_type`
///
/// ## Errors
///
/// - `UnknownEngine`: `source_type` is not registered
/// - Whatever the driver raises when `execute` is set
pub fn browse(
    wb: &Workbench<'_>,
    ctx: &RequestContext,
    request: &BrowseRequest,
) -> ExResult<BrowseOutcome> {
    log_op_start!(
        "browse",
        request_id = %ctx.request_id,
        dialect = request.source_type.as_str(),
        database = request.database.as_str(),
        table = request.table.as_str(),
        execute = request.execute
    );
    let start = std::time::Instant::now();

    let outcome = browse_impl(wb, ctx, request).map_err(|e| {
        let e = with_request(e, ctx);
        log_op_error!(
            "browse",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!("browse", duration_ms = start.elapsed().as_millis() as u64);
    Ok(outcome)
}

fn browse_impl(
    wb: &Workbench<'_>,
    ctx: &RequestContext,
    request: &BrowseRequest,
) -> ExResult<BrowseOutcome> {
    let lookup = Snippet::new(0, request.source_type.as_str(), "");
    let api = wb.registry.get_api(ctx, &lookup)?;
    let statement = api.get_browse_query(&request.database, &request.table);

    if request.execute {
        let notebook = Notebook::synthetic("Execute and watch", &request.source_type, statement)
            .with_status(NotebookStatus::ReadyExecute)
            .with_database(Some(request.database.clone()))
            .with_namespace(
                request
                    .namespace
                    .clone()
                    .unwrap_or_else(|| "default".to_string()),
            )
            .as_task();
        let snippet = notebook.snippet(0)?;
        let response = api.execute(&notebook, snippet)?;
        api.close_statement(&notebook, snippet)?;
        return Ok(BrowseOutcome::Executed { notebook, response });
    }

    let notebook = Notebook::synthetic("Browse", &request.source_type, statement)
        .with_status(NotebookStatus::ReadyExecute);
    Ok(BrowseOutcome::Editor(EditorView::with_interpreters(
        wb,
        &request.source_type,
        Some(notebook),
        false,
    )))
}
