//! Batch trash and copy of saved documents.
//!
//! Items are processed one by one. A failing item is logged at `warn`,
//! recorded by uuid and skipped; it never aborts the rest of the batch.
//!
//! ## Logging Ownership
//!
//! `notebooks_trash` and `notebooks_copy` lifecycle events are emitted here.

#![allow(clippy::result_large_err)]

use quarry_core::errors::{ExError, ExResult};
use quarry_core::model::NotebookRef;
use quarry_core::{log_op_end, log_op_start};
use quarry_core_types::RequestContext;
use serde::{Deserialize, Serialize};

use super::Workbench;

/// JSON answer of a batch operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    /// `-1` when nothing was selected, `0` once the batch ran
    pub status: i32,
    pub message: String,
    /// Items processed successfully; absent when nothing was selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Uuids of the items that failed; absent when none did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl BatchResponse {
    fn nothing_selected(message: &str) -> Self {
        Self {
            status: -1,
            message: message.to_string(),
            count: None,
            errors: None,
        }
    }

    pub fn failed(&self) -> &[String] {
        self.errors.as_deref().unwrap_or(&[])
    }
}

#[derive(Clone, Copy)]
enum BatchKind {
    Trash,
    Copy,
}

impl BatchKind {
    fn op(self) -> &'static str {
        match self {
            BatchKind::Trash => "notebooks_trash",
            BatchKind::Copy => "notebooks_copy",
        }
    }

    fn empty_message(self) -> &'static str {
        match self {
            BatchKind::Trash => "No notebooks have been selected for deletion.",
            BatchKind::Copy => "No notebooks have been selected for copying.",
        }
    }

    fn summary(self, done: usize, failed: usize) -> String {
        match (self, failed) {
            (BatchKind::Trash, 0) => format!("Trashed {} notebook(s)", done),
            (BatchKind::Trash, _) => format!(
                "Trashed {} notebook(s) and failed to delete {} notebook(s).",
                done, failed
            ),
            (BatchKind::Copy, 0) => format!("Copied {} notebook(s)", done),
            (BatchKind::Copy, _) => format!(
                "Copied {} notebook(s) and failed to copy {} notebook(s).",
                done, failed
            ),
        }
    }
}

fn run_batch<F>(
    kind: BatchKind,
    ctx: &RequestContext,
    notebooks: &[NotebookRef],
    mut apply: F,
) -> BatchResponse
where
    F: FnMut(&NotebookRef, &str) -> ExResult<()>,
{
    let op = kind.op();
    let user = ctx.user_or_anonymous();
    log_op_start!(
        op,
        request_id = %ctx.request_id,
        user = user,
        batch_len = notebooks.len()
    );
    let start = std::time::Instant::now();

    if notebooks.is_empty() {
        log_op_end!(op, duration_ms = start.elapsed().as_millis() as u64);
        return BatchResponse::nothing_selected(kind.empty_message());
    }

    let mut done = 0usize;
    let mut failures = Vec::new();
    for notebook in notebooks {
        match apply(notebook, user) {
            Ok(()) => done += 1,
            Err(e) => {
                log_item_failure(kind, ctx, notebook, &e);
                failures.push(notebook.uuid.clone());
            }
        }
    }

    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        batch_len = notebooks.len(),
        failed_len = failures.len()
    );

    BatchResponse {
        status: 0,
        message: kind.summary(done, failures.len()),
        count: Some(done),
        errors: if failures.is_empty() {
            None
        } else {
            Some(failures)
        },
    }
}

fn log_item_failure(kind: BatchKind, ctx: &RequestContext, notebook: &NotebookRef, err: &ExError) {
    let verb = match kind {
        BatchKind::Trash => "delete",
        BatchKind::Copy => "copy",
    };
    tracing::warn!(
        op = kind.op(),
        request_id = %ctx.request_id,
        notebook_uuid = %notebook.uuid,
        user = ctx.user_or_anonymous(),
        err.code = err.code(),
        err.message = err.message(),
        "Failed to {} document, skipping",
        verb
    );
}

/// Move every referenced document to the trash on behalf of the caller
pub fn trash_notebooks(
    wb: &Workbench<'_>,
    ctx: &RequestContext,
    notebooks: &[NotebookRef],
) -> BatchResponse {
    run_batch(BatchKind::Trash, ctx, notebooks, |notebook, user| {
        wb.documents.trash(&notebook.uuid, user)
    })
}

/// Copy every referenced document as `<name>-copy`, owned by the caller
pub fn copy_notebooks(
    wb: &Workbench<'_>,
    ctx: &RequestContext,
    notebooks: &[NotebookRef],
) -> BatchResponse {
    run_batch(BatchKind::Copy, ctx, notebooks, |notebook, user| {
        let original = wb.documents.get_by_uuid(&notebook.uuid)?;
        let copy = wb
            .documents
            .copy(&notebook.uuid, &format!("{}-copy", original.name), user)?;
        tracing::debug!(
            from = %original.uuid,
            to = %copy.uuid,
            "document copied"
        );
        Ok(())
    })
}
