use serde::{Deserialize, Serialize};

use super::file_format::FileFormatSpec;
use crate::errors::ExResult;
use crate::interpreter::{QueryApi, Sample};
use crate::model::{Notebook, Snippet};

/// Re-invokable source of result batches for live indexing
pub trait BatchSource {
    /// Next batch of at most `rows` rows
    ///
    /// `start_over` rewinds to the first row by re-running the source.
    ///
    /// # Errors
    ///
    /// Whatever the underlying driver raises, e.g. `NoActiveCursor`.
    fn next_batch(&self, rows: usize, start_over: bool) -> ExResult<Sample>;
}

/// Batch source bound to one snippet of one notebook
pub struct SnippetBatchSource<'a> {
    api: &'a dyn QueryApi,
    notebook: &'a Notebook,
    snippet: &'a Snippet,
}

impl<'a> SnippetBatchSource<'a> {
    pub fn new(api: &'a dyn QueryApi, notebook: &'a Notebook, snippet: &'a Snippet) -> Self {
        Self {
            api,
            notebook,
            snippet,
        }
    }
}

impl BatchSource for SnippetBatchSource<'_> {
    fn next_batch(&self, rows: usize, start_over: bool) -> ExResult<Sample> {
        self.api
            .fetch_result(self.notebook, self.snippet, rows, start_over)
    }
}

/// Rows the indexing job consumes
#[derive(Clone, Copy)]
pub enum IndexInput<'a> {
    /// The job re-runs the source query itself
    Query,
    /// The job pulls batches from a live result handle
    Streaming(&'a dyn BatchSource),
}

impl IndexInput<'_> {
    pub fn is_streaming(&self) -> bool {
        matches!(self, IndexInput::Streaming(_))
    }
}

impl std::fmt::Debug for IndexInput<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexInput::Query => write!(f, "Query"),
            IndexInput::Streaming(_) => write!(f, "Streaming(..)"),
        }
    }
}

/// Identifier of a submitted indexing job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
}

/// Job handoff to the indexing system
pub trait IndexJobSubmitter: Send + Sync {
    /// Submit an indexing job filling `destination`
    ///
    /// # Arguments
    /// * `spec` - Inferred schema and record layout
    /// * `input` - Static query or live batch source
    /// * `destination` - Target collection
    /// * `source_query_id` - Uuid of the notebook the rows come from
    ///
    /// # Errors
    ///
    /// `SubmissionError` if the destination is invalid or already owned by an
    /// incompatible job.
    fn submit_index_job(
        &self,
        spec: &FileFormatSpec,
        input: IndexInput<'_>,
        destination: &str,
        source_query_id: &str,
    ) -> ExResult<JobHandle>;
}

/// Whether `name` can name an index collection
///
/// First character alphanumeric or `_`, then alphanumerics, `_`, `.` or `-`.
pub fn is_valid_collection_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
