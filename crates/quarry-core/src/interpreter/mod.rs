//! Engine interpreters
//!
//! A `QueryApi` is the capability-bearing driver for one engine dialect.
//! The dispatcher only ever talks to `dyn QueryApi` obtained from the
//! `InterpreterRegistry`; it never branches on which engine it holds.

pub mod cursor;
pub mod registry;

use serde::{Deserialize, Serialize};

use crate::errors::ExResult;
use crate::model::{Notebook, Snippet};

pub use cursor::CursorCache;
pub use registry::{Interpreter, InterpreterRegistry};

/// Column metadata as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name, possibly qualified (`table.column`)
    pub name: String,
    /// Engine-native type name, e.g. `INT_TYPE`
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Full output of one statement run by a `QueryClient`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub meta: Vec<ColumnMeta>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Bounded preview of a statement's output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub meta: Vec<ColumnMeta>,
    pub data: Vec<Vec<serde_json::Value>>,
    /// More rows remain behind the cursor
    pub has_more: bool,
}

/// Answer of `QueryApi::execute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    pub has_result_set: bool,
    pub row_count: usize,
}

/// A generated (not yet executed) export statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    pub statement: String,
    /// Where to look once the statement completes; empty when nothing applies
    pub success_url: String,
}

/// Transport that runs a statement against an engine
///
/// Drivers own statement generation and cursor bookkeeping; the client only
/// moves SQL to the engine and rows back.
pub trait QueryClient: Send + Sync {
    /// Run `statement` with `database` as the default database
    ///
    /// # Errors
    ///
    /// `ExternalService` (or `StorageException` for embedded engines) when the
    /// engine rejects the statement.
    fn run(&self, statement: &str, database: &str) -> ExResult<ResultSet>;
}

/// Capability-bearing driver for one engine dialect
pub trait QueryApi: Send + Sync {
    /// Dialect identifier this driver serves
    fn dialect(&self) -> &str;

    /// Run the snippet's current statement and prime its result cursor
    ///
    /// # Errors
    ///
    /// `InvalidStatement` for empty snippets, or whatever the engine raises.
    fn execute(&self, notebook: &Notebook, snippet: &Snippet) -> ExResult<ExecutionResponse>;

    /// Fetch up to `rows` rows of the snippet's result
    ///
    /// # Arguments
    /// * `rows` - Upper bound on returned rows
    /// * `start_over` - Discard any open cursor and re-run the statement
    ///
    /// # Errors
    ///
    /// `NoActiveCursor` when `start_over` is false and nothing was executed.
    fn fetch_result(
        &self,
        notebook: &Notebook,
        snippet: &Snippet,
        rows: usize,
        start_over: bool,
    ) -> ExResult<Sample>;

    /// Release the snippet's result cursor once its rows are no longer needed
    ///
    /// Closing a snippet without an open cursor is a no-op.
    ///
    /// # Errors
    ///
    /// Whatever the engine raises while closing.
    fn close_statement(&self, _notebook: &Notebook, _snippet: &Snippet) -> ExResult<()> {
        Ok(())
    }

    /// Build the statement materializing the snippet's query as a table
    ///
    /// # Arguments
    /// * `destination` - `table` or `database.table`
    /// * `is_temporary` - Session-scoped table with no follow-up URL
    /// * `location` - Storage location for the table data, engine default if `None`
    ///
    /// # Errors
    ///
    /// `InvalidStatement` when the current statement is not a query.
    fn export_data_as_table(
        &self,
        notebook: &Notebook,
        snippet: &Snippet,
        destination: &str,
        is_temporary: bool,
        location: Option<&str>,
    ) -> ExResult<ExportResult>;

    /// Build the statement bulk-exporting the snippet's result to storage
    ///
    /// # Errors
    ///
    /// `InvalidStatement` when the current statement is not a query.
    fn export_large_data_to_hdfs(
        &self,
        notebook: &Notebook,
        snippet: &Snippet,
        destination: &str,
    ) -> ExResult<ExportResult>;

    /// Query previewing a table
    fn get_browse_query(&self, database: &str, table: &str) -> String;
}
