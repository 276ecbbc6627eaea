use std::sync::Arc;

use super::hiveql;
use crate::errors::ExResult;
use crate::interpreter::{
    CursorCache, ExecutionResponse, ExportResult, QueryApi, QueryClient, Sample,
};
use crate::model::{Notebook, Snippet};

/// Schema name of the attached export target
const EXPORT_SCHEMA: &str = "export_target";

/// Table receiving the rows of a bulk export
const EXPORT_TABLE: &str = "query_result";

/// Driver for SQLite-backed interpreters
///
/// The workbench's `default` database maps to SQLite's `main` schema.
pub struct SqliteApi {
    dialect: String,
    client: Arc<dyn QueryClient>,
    cursors: CursorCache,
}

impl SqliteApi {
    pub fn new(dialect: impl Into<String>, client: Arc<dyn QueryClient>) -> Self {
        Self {
            dialect: dialect.into(),
            client,
            cursors: CursorCache::new(),
        }
    }

    fn schema(database: &str) -> &str {
        if database == "default" {
            "main"
        } else {
            database
        }
    }

    fn run_current(&self, notebook: &Notebook, snippet: &Snippet) -> ExResult<ExecutionResponse> {
        let statement = snippet.current_statement()?;
        let result = self
            .client
            .run(&statement, Self::schema(snippet.database_or_default()))
            .map_err(|e| e.with_op("execute").with_snippet_id(snippet.id))?;

        let response = ExecutionResponse {
            has_result_set: !result.meta.is_empty(),
            row_count: result.rows.len(),
        };
        self.cursors.open(&notebook.uuid, snippet.id, result)?;
        Ok(response)
    }
}

fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl QueryApi for SqliteApi {
    fn dialect(&self) -> &str {
        &self.dialect
    }

    fn execute(&self, notebook: &Notebook, snippet: &Snippet) -> ExResult<ExecutionResponse> {
        self.run_current(notebook, snippet)
    }

    fn fetch_result(
        &self,
        notebook: &Notebook,
        snippet: &Snippet,
        rows: usize,
        start_over: bool,
    ) -> ExResult<Sample> {
        if start_over {
            self.cursors.close(&notebook.uuid, snippet.id)?;
            self.run_current(notebook, snippet)?;
        }
        Ok(self.cursors.fetch(&notebook.uuid, snippet.id, rows)?)
    }

    /// SQLite has no table locations; `location` is ignored
    fn close_statement(&self, notebook: &Notebook, snippet: &Snippet) -> ExResult<()> {
        self.cursors.close(&notebook.uuid, snippet.id)?;
        Ok(())
    }

    fn export_data_as_table(
        &self,
        _notebook: &Notebook,
        snippet: &Snippet,
        destination: &str,
        is_temporary: bool,
        _location: Option<&str>,
    ) -> ExResult<ExportResult> {
        let query = snippet.current_statement()?;
        hiveql::ensure_query(&query)?;

        let (database, table) =
            hiveql::split_destination(destination, snippet.database_or_default())?;
        let schema = Self::schema(&database);

        if is_temporary {
            return Ok(ExportResult {
                statement: format!("CREATE TEMP TABLE {} AS\n{}", quote_identifier(&table), query),
                success_url: String::new(),
            });
        }

        Ok(ExportResult {
            statement: format!(
                "CREATE TABLE {}.{} AS\n{}",
                quote_identifier(schema),
                quote_identifier(&table),
                query
            ),
            success_url: hiveql::table_url(schema, &table),
        })
    }

    /// Copies the result into a standalone database file at `destination`
    fn export_large_data_to_hdfs(
        &self,
        _notebook: &Notebook,
        snippet: &Snippet,
        destination: &str,
    ) -> ExResult<ExportResult> {
        let query = snippet.current_statement()?;
        hiveql::ensure_query(&query)?;

        let statement = [
            format!(
                "ATTACH DATABASE {} AS {}",
                quote_literal(destination),
                EXPORT_SCHEMA
            ),
            format!(
                "DROP TABLE IF EXISTS {}.{}",
                EXPORT_SCHEMA, EXPORT_TABLE
            ),
            format!(
                "CREATE TABLE {}.{} AS\n{}",
                EXPORT_SCHEMA, EXPORT_TABLE, query
            ),
            format!("DETACH DATABASE {}", EXPORT_SCHEMA),
        ]
        .join(";\n\n");

        Ok(ExportResult {
            statement,
            success_url: hiveql::file_browser_url(destination),
        })
    }

    fn get_browse_query(&self, database: &str, table: &str) -> String {
        format!(
            "SELECT * FROM {}.{} LIMIT {}",
            quote_identifier(Self::schema(database)),
            quote_identifier(table),
            hiveql::BROWSE_LIMIT
        )
    }
}
