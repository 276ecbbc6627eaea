use std::sync::Arc;

use uuid::Uuid;

use super::hiveql;
use crate::errors::ExResult;
use crate::interpreter::{
    CursorCache, ExecutionResponse, ExportResult, QueryApi, QueryClient, Sample,
};
use crate::model::{Notebook, Snippet};

/// Engine flavor of a HiveServer2-protocol driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Hive,
    /// Impala has no session-scoped tables
    Impala,
}

impl Flavor {
    fn dialect(self) -> &'static str {
        match self {
            Flavor::Hive => "hive",
            Flavor::Impala => "impala",
        }
    }

    fn supports_temporary_tables(self) -> bool {
        matches!(self, Flavor::Hive)
    }
}

/// Driver for engines spoken to over the HiveServer2 protocol
pub struct HiveServer2Api {
    flavor: Flavor,
    client: Arc<dyn QueryClient>,
    cursors: CursorCache,
}

impl HiveServer2Api {
    pub fn hive(client: Arc<dyn QueryClient>) -> Self {
        Self::new(Flavor::Hive, client)
    }

    pub fn impala(client: Arc<dyn QueryClient>) -> Self {
        Self::new(Flavor::Impala, client)
    }

    pub fn new(flavor: Flavor, client: Arc<dyn QueryClient>) -> Self {
        Self {
            flavor,
            client,
            cursors: CursorCache::new(),
        }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Run the current statement and park its result behind a fresh cursor
    fn run_current(&self, notebook: &Notebook, snippet: &Snippet) -> ExResult<ExecutionResponse> {
        let statement = snippet.current_statement()?;
        let result = self
            .client
            .run(&statement, snippet.database_or_default())
            .map_err(|e| e.with_op("execute").with_snippet_id(snippet.id))?;

        let response = ExecutionResponse {
            has_result_set: !result.meta.is_empty(),
            row_count: result.rows.len(),
        };
        self.cursors.open(&notebook.uuid, snippet.id, result)?;
        Ok(response)
    }
}

impl QueryApi for HiveServer2Api {
    fn dialect(&self) -> &str {
        self.flavor.dialect()
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
        location: Option<&str>,
    ) -> ExResult<ExportResult> {
        let query = snippet.current_statement()?;
        hiveql::ensure_query(&query)?;

        let (database, table) =
            hiveql::split_destination(destination, snippet.database_or_default())?;
        let temporary = is_temporary && self.flavor.supports_temporary_tables();
        let statement = hiveql::create_table_as(&database, &table, &query, temporary, location);

        let success_url = if is_temporary {
            String::new()
        } else {
            hiveql::table_url(&database, &table)
        };

        Ok(ExportResult {
            statement,
            success_url,
        })
    }

    fn export_large_data_to_hdfs(
        &self,
        _notebook: &Notebook,
        snippet: &Snippet,
        destination: &str,
    ) -> ExResult<ExportResult> {
        let query = snippet.current_statement()?;
        hiveql::ensure_query(&query)?;

        let staging_table = hiveql::staging_table_name(&Uuid::new_v4().simple().to_string());
        let statement = hiveql::export_to_directory(
            snippet.database_or_default(),
            &staging_table,
            destination,
            &query,
        );

        Ok(ExportResult {
            statement,
            success_url: hiveql::file_browser_url(destination),
        })
    }

    fn get_browse_query(&self, database: &str, table: &str) -> String {
        format!(
            "SELECT * FROM {}.{} LIMIT {}",
            hiveql::quote_identifier(database),
            hiveql::quote_identifier(table),
            hiveql::BROWSE_LIMIT
        )
    }
}
