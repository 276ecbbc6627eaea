use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use quarry_core::errors::{ExError, ExErrorKind, ExResult};
use quarry_core::indexer::{FileFormatSpec, IndexInput, IndexJobSubmitter, JobHandle};
use quarry_core::interpreter::{ColumnMeta, ExecutionResponse, ExportResult, Sample};
use quarry_core::model::{Notebook, Snippet};
use quarry_core::{Interpreter, InterpreterRegistry, QueryApi, WorkbenchConfig};
use quarry_engine::Workbench;
use quarry_store::db::open_workbench_in_memory;
use quarry_store::SqliteDocumentStore;
use serde_json::json;

/// Driver that answers from canned data and records every call
pub struct FakeApi {
    dialect: String,
    total_rows: usize,
    pub calls: Mutex<Vec<String>>,
    fail_exports: AtomicBool,
}

#[allow(dead_code)]
impl FakeApi {
    pub fn new(dialect: &str, total_rows: usize) -> Self {
        Self {
            dialect: dialect.to_string(),
            total_rows,
            calls: Mutex::new(Vec::new()),
            fail_exports: AtomicBool::new(false),
        }
    }

    /// Make every export call fail the way an engine rejection would
    pub fn fail_exports(&self) {
        self.fail_exports.store(true, Ordering::SeqCst);
    }

    fn check_export(&self, destination: &str) -> ExResult<()> {
        if self.fail_exports.load(Ordering::SeqCst) {
            return Err(ExError::new(ExErrorKind::ExternalService)
                .with_op("export")
                .with_entity_id(destination)
                .with_message("Export rejected by engine"));
        }
        Ok(())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl QueryApi for FakeApi {
    fn dialect(&self) -> &str {
        &self.dialect
    }

    fn execute(&self, _notebook: &Notebook, snippet: &Snippet) -> ExResult<ExecutionResponse> {
        self.record(format!("execute({})", snippet.statement));
        Ok(ExecutionResponse {
            has_result_set: true,
            row_count: self.total_rows,
        })
    }

    fn fetch_result(
        &self,
        _notebook: &Notebook,
        _snippet: &Snippet,
        rows: usize,
        start_over: bool,
    ) -> ExResult<Sample> {
        self.record(format!("fetch_result({}, {})", rows, start_over));
        let n = rows.min(self.total_rows);
        Ok(Sample {
            meta: vec![
                ColumnMeta::new("visits.url", "STRING_TYPE"),
                ColumnMeta::new("visits.hits", "INT_TYPE"),
                ColumnMeta::new("visits.geo", "GEOMETRY_TYPE"),
            ],
            data: (0..n)
                .map(|i| vec![json!(format!("/p/{}", i)), json!(i), json!(null)])
                .collect(),
            has_more: n < self.total_rows,
        })
    }

    fn close_statement(&self, _notebook: &Notebook, _snippet: &Snippet) -> ExResult<()> {
        self.record("close_statement".to_string());
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
        self.record(format!(
            "export_data_as_table({}, {}, {:?})",
            destination, is_temporary, location
        ));
        self.check_export(destination)?;
        Ok(ExportResult {
            statement: format!("CREATE TABLE {} AS {}", destination, snippet.statement),
            success_url: if is_temporary {
                String::new()
            } else {
                format!("/metastore/table/default/{}", destination)
            },
        })
    }

    fn export_large_data_to_hdfs(
        &self,
        _notebook: &Notebook,
        snippet: &Snippet,
        destination: &str,
    ) -> ExResult<ExportResult> {
        self.record(format!("export_large_data_to_hdfs({})", destination));
        self.check_export(destination)?;
        Ok(ExportResult {
            statement: format!("INSERT OVERWRITE DIRECTORY '{}' {}", destination, snippet.statement),
            success_url: format!("/filebrowser/view={}", destination),
        })
    }

    fn get_browse_query(&self, database: &str, table: &str) -> String {
        format!("SELECT * FROM {}.{} LIMIT 100", database, table)
    }
}

/// One recorded job submission
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub destination: String,
    pub source_query_id: String,
    pub streaming: bool,
    pub columns: Vec<(String, String)>,
    /// Rows pulled from the live source on the first batch
    pub first_batch_len: Option<usize>,
}

/// Job submitter that records submissions, optionally rejecting them
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingJobs {
    pub reject: bool,
    submissions: Mutex<Vec<Submission>>,
}

#[allow(dead_code)]
impl RecordingJobs {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

impl IndexJobSubmitter for RecordingJobs {
    fn submit_index_job(
        &self,
        spec: &FileFormatSpec,
        input: IndexInput<'_>,
        destination: &str,
        source_query_id: &str,
    ) -> ExResult<JobHandle> {
        if self.reject {
            return Err(ExError::new(ExErrorKind::SubmissionError)
                .with_entity_id(destination)
                .with_message("Collection already owned"));
        }

        let first_batch_len = match input {
            IndexInput::Streaming(source) => Some(source.next_batch(4, true)?.data.len()),
            IndexInput::Query => None,
        };

        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(Submission {
            destination: destination.to_string(),
            source_query_id: source_query_id.to_string(),
            streaming: input.is_streaming(),
            columns: spec
                .columns
                .iter()
                .map(|f| (f.name.clone(), f.field_type.clone()))
                .collect(),
            first_batch_len,
        });
        Ok(JobHandle {
            id: format!("job-{}", submissions.len()),
        })
    }
}

/// Everything a command needs, owned by the test
#[allow(dead_code)]
pub struct Fixture {
    pub config: WorkbenchConfig,
    pub registry: InterpreterRegistry,
    pub store: SqliteDocumentStore,
    pub jobs: RecordingJobs,
    pub hive: Arc<FakeApi>,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        Self::with_jobs(RecordingJobs::default())
    }

    pub fn with_jobs(jobs: RecordingJobs) -> Self {
        let hive = Arc::new(FakeApi::new("hive", 25));
        let impala = Arc::new(FakeApi::new("impala", 25));

        let mut registry = InterpreterRegistry::new();
        registry.register(Interpreter::new("Hive", "hive", "hiveserver2"), hive.clone());
        registry.register(Interpreter::new("Impala", "impala", "hiveserver2"), impala);

        Self {
            config: WorkbenchConfig::default(),
            registry,
            store: SqliteDocumentStore::new(open_workbench_in_memory().unwrap()),
            jobs,
            hive,
        }
    }

    pub fn wb(&self) -> Workbench<'_> {
        Workbench::new(&self.config, &self.registry, &self.store, &self.jobs)
    }

    /// Save a single-snippet query document owned by alice; returns its id
    pub fn save_query(&self, name: &str, dialect: &str, statement: &str) -> i64 {
        self.store
            .create(
                name,
                &format!("query-{}", dialect),
                "alice",
                &json!({
                    "type": format!("query-{}", dialect),
                    "snippets": [
                        {"id": 0, "type": dialect, "database": "sales", "statement": statement}
                    ]
                }),
            )
            .unwrap()
            .id
    }
}
