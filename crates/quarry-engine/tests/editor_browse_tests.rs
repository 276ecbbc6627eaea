// Integration tests for the editor and browse views, plus an end-to-end
// run of the dispatcher over the bundled drivers and the SQLite job ledger.

mod common;

use std::sync::Arc;

use common::Fixture;
use quarry_core::connectors::HiveServer2Api;
use quarry_core::errors::ExErrorKind;
use quarry_core::interpreter::QueryClient;
use quarry_core::{
    DocumentStore, Interpreter, InterpreterRegistry, QueryApi, WorkbenchConfig, MANAGED_DESTINATION,
};
use quarry_core_types::RequestContext;
use quarry_engine::commands::editor::{
    browse, open_editor, open_notebook, BrowseOutcome, BrowseRequest, EditorTemplate,
};
use quarry_engine::{
    apply_engine_command, execute_and_watch, EngineCommand, EngineCommandResult, Outcome,
    WatchRequest, Workbench,
};
use quarry_store::db::open_workbench_in_memory;
use quarry_store::{SqliteDocumentStore, SqliteIndexJobLedger, SqliteQueryClient};
use serde_json::json;

fn ctx() -> RequestContext {
    RequestContext::new().with_user("alice")
}

// ---------------------------------------------------------------------------
// open_editor
// ---------------------------------------------------------------------------

#[test]
fn test_open_saved_document_uses_its_editor_type() {
    let fx = Fixture::new();
    let id = fx.save_query("Impala report", "impala", "SELECT 1");

    let view = open_editor(&fx.wb(), &ctx(), Some(id), "hive", false).unwrap();

    assert_eq!(view.editor_type, "impala");
    assert_eq!(view.template, EditorTemplate::Editor);
    assert_eq!(view.notebook.unwrap().name, "Impala report");

    let languages: Vec<(&str, &str)> = view
        .options
        .languages
        .iter()
        .map(|l| (l.name.as_str(), l.dialect.as_str()))
        .collect();
    assert_eq!(languages, vec![("Hive", "hive"), ("Impala", "impala")]);
}

#[test]
fn test_open_blank_editor_for_mobile() {
    let fx = Fixture::new();

    let view = open_editor(&fx.wb(), &ctx(), None, "hive", true).unwrap();

    assert_eq!(view.template, EditorTemplate::EditorM);
    assert!(view.options.mobile);
    assert!(view.notebook.is_none());
}

#[test]
fn test_open_editor_unknown_type() {
    let fx = Fixture::new();
    let err = open_editor(&fx.wb(), &ctx(), None, "pig", false).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::UnknownEngine);
}

#[test]
fn test_open_editor_unknown_document() {
    let fx = Fixture::new();
    let err = open_editor(&fx.wb(), &ctx(), Some(42), "hive", false).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

// ---------------------------------------------------------------------------
// open_notebook
// ---------------------------------------------------------------------------

#[test]
fn test_open_blank_notebook() {
    let fx = Fixture::new();

    let view = open_notebook(&fx.wb(), &ctx(), None).unwrap();

    assert_eq!(view.template, EditorTemplate::Notebook);
    assert_eq!(view.editor_type, "notebook");
    assert_eq!(view.options.mode, "notebook");
    assert_eq!(view.options.languages.len(), 2);
    assert!(view.notebook.is_none());
}

#[test]
fn test_open_saved_notebook() {
    let fx = Fixture::new();
    let id = fx.save_query("Funnel", "hive", "SELECT 1");

    let view = open_notebook(&fx.wb(), &ctx(), Some(id)).unwrap();

    assert_eq!(view.template, EditorTemplate::Notebook);
    assert_eq!(view.notebook.unwrap().name, "Funnel");
}

#[test]
fn test_notebook_editor_type_opens_notebook_view() {
    let fx = Fixture::new();

    let view = open_editor(&fx.wb(), &ctx(), None, "notebook", false).unwrap();

    assert_eq!(view.template, EditorTemplate::Notebook);
    assert_eq!(
        serde_json::to_value(&view).unwrap()["template"],
        "notebook"
    );
}

#[test]
fn test_hidden_notebooks_are_forbidden() {
    let mut fx = Fixture::new();
    fx.config.show_notebooks = false;

    let err = open_notebook(&fx.wb(), &ctx(), None).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);
    assert_eq!(err.code(), "ERR_FORBIDDEN");

    let err = open_editor(&fx.wb(), &ctx(), None, "notebook", false).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);

    let err = apply_engine_command(
        EngineCommand::OpenNotebook { notebook_id: None },
        &fx.wb(),
        &ctx(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);

    // query editors stay available
    assert!(open_editor(&fx.wb(), &ctx(), None, "hive", false).is_ok());
}

// ---------------------------------------------------------------------------
// browse
// ---------------------------------------------------------------------------

#[test]
fn test_browse_renders_browse_notebook() {
    let fx = Fixture::new();

    let outcome = browse(&fx.wb(), &ctx(), &BrowseRequest::new("sales", "orders", "hive")).unwrap();

    let BrowseOutcome::Editor(view) = outcome else {
        panic!("expected editor outcome");
    };
    let notebook = view.notebook.unwrap();
    assert_eq!(notebook.name, "Browse");
    assert_eq!(
        notebook.snippets[0].statement,
        "SELECT * FROM sales.orders LIMIT 100"
    );
    assert_eq!(view.options.languages.len(), 2);
    assert!(fx.hive.calls().is_empty());
}

#[test]
fn test_browse_execute_runs_task_notebook() {
    let fx = Fixture::new();

    let outcome = browse(
        &fx.wb(),
        &ctx(),
        &BrowseRequest::new("sales", "orders", "hive").executing(),
    )
    .unwrap();

    let BrowseOutcome::Executed { notebook, response } = outcome else {
        panic!("expected executed outcome");
    };
    assert!(notebook.is_task);
    assert_eq!(notebook.namespace.as_deref(), Some("default"));
    assert_eq!(notebook.snippets[0].database.as_deref(), Some("sales"));
    assert_eq!(response.row_count, 25);
    assert_eq!(
        fx.hive.calls(),
        vec![
            "execute(SELECT * FROM sales.orders LIMIT 100)",
            "close_statement"
        ]
    );
}

#[test]
fn test_browse_unknown_source_type() {
    let fx = Fixture::new();
    let err = browse(&fx.wb(), &ctx(), &BrowseRequest::new("db", "t", "pig")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::UnknownEngine);
}

// ---------------------------------------------------------------------------
// apply_engine_command
// ---------------------------------------------------------------------------

#[test]
fn test_apply_engine_command_routes_each_variant() {
    let fx = Fixture::new();
    let id = fx.save_query("Orders", "hive", "SELECT * FROM orders");

    let result = apply_engine_command(
        EngineCommand::ExecuteAndWatch(WatchRequest::new(id, 0, "save_as_table", "t")),
        &fx.wb(),
        &ctx(),
    )
    .unwrap();
    assert!(matches!(
        result,
        EngineCommandResult::ExecuteAndWatch(Outcome::Editor(_))
    ));

    let result = apply_engine_command(
        EngineCommand::TrashNotebooks { notebooks: vec![] },
        &fx.wb(),
        &ctx(),
    )
    .unwrap();
    let EngineCommandResult::Batch(batch) = result else {
        panic!("expected batch result");
    };
    assert_eq!(batch.status, -1);

    let result = apply_engine_command(
        EngineCommand::OpenEditor {
            editor_id: None,
            editor_type: "impala".to_string(),
            is_mobile: false,
        },
        &fx.wb(),
        &ctx(),
    )
    .unwrap();
    assert!(matches!(result, EngineCommandResult::Editor(_)));
}

// ---------------------------------------------------------------------------
// End to end: Hive driver over SQLite, SQLite job ledger
// ---------------------------------------------------------------------------

#[test]
fn test_live_indexing_end_to_end() {
    let client = Arc::new(SqliteQueryClient::open_in_memory().unwrap());
    client
        .run(
            "CREATE TABLE visits (url TEXT, hits INTEGER);
             INSERT INTO visits VALUES ('/a', 3), ('/b', 5), ('/c', 8);",
            "main",
        )
        .unwrap();

    let mut registry = InterpreterRegistry::new();
    registry.register(
        Interpreter::new("Hive", "hive", "hiveserver2"),
        Arc::new(HiveServer2Api::hive(client)),
    );
    let config = WorkbenchConfig {
        live_index_batch_size: 2,
        ..WorkbenchConfig::default()
    };
    let store = SqliteDocumentStore::new(open_workbench_in_memory().unwrap());
    let ledger = SqliteIndexJobLedger::new(
        open_workbench_in_memory().unwrap(),
        config.live_index_batch_size,
    );
    let wb = Workbench::new(&config, &registry, &store, &ledger);

    let doc = store
        .create(
            "Visits",
            "query-hive",
            "alice",
            &json!({"snippets": [
                {"id": 0, "type": "hive", "database": "main", "statement": "SELECT url, hits FROM visits"}
            ]}),
        )
        .unwrap();

    let outcome = execute_and_watch(
        &wb,
        &ctx(),
        &WatchRequest::new(doc.id, 0, "index_query", MANAGED_DESTINATION),
    )
    .unwrap();

    let destination = format!("Visits_{}", doc.id);
    assert_eq!(
        outcome,
        Outcome::RedirectBrowse {
            name: destination.clone()
        }
    );

    let rows = ledger.collection_rows(&destination).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2], json!({"url": "/c", "hits": 8}));
}

#[test]
fn test_static_indexing_end_to_end_records_job() {
    let client = Arc::new(SqliteQueryClient::open_in_memory().unwrap());
    client
        .run("CREATE TABLE visits (url TEXT, hits INTEGER);", "main")
        .unwrap();

    let hive = Arc::new(HiveServer2Api::hive(client));
    let mut registry = InterpreterRegistry::new();
    registry.register(Interpreter::new("Hive", "hive", "hiveserver2"), hive.clone());
    let config = WorkbenchConfig::default();
    let store = SqliteDocumentStore::new(open_workbench_in_memory().unwrap());
    let ledger = SqliteIndexJobLedger::new(open_workbench_in_memory().unwrap(), 500);
    let wb = Workbench::new(&config, &registry, &store, &ledger);

    let doc = store
        .create(
            "Visits",
            "query-hive",
            "alice",
            &json!({"snippets": [
                {"id": 0, "type": "hive", "database": "main", "statement": "SELECT url, hits FROM visits"}
            ]}),
        )
        .unwrap();

    let outcome = execute_and_watch(
        &wb,
        &ctx(),
        &WatchRequest::new(doc.id, 0, "index_query", "visits_static"),
    )
    .unwrap();

    let Outcome::RedirectJobStatus { job_id } = outcome else {
        panic!("expected job status redirect");
    };
    let job = ledger.job(&job_id).unwrap().unwrap();
    assert_eq!(job.destination, "visits_static");
    assert_eq!(job.source_query_id, doc.uuid);
    assert_eq!(job.input_format, "query");

    // the sampling cursor is released once the job is handed off
    let notebook = store.get_notebook(doc.id).unwrap();
    let err = hive
        .fetch_result(&notebook, &notebook.snippets[0], 1, false)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NoActiveCursor);
}
