// Integration tests for the execute-and-watch dispatcher.
// Covers every action, the live/static indexing split and error surfacing.

mod common;

use common::{Fixture, RecordingJobs};
use quarry_core::errors::ExErrorKind;
use quarry_core::logging_facility::init_test_capture;
use quarry_core::model::{Notebook, NotebookStatus};
use quarry_core::{DocumentStore, MANAGED_DESTINATION};
use quarry_core_types::{RequestContext, TraceId};
use quarry_engine::commands::editor::EditorTemplate;
use quarry_engine::{execute_and_watch, Outcome, WatchRequest};

fn ctx() -> RequestContext {
    RequestContext::new().with_user("alice")
}

fn editor(outcome: Outcome) -> quarry_engine::commands::editor::EditorView {
    match outcome {
        Outcome::Editor(view) => view,
        other => panic!("expected editor outcome, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// save_as_table
// ---------------------------------------------------------------------------

#[test]
fn test_save_as_table_renders_synthetic_notebook() {
    let fx = Fixture::new();
    let id = fx.save_query("Orders", "hive", "SELECT * FROM orders");

    let outcome = execute_and_watch(
        &fx.wb(),
        &ctx(),
        &WatchRequest::new(id, 0, "save_as_table", "orders_copy"),
    )
    .unwrap();

    let view = editor(outcome);
    assert_eq!(view.template, EditorTemplate::Editor);
    assert_eq!(view.editor_type, "hive");
    assert_eq!(view.options.mode, "editor");
    assert_eq!(view.options.languages.len(), 1);
    assert_eq!(view.options.languages[0].name, "Hive SQL");
    assert_eq!(
        view.options.success_url.as_deref(),
        Some("/metastore/table/default/orders_copy")
    );

    let notebook = view.notebook.unwrap();
    assert_eq!(notebook.name, "Execute and watch");
    assert_eq!(notebook.status, NotebookStatus::ReadyExecute);
    assert_eq!(notebook.on_success_url, None);
    assert_eq!(notebook.snippets.len(), 1);
    assert_eq!(notebook.snippets[0].database.as_deref(), Some("sales"));
    assert_eq!(
        notebook.snippets[0].statement,
        "CREATE TABLE orders_copy AS SELECT * FROM orders"
    );

    assert_eq!(
        fx.hive.calls(),
        vec!["export_data_as_table(orders_copy, false, None)"]
    );
    assert!(fx.jobs.submissions().is_empty());
}

#[test]
fn test_new_editor_flag_selects_editor2() {
    let mut fx = Fixture::new();
    fx.config.enable_new_editor = true;
    let id = fx.save_query("Orders", "hive", "SELECT * FROM orders");

    let mut request = WatchRequest::new(id, 0, "save_as_table", "t");
    request.is_mobile = true;
    let view = editor(execute_and_watch(&fx.wb(), &ctx(), &request).unwrap());

    assert_eq!(view.template, EditorTemplate::Editor2);
}

// ---------------------------------------------------------------------------
// insert_as_query
// ---------------------------------------------------------------------------

#[test]
fn test_insert_as_query_carries_success_url() {
    let fx = Fixture::new();
    let id = fx.save_query("Orders", "hive", "SELECT * FROM orders");

    let view = editor(
        execute_and_watch(
            &fx.wb(),
            &ctx(),
            &WatchRequest::new(id, 0, "insert_as_query", "/user/alice/out"),
        )
        .unwrap(),
    );

    let notebook = view.notebook.unwrap();
    assert_eq!(
        notebook.on_success_url.as_deref(),
        Some("/filebrowser/view=/user/alice/out")
    );
    assert_eq!(notebook.status, NotebookStatus::ReadyExecute);
    assert_eq!(notebook.snippets[0].database.as_deref(), Some("sales"));
    assert_eq!(
        fx.hive.calls(),
        vec!["export_large_data_to_hdfs(/user/alice/out)"]
    );
    assert!(fx.jobs.submissions().is_empty());
}

// ---------------------------------------------------------------------------
// index_query
// ---------------------------------------------------------------------------

#[test]
fn test_static_index_redirects_to_job_status() {
    let fx = Fixture::new();
    let id = fx.save_query("Visits", "hive", "SELECT * FROM visits");
    let notebook = fx.store.get_notebook(id).unwrap();

    let outcome = execute_and_watch(
        &fx.wb(),
        &ctx(),
        &WatchRequest::new(id, 0, "index_query", "visits_index"),
    )
    .unwrap();

    assert_eq!(
        outcome,
        Outcome::RedirectJobStatus {
            job_id: "job-1".to_string()
        }
    );
    assert_eq!(
        outcome.redirect_url().as_deref(),
        Some("/oozie/list_oozie_workflow/job-1/")
    );

    assert_eq!(
        fx.hive.calls(),
        vec![
            "export_data_as_table(visits_index, true, Some(\"\"))",
            "fetch_result(10, true)",
            "close_statement",
        ]
    );

    let submissions = fx.jobs.submissions();
    assert_eq!(submissions.len(), 1);
    let submission = &submissions[0];
    assert_eq!(submission.destination, "visits_index");
    assert_eq!(submission.source_query_id, notebook.uuid);
    assert!(!submission.streaming);
    assert_eq!(submission.first_batch_len, None);
    assert_eq!(
        submission.columns,
        vec![
            ("url".to_string(), "string".to_string()),
            ("hits".to_string(), "long".to_string()),
            ("geo".to_string(), "string".to_string()),
        ]
    );
}

#[test]
fn test_live_index_derives_destination_and_streams() {
    let fx = Fixture::new();
    let id = fx.save_query("Web visits", "hive", "SELECT * FROM visits");

    let outcome = execute_and_watch(
        &fx.wb(),
        &ctx(),
        &WatchRequest::new(id, 0, "index_query", MANAGED_DESTINATION),
    )
    .unwrap();

    let expected = format!("Web_visits_{}", id);
    assert_eq!(
        outcome,
        Outcome::RedirectBrowse {
            name: expected.clone()
        }
    );
    assert_eq!(
        outcome.redirect_url(),
        Some(format!("/search/browse/{}", expected))
    );

    let submissions = fx.jobs.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].destination, expected);
    assert!(submissions[0].streaming);
    // the job pulled its first batch through the driver
    assert_eq!(submissions[0].first_batch_len, Some(4));
    let calls = fx.hive.calls();
    assert_eq!(
        calls[calls.len() - 2..],
        ["fetch_result(4, true)", "close_statement"]
    );
}

#[test]
fn test_live_destination_is_deterministic() {
    let fx = Fixture::new();
    let id = fx.save_query("Visits", "hive", "SELECT * FROM visits");
    let request = WatchRequest::new(id, 0, "index_query", MANAGED_DESTINATION);

    let first = execute_and_watch(&fx.wb(), &ctx(), &request).unwrap();
    let second = execute_and_watch(&fx.wb(), &ctx(), &request).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_sample_size_follows_config() {
    let mut fx = Fixture::new();
    fx.config.index_sample_rows = 3;
    let id = fx.save_query("Visits", "hive", "SELECT * FROM visits");

    execute_and_watch(
        &fx.wb(),
        &ctx(),
        &WatchRequest::new(id, 0, "index_query", "visits"),
    )
    .unwrap();

    assert!(fx.hive.calls().contains(&"fetch_result(3, true)".to_string()));
}

#[test]
fn test_malformed_collection_name_is_invalid_destination() {
    let fx = Fixture::new();
    let id = fx.save_query("Visits", "hive", "SELECT * FROM visits");

    let err = execute_and_watch(
        &fx.wb(),
        &ctx(),
        &WatchRequest::new(id, 0, "index_query", "../etc"),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidDestination);
    assert!(fx.hive.calls().is_empty());
    assert!(fx.jobs.submissions().is_empty());
}

#[test]
fn test_submission_error_is_surfaced() {
    let fx = Fixture::with_jobs(RecordingJobs::rejecting());
    let id = fx.save_query("Visits", "hive", "SELECT * FROM visits");

    let err = execute_and_watch(
        &fx.wb(),
        &ctx(),
        &WatchRequest::new(id, 0, "index_query", "visits"),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::SubmissionError);
    assert_eq!(err.entity_id(), Some("visits"));
}

#[test]
fn test_export_failure_aborts_every_action() {
    let cases = [
        ("save_as_table", "orders_copy"),
        ("insert_as_query", "/user/alice/out"),
        ("index_query", "visits_index"),
        ("index_query", MANAGED_DESTINATION),
    ];

    for (action, destination) in cases {
        let fx = Fixture::new();
        fx.hive.fail_exports();
        let id = fx.save_query("Visits", "hive", "SELECT * FROM visits");

        let err = execute_and_watch(
            &fx.wb(),
            &ctx(),
            &WatchRequest::new(id, 0, action, destination),
        )
        .unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::ExternalService, "{}", action);
        assert_eq!(err.op(), Some("export"));
        assert_eq!(err.message(), "Export rejected by engine");
        assert!(
            !fx.hive.calls().iter().any(|c| c.starts_with("fetch_result")),
            "{} fetched rows after a failed export",
            action
        );
        assert!(fx.jobs.submissions().is_empty());
    }
}

#[test]
fn test_non_query_statement_aborts_index_through_real_driver() {
    use quarry_core::connectors::HiveServer2Api;
    use quarry_core::{Interpreter, InterpreterRegistry};
    use quarry_store::SqliteQueryClient;
    use std::sync::Arc;

    let mut fx = Fixture::new();
    let mut registry = InterpreterRegistry::new();
    registry.register(
        Interpreter::new("Hive", "hive", "hiveserver2"),
        Arc::new(HiveServer2Api::hive(Arc::new(
            SqliteQueryClient::open_in_memory().unwrap(),
        ))),
    );
    fx.registry = registry;
    let id = fx.save_query("Cleanup", "hive", "DROP TABLE visits");

    for action in ["save_as_table", "index_query"] {
        let err = execute_and_watch(
            &fx.wb(),
            &ctx(),
            &WatchRequest::new(id, 0, action, "visits_copy"),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidStatement, "{}", action);
        assert_eq!(err.message(), "Only SELECT statements can be saved");
    }
    assert!(fx.jobs.submissions().is_empty());
}

// ---------------------------------------------------------------------------
// Request validation
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_action_runs_nothing() {
    let fx = Fixture::new();
    let id = fx.save_query("Orders", "hive", "SELECT * FROM orders");
    let ctx = ctx().with_trace_id(TraceId::from_string("trace-1".to_string()));

    let err = execute_and_watch(
        &fx.wb(),
        &ctx,
        &WatchRequest::new(id, 0, "drop_everything", "t"),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::UnknownAction);
    assert_eq!(err.message(), "Action drop_everything is unknown");
    assert_eq!(err.request_id(), Some(&ctx.request_id));
    assert_eq!(err.trace_id().map(|t| t.as_str()), Some("trace-1"));
    assert!(fx.hive.calls().is_empty());
}

#[test]
fn test_unknown_action_wins_over_missing_notebook() {
    let fx = Fixture::new();
    let err = execute_and_watch(&fx.wb(), &ctx(), &WatchRequest::new(404, 0, "nope", "t"))
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::UnknownAction);
}

#[test]
fn test_blank_destination_is_rejected() {
    let fx = Fixture::new();
    let id = fx.save_query("Orders", "hive", "SELECT * FROM orders");

    for action in ["save_as_table", "insert_as_query", "index_query"] {
        let err = execute_and_watch(&fx.wb(), &ctx(), &WatchRequest::new(id, 0, action, "  "))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidDestination, "{}", action);
    }
    assert!(fx.hive.calls().is_empty());
}

#[test]
fn test_unknown_notebook_and_snippet() {
    let fx = Fixture::new();
    let id = fx.save_query("Orders", "hive", "SELECT * FROM orders");

    let missing_doc = execute_and_watch(
        &fx.wb(),
        &ctx(),
        &WatchRequest::new(id + 100, 0, "save_as_table", "t"),
    )
    .unwrap_err();
    assert_eq!(missing_doc.kind(), ExErrorKind::NotFound);

    let missing_snippet = execute_and_watch(
        &fx.wb(),
        &ctx(),
        &WatchRequest::new(id, 3, "save_as_table", "t"),
    )
    .unwrap_err();
    assert_eq!(missing_snippet.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_unregistered_dialect_is_unknown_engine() {
    let fx = Fixture::new();
    let id = fx.save_query("Script", "pig", "A = LOAD 'data';");

    let err = execute_and_watch(
        &fx.wb(),
        &ctx(),
        &WatchRequest::new(id, 0, "save_as_table", "t"),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::UnknownEngine);
    assert_eq!(err.entity_id(), Some("pig"));
}

#[test]
fn test_source_notebook_is_untouched() {
    let fx = Fixture::new();
    let id = fx.save_query("Visits", "hive", "SELECT * FROM visits");
    let before: Notebook = fx.store.get_notebook(id).unwrap();

    execute_and_watch(
        &fx.wb(),
        &ctx(),
        &WatchRequest::new(id, 0, "index_query", MANAGED_DESTINATION),
    )
    .unwrap();

    assert_eq!(fx.store.get_notebook(id).unwrap(), before);
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[test]
fn test_failure_logs_end_error_with_request_id() {
    let capture = init_test_capture();
    let fx = Fixture::new();
    let ctx = ctx();

    let _ = execute_and_watch(&fx.wb(), &ctx, &WatchRequest::new(1, 0, "bogus", "t"));

    let request_id = ctx.request_id.to_string();
    let events: Vec<_> = capture
        .events_for_op("execute_and_watch")
        .into_iter()
        .filter(|e| e.field("request_id") == Some(request_id.as_str()))
        .collect();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event.as_deref(), Some("start"));
    assert_eq!(events[1].event.as_deref(), Some("end_error"));
    assert_eq!(events[1].field("err.code"), Some("ERR_UNKNOWN_ACTION"));
}
