//! Document commands
//!
//! Usage:
//!   quarry save <NAME> --dialect <D> [--database <DB>] <STATEMENT>
//!   quarry list
//!   quarry trash <UUID>...
//!   quarry copy <UUID>...

use clap::Args;
use quarry_core::model::NotebookRef;
use quarry_engine::{EngineCommand, EngineCommandResult};
use serde_json::json;

use super::runtime::{apply, print_json, CliResult, GlobalArgs, Runtime};

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Document name
    pub name: String,

    /// SQL text of the single snippet
    pub statement: String,

    /// Engine dialect the snippet runs on
    #[arg(long, default_value = "hive")]
    pub dialect: String,

    /// Database the snippet runs in
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Document uuids
    pub uuids: Vec<String>,
}

/// Save a query document owned by the acting user and print its ids
pub fn execute_save(global: &GlobalArgs, args: SaveArgs) -> CliResult {
    let runtime = Runtime::open(global)?;
    let doc_type = format!("query-{}", args.dialect);

    let mut snippet = json!({"id": 0, "type": args.dialect, "statement": args.statement});
    if let Some(database) = args.database {
        snippet["database"] = json!(database);
    }
    let data = json!({"type": doc_type, "snippets": [snippet]});

    let document = runtime
        .store
        .create(&args.name, &doc_type, runtime.user(), &data)?;
    tracing::info!(document_id = document.id, uuid = %document.uuid, "document saved");

    print_json(&json!({"id": document.id, "uuid": document.uuid, "name": document.name}))
}

/// List the acting user's live documents
pub fn execute_list(global: &GlobalArgs) -> CliResult {
    let runtime = Runtime::open(global)?;
    for document in runtime.store.list(runtime.user())? {
        println!(
            "{}\t{}\t{}\t{}",
            document.id, document.uuid, document.doc_type, document.name
        );
    }
    Ok(())
}

fn refs(uuids: Vec<String>) -> Vec<NotebookRef> {
    uuids.into_iter().map(NotebookRef::new).collect()
}

fn run_batch(global: &GlobalArgs, cmd: EngineCommand) -> CliResult {
    let runtime = Runtime::open(global)?;
    match apply(&runtime, cmd)? {
        EngineCommandResult::Batch(response) => print_json(&response),
        other => Err(format!("unexpected engine result: {:?}", other).into()),
    }
}

pub fn execute_trash(global: &GlobalArgs, args: BatchArgs) -> CliResult {
    run_batch(
        global,
        EngineCommand::TrashNotebooks {
            notebooks: refs(args.uuids),
        },
    )
}

pub fn execute_copy(global: &GlobalArgs, args: BatchArgs) -> CliResult {
    run_batch(
        global,
        EngineCommand::CopyNotebooks {
            notebooks: refs(args.uuids),
        },
    )
}
