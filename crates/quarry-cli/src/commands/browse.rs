//! Editor and table preview commands
//!
//! Usage:
//!   quarry editor [--id <ID>] [--type <DIALECT>] [--mobile]
//!   quarry notebook [--id <ID>]
//!   quarry browse <DATABASE> <TABLE> [--source-type <DIALECT>] [--execute]

use clap::Args;
use quarry_engine::commands::editor::BrowseRequest;
use quarry_engine::{EngineCommand, EngineCommandResult};

use super::runtime::{apply, print_json, CliResult, GlobalArgs, Runtime};

#[derive(Debug, Args)]
pub struct EditorArgs {
    /// Saved document to open
    #[arg(long)]
    pub id: Option<i64>,

    /// Editor type for a blank editor
    #[arg(long = "type", default_value = "hive")]
    pub editor_type: String,

    #[arg(long)]
    pub mobile: bool,
}

#[derive(Debug, Args)]
pub struct NotebookArgs {
    /// Saved notebook to open
    #[arg(long)]
    pub id: Option<i64>,
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
    pub database: String,
    pub table: String,

    /// Engine dialect to browse with
    #[arg(long, default_value = "hive")]
    pub source_type: String,

    /// Run the preview instead of opening an editor
    #[arg(long)]
    pub execute: bool,

    #[arg(long)]
    pub namespace: Option<String>,
}

pub fn execute_editor(global: &GlobalArgs, args: EditorArgs) -> CliResult {
    let runtime = Runtime::open(global)?;
    let cmd = EngineCommand::OpenEditor {
        editor_id: args.id,
        editor_type: args.editor_type,
        is_mobile: args.mobile,
    };
    match apply(&runtime, cmd)? {
        EngineCommandResult::Editor(view) => print_json(&view),
        other => Err(format!("unexpected engine result: {:?}", other).into()),
    }
}

pub fn execute_notebook(global: &GlobalArgs, args: NotebookArgs) -> CliResult {
    let runtime = Runtime::open(global)?;
    match apply(&runtime, EngineCommand::OpenNotebook { notebook_id: args.id })? {
        EngineCommandResult::Editor(view) => print_json(&view),
        other => Err(format!("unexpected engine result: {:?}", other).into()),
    }
}

pub fn execute_browse(global: &GlobalArgs, args: BrowseArgs) -> CliResult {
    let runtime = Runtime::open(global)?;
    let mut request = BrowseRequest::new(args.database, args.table, args.source_type);
    if args.execute {
        request = request.executing();
    }
    request.namespace = args.namespace;

    match apply(&runtime, EngineCommand::Browse(request))? {
        EngineCommandResult::Browse(outcome) => print_json(&outcome),
        other => Err(format!("unexpected engine result: {:?}", other).into()),
    }
}
