//! Execute-and-watch command
//!
//! Usage: quarry watch <NOTEBOOK_ID> <ACTION> <DESTINATION> [--snippet <N>]

use clap::Args;
use quarry_engine::{EngineCommand, EngineCommandResult, WatchRequest};
use serde_json::json;

use super::runtime::{apply, print_json, CliResult, GlobalArgs, Runtime};

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Id of the saved document
    pub notebook_id: i64,

    /// save_as_table, insert_as_query or index_query
    pub action: String,

    /// Table, directory or collection name
    pub destination: String,

    /// Index of the snippet within the notebook
    #[arg(long, default_value_t = 0)]
    pub snippet: usize,

    /// Render the mobile editor
    #[arg(long)]
    pub mobile: bool,
}

/// Run the action and print the outcome together with its redirect target
pub fn execute(global: &GlobalArgs, args: WatchArgs) -> CliResult {
    let runtime = Runtime::open(global)?;

    let mut request =
        WatchRequest::new(args.notebook_id, args.snippet, args.action, args.destination);
    request.is_mobile = args.mobile;

    match apply(&runtime, EngineCommand::ExecuteAndWatch(request))? {
        EngineCommandResult::ExecuteAndWatch(outcome) => {
            let redirect_url = outcome.redirect_url();
            print_json(&json!({"outcome": outcome, "redirect_url": redirect_url}))
        }
        other => Err(format!("unexpected engine result: {:?}", other).into()),
    }
}
