//! Quarry CLI
//!
//! Command-line front end for the Quarry notebook workbench

use clap::{Parser, Subcommand};
use quarry_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "quarry")]
#[command(about = "Quarry - multi-engine SQL workbench controller", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: commands::runtime::GlobalArgs,

    /// Logging profile: dev, prod or test
    #[arg(long, global = true, default_value = "dev")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Save a single-statement query document
    Save(commands::documents::SaveArgs),
    /// List the caller's documents
    List,
    /// Run a post-execution action on a saved snippet
    Watch(commands::watch::WatchArgs),
    /// Move documents to the trash
    Trash(commands::documents::BatchArgs),
    /// Copy documents
    Copy(commands::documents::BatchArgs),
    /// Open the editor view
    Editor(commands::browse::EditorArgs),
    /// Open the notebook view
    Notebook(commands::browse::NotebookArgs),
    /// Preview a table
    Browse(commands::browse::BrowseArgs),
    /// Negotiate transport security for the authorization service
    Security(commands::security::SecurityArgs),
}

fn main() {
    let cli = Cli::parse();
    init(Profile::parse(&cli.log).unwrap_or(Profile::Development));

    let result = match cli.command {
        Commands::Save(args) => commands::documents::execute_save(&cli.global, args),
        Commands::List => commands::documents::execute_list(&cli.global),
        Commands::Watch(args) => commands::watch::execute(&cli.global, args),
        Commands::Trash(args) => commands::documents::execute_trash(&cli.global, args),
        Commands::Copy(args) => commands::documents::execute_copy(&cli.global, args),
        Commands::Editor(args) => commands::browse::execute_editor(&cli.global, args),
        Commands::Notebook(args) => commands::browse::execute_notebook(&cli.global, args),
        Commands::Browse(args) => commands::browse::execute_browse(&cli.global, args),
        Commands::Security(args) => commands::security::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
