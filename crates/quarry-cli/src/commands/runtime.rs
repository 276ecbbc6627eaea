//! Process wiring: configuration, stores and interpreter registry

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use quarry_core::connectors::{HiveServer2Api, SqliteApi};
use quarry_core::{
    Interpreter, InterpreterConfig, InterpreterRegistry, QueryApi, QueryClient, WorkbenchConfig,
};
use quarry_core_types::RequestContext;
use quarry_engine::{apply_engine_command, EngineCommand, EngineCommandResult, Workbench};
use quarry_store::db::open_workbench;
use quarry_store::{SqliteDocumentStore, SqliteIndexJobLedger, SqliteQueryClient};

pub type CliResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Workbench configuration file (TOML); defaults apply when absent
    #[arg(long, global = true, default_value = ".quarry/quarry.toml")]
    pub config: PathBuf,

    /// Workbench database holding documents and index jobs
    #[arg(long, global = true, default_value = ".quarry/workbench.db")]
    pub db: PathBuf,

    /// Acting user
    #[arg(long, global = true, default_value = "admin")]
    pub user: String,
}

/// Everything a command runs against, opened for one invocation
pub struct Runtime {
    pub config: WorkbenchConfig,
    pub registry: InterpreterRegistry,
    pub store: SqliteDocumentStore,
    pub ledger: SqliteIndexJobLedger,
    user: String,
}

impl Runtime {
    pub fn open(global: &GlobalArgs) -> Result<Self, Box<dyn Error>> {
        let config = load_config(&global.config)?;
        let registry = build_registry(&config)?;
        if let Some(parent) = global.db.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let store = SqliteDocumentStore::new(open_workbench(&global.db)?);
        let ledger =
            SqliteIndexJobLedger::new(open_workbench(&global.db)?, config.live_index_batch_size);

        Ok(Self {
            config,
            registry,
            store,
            ledger,
            user: global.user.clone(),
        })
    }

    pub fn workbench(&self) -> Workbench<'_> {
        Workbench::new(&self.config, &self.registry, &self.store, &self.ledger)
    }

    pub fn ctx(&self) -> RequestContext {
        RequestContext::new().with_user(self.user.clone())
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

fn load_config(path: &Path) -> Result<WorkbenchConfig, Box<dyn Error>> {
    if path.exists() {
        Ok(WorkbenchConfig::load(path)?)
    } else {
        tracing::debug!(path = %path.display(), "no configuration file, using defaults");
        Ok(WorkbenchConfig::default())
    }
}

fn default_interpreters() -> Vec<InterpreterConfig> {
    [("Hive", "hive"), ("Impala", "impala"), ("SQLite", "sqlite")]
        .into_iter()
        .map(|(name, dialect)| InterpreterConfig {
            name: name.to_string(),
            dialect: dialect.to_string(),
            interface: "sqlalchemy".to_string(),
            database_path: None,
        })
        .collect()
}

/// One driver per configured interpreter, each over its own SQLite client
fn build_registry(config: &WorkbenchConfig) -> Result<InterpreterRegistry, Box<dyn Error>> {
    let interpreters = if config.interpreters.is_empty() {
        default_interpreters()
    } else {
        config.interpreters.clone()
    };

    let mut registry = InterpreterRegistry::new();
    for interpreter in interpreters {
        let client: Arc<dyn QueryClient> = match &interpreter.database_path {
            Some(path) => Arc::new(SqliteQueryClient::open(path)?),
            None => Arc::new(SqliteQueryClient::open_in_memory()?),
        };
        let api: Arc<dyn QueryApi> = match interpreter.dialect.as_str() {
            "hive" => Arc::new(HiveServer2Api::hive(client)),
            "impala" => Arc::new(HiveServer2Api::impala(client)),
            dialect => Arc::new(SqliteApi::new(dialect, client)),
        };
        registry.register(
            Interpreter::new(interpreter.name, interpreter.dialect, interpreter.interface),
            api,
        );
    }
    Ok(registry)
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Apply one engine command as the acting user
pub fn apply(
    runtime: &Runtime,
    cmd: EngineCommand,
) -> Result<EngineCommandResult, Box<dyn Error>> {
    Ok(apply_engine_command(cmd, &runtime.workbench(), &runtime.ctx())?)
}
