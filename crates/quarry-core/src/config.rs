//! Workbench configuration
//!
//! All process-wide switches live in one explicit struct that callers pass
//! into the engine. Nothing in the dispatcher reads ambient global state.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{QuarryError, Result};

/// Destination sentinel meaning "let the system pick a managed location".
pub const MANAGED_DESTINATION: &str = "__managed__";

/// Interpreter entry as declared in the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Display name, e.g. "Hive"
    pub name: String,
    /// Dialect identifier snippets refer to, e.g. "hive"
    pub dialect: String,
    #[serde(default = "default_interface")]
    pub interface: String,
    /// Local database backing the interpreter's query client
    #[serde(default)]
    pub database_path: Option<String>,
}

fn default_interface() -> String {
    "sqlalchemy".to_string()
}

/// Workbench-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    /// Render the editor with the newer template
    pub enable_new_editor: bool,
    /// Offer the multi-language notebook view
    pub show_notebooks: bool,
    /// Destination value that selects live indexing
    pub managed_destination: String,
    /// Rows fetched to infer an index schema
    pub index_sample_rows: usize,
    /// Rows pulled per batch while live indexing
    pub live_index_batch_size: usize,
    pub interpreters: Vec<InterpreterConfig>,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            enable_new_editor: false,
            show_notebooks: true,
            managed_destination: MANAGED_DESTINATION.to_string(),
            index_sample_rows: 10,
            live_index_batch_size: 500,
            interpreters: Vec::new(),
        }
    }
}

impl WorkbenchConfig {
    /// Parse a TOML document, filling unspecified keys with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WorkbenchConfig =
            toml::from_str(content).map_err(|e| QuarryError::InvalidConfig {
                reason: format!("TOML parse error: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| QuarryError::InvalidConfig {
            reason: format!("Failed to read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.managed_destination.trim().is_empty() {
            return Err(QuarryError::InvalidConfig {
                reason: "managed_destination cannot be empty".to_string(),
            });
        }
        if self.live_index_batch_size == 0 {
            return Err(QuarryError::InvalidConfig {
                reason: "live_index_batch_size must be positive".to_string(),
            });
        }
        let mut seen = std::collections::HashSet::new();
        for interpreter in &self.interpreters {
            if !seen.insert(interpreter.dialect.as_str()) {
                return Err(QuarryError::InvalidConfig {
                    reason: format!("Duplicate interpreter dialect: {}", interpreter.dialect),
                });
            }
        }
        Ok(())
    }

    /// Whether `destination` is the managed-location sentinel
    pub fn is_managed_destination(&self, destination: &str) -> bool {
        destination == self.managed_destination
    }
}
