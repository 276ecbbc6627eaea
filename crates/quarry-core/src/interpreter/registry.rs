use std::collections::HashMap;
use std::sync::Arc;

use quarry_core_types::RequestContext;
use serde::{Deserialize, Serialize};

use super::QueryApi;
use crate::errors::{QuarryError, Result};
use crate::model::Snippet;

/// Interpreter descriptor as shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpreter {
    /// Display name, e.g. "Hive"
    pub name: String,
    #[serde(rename = "type")]
    pub dialect: String,
    pub interface: String,
    pub is_sql: bool,
}

impl Interpreter {
    pub fn new(
        name: impl Into<String>,
        dialect: impl Into<String>,
        interface: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dialect: dialect.into(),
            interface: interface.into(),
            is_sql: true,
        }
    }
}

/// Registry mapping a dialect to its interpreter and driver
///
/// Registration order is preserved; it is the order interpreters are offered
/// in the editor.
#[derive(Default)]
pub struct InterpreterRegistry {
    order: Vec<String>,
    entries: HashMap<String, (Interpreter, Arc<dyn QueryApi>)>,
}

impl InterpreterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the driver for `interpreter.dialect`
    pub fn register(&mut self, interpreter: Interpreter, api: Arc<dyn QueryApi>) {
        let dialect = interpreter.dialect.clone();
        if self
            .entries
            .insert(dialect.clone(), (interpreter, api))
            .is_none()
        {
            self.order.push(dialect);
        }
    }

    /// Look up the interpreter for an engine type on behalf of `user`
    ///
    /// # Errors
    ///
    /// `UnknownEngine` if nothing is registered for `engine_type`.
    pub fn get_interpreter(&self, engine_type: &str, user: &str) -> Result<Interpreter> {
        match self.entries.get(engine_type) {
            Some((interpreter, _)) => {
                tracing::debug!(dialect = engine_type, user = user, "interpreter resolved");
                Ok(interpreter.clone())
            }
            None => Err(QuarryError::UnknownEngine {
                dialect: engine_type.to_string(),
            }),
        }
    }

    /// Driver serving the snippet's dialect
    ///
    /// # Errors
    ///
    /// `UnknownEngine` if the snippet's dialect is unregistered.
    pub fn get_api(&self, ctx: &RequestContext, snippet: &Snippet) -> Result<Arc<dyn QueryApi>> {
        let (_, api) =
            self.entries
                .get(&snippet.dialect)
                .ok_or_else(|| QuarryError::UnknownEngine {
                    dialect: snippet.dialect.clone(),
                })?;

        tracing::debug!(
            request_id = %ctx.request_id,
            dialect = %snippet.dialect,
            snippet_id = snippet.id,
            "driver resolved"
        );
        Ok(Arc::clone(api))
    }

    /// Interpreters in registration order
    pub fn ordered_interpreters(&self) -> Vec<Interpreter> {
        self.order
            .iter()
            .filter_map(|dialect| self.entries.get(dialect))
            .map(|(interpreter, _)| interpreter.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
