use serde::{Deserialize, Serialize};

use crate::errors::{QuarryError, Result};

/// Handle of the last execution of a snippet, as stored with the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultHandle {
    /// Index of the statement (within the snippet text) that was executed last
    #[serde(default)]
    pub statement_id: usize,
    #[serde(default)]
    pub has_result_set: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnippetResult {
    #[serde(default)]
    pub handle: Option<ResultHandle>,
}

/// Snippet - one executable statement unit inside a Notebook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    /// Identifier, unique within the owning notebook
    pub id: u32,

    /// Engine/dialect identifier used to look up the driver
    #[serde(rename = "type")]
    pub dialect: String,

    #[serde(default)]
    pub name: String,

    /// Default database the statement runs against
    #[serde(default)]
    pub database: Option<String>,

    /// Statement text; may hold several `;`-separated statements
    #[serde(default)]
    pub statement: String,

    #[serde(default)]
    pub result: SnippetResult,
}

impl Snippet {
    pub fn new(id: u32, dialect: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            id,
            dialect: dialect.into(),
            name: String::new(),
            database: None,
            statement: statement.into(),
            result: SnippetResult::default(),
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Database to run against, `default` when the snippet names none
    pub fn database_or_default(&self) -> &str {
        match self.database.as_deref() {
            Some(db) if !db.trim().is_empty() => db,
            _ => "default",
        }
    }

    /// The statement the last execution pointed at
    ///
    /// Falls back to the first statement when the snippet was never run.
    ///
    /// # Errors
    ///
    /// `InvalidStatement` if the snippet holds no statement or the stored
    /// statement index is out of range.
    pub fn current_statement(&self) -> Result<String> {
        let statements = split_statements(&self.statement);
        if statements.is_empty() {
            return Err(QuarryError::InvalidStatement {
                reason: format!("Snippet {} has no statement", self.id),
            });
        }

        let index = self
            .result
            .handle
            .as_ref()
            .map(|h| h.statement_id)
            .unwrap_or(0);

        statements
            .get(index)
            .cloned()
            .ok_or_else(|| QuarryError::InvalidStatement {
                reason: format!(
                    "Statement index {} out of range ({} statements)",
                    index,
                    statements.len()
                ),
            })
    }
}

/// Split SQL text on `;`, ignoring separators inside quotes or comments
///
/// Empty statements are dropped and surrounding whitespace is trimmed.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    current.push(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    // line comment: skip to end of line
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            current.push('\n');
                            break;
                        }
                    }
                }
                ';' => {
                    push_trimmed(&mut statements, &current);
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }
    push_trimmed(&mut statements, &current);

    statements
}

fn push_trimmed(statements: &mut Vec<String>, statement: &str) {
    let trimmed = statement.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}
