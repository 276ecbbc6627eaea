use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::Document;
use super::snippet::Snippet;
use crate::errors::{QuarryError, Result};

/// Lifecycle tag of a notebook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NotebookStatus {
    #[default]
    Ready,
    /// Run the statement as soon as the editor opens
    ReadyExecute,
    Running,
    Available,
    Failed,
    Canceled,
    Expired,
    /// Any tag this build does not know about
    #[serde(other)]
    Unknown,
}

/// Notebook - an ordered set of snippets built from a saved document
///
/// Constructed fresh for every request; the dispatcher never persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    /// Id of the owning document (absent for synthetic notebooks)
    #[serde(default)]
    pub id: Option<i64>,

    pub uuid: String,

    #[serde(default)]
    pub name: String,

    /// Document type, e.g. `query-hive` or `notebook`
    #[serde(rename = "type", default = "default_notebook_type")]
    pub notebook_type: String,

    #[serde(default)]
    pub snippets: Vec<Snippet>,

    #[serde(default)]
    pub status: NotebookStatus,

    /// Where to go once an asynchronously completing statement finishes
    #[serde(default, rename = "onSuccessUrl")]
    pub on_success_url: Option<String>,

    /// Synthetic notebooks created to run a generated statement
    #[serde(default, rename = "isTask")]
    pub is_task: bool,

    #[serde(default)]
    pub namespace: Option<String>,
}

fn default_notebook_type() -> String {
    "notebook".to_string()
}

impl Notebook {
    /// Decode the notebook stored in a document's data payload
    ///
    /// The document's id always wins; uuid and name fall back to the
    /// document's own values when the payload lacks them.
    pub fn from_document(doc: &Document) -> Result<Self> {
        let mut value: serde_json::Value =
            serde_json::from_str(&doc.data).map_err(|e| QuarryError::InvalidNotebookData {
                document_id: doc.id.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(obj) = value.as_object_mut() {
            obj.entry("uuid")
                .or_insert_with(|| serde_json::Value::String(doc.uuid.clone()));
            obj.entry("name")
                .or_insert_with(|| serde_json::Value::String(doc.name.clone()));
            obj.entry("type")
                .or_insert_with(|| serde_json::Value::String(doc.doc_type.clone()));
        }

        let mut notebook: Notebook =
            serde_json::from_value(value).map_err(|e| QuarryError::InvalidNotebookData {
                document_id: doc.id.to_string(),
                reason: e.to_string(),
            })?;
        notebook.id = Some(doc.id);
        Ok(notebook)
    }

    /// Snippet at `index`
    ///
    /// # Errors
    ///
    /// `SnippetNotFound` when the index is out of range.
    pub fn snippet(&self, index: usize) -> Result<&Snippet> {
        self.snippets
            .get(index)
            .ok_or_else(|| QuarryError::SnippetNotFound {
                notebook: self.uuid.clone(),
                index,
            })
    }

    /// Human name of the notebook's output
    ///
    /// `{name}` (plus `-{id}` when `unique`) for named notebooks, otherwise
    /// `{type}-{id}`. With `table_format` every character that cannot appear
    /// in an unquoted table name becomes `_`.
    pub fn snippet_name(&self, unique: bool, table_format: bool) -> String {
        let id = self
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| self.uuid.clone());

        let name = if self.name.trim().is_empty() {
            format!("{}-{}", self.notebook_type, id)
        } else if unique {
            format!("{}-{}", self.name, id)
        } else {
            self.name.clone()
        };

        if table_format {
            name.chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
                .collect()
        } else {
            name
        }
    }

    /// Start a synthetic notebook wrapping one generated statement
    ///
    /// ```
    /// use quarry_core::model::{Notebook, NotebookStatus};
    ///
    /// let nb = Notebook::synthetic("Execute and watch", "hive", "SELECT 1")
    ///     .with_status(NotebookStatus::ReadyExecute)
    ///     .with_database(Some("sales".to_string()));
    /// assert_eq!(nb.snippets[0].database.as_deref(), Some("sales"));
    /// ```
    pub fn synthetic(
        name: impl Into<String>,
        editor_type: impl Into<String>,
        statement: impl Into<String>,
    ) -> Self {
        let editor_type = editor_type.into();
        Self {
            id: None,
            uuid: Uuid::new_v4().to_string(),
            name: name.into(),
            notebook_type: format!("query-{}", editor_type),
            snippets: vec![Snippet::new(0, editor_type, statement)],
            status: NotebookStatus::Ready,
            on_success_url: None,
            is_task: false,
            namespace: None,
        }
    }

    pub fn with_status(mut self, status: NotebookStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_database(mut self, database: Option<String>) -> Self {
        for snippet in &mut self.snippets {
            snippet.database = database.clone();
        }
        self
    }

    pub fn with_on_success_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.on_success_url = if url.is_empty() { None } else { Some(url) };
        self
    }

    pub fn as_task(mut self) -> Self {
        self.is_task = true;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}
