use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document - a persisted, owned, trashable saved query or notebook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Numeric id used by editor links
    pub id: i64,

    /// Stable id used by batch operations
    pub uuid: String,

    pub name: String,

    /// Document type, e.g. `query-hive` or `notebook`
    pub doc_type: String,

    /// Username of the owner
    pub owner: String,

    /// Serialized notebook payload (JSON)
    pub data: String,

    pub is_trashed: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        id: i64,
        uuid: impl Into<String>,
        name: impl Into<String>,
        doc_type: impl Into<String>,
        owner: impl Into<String>,
        data: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            uuid: uuid.into(),
            name: name.into(),
            doc_type: doc_type.into(),
            owner: owner.into(),
            data,
            is_trashed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Only the owner may modify a document
    pub fn can_write(&self, user: &str) -> bool {
        self.owner == user
    }

    /// Editor type for query documents (`query-hive` -> `hive`)
    pub fn editor_type(&self) -> &str {
        self.doc_type
            .strip_prefix("query-")
            .unwrap_or(&self.doc_type)
    }
}

/// Reference to a document inside a batch request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookRef {
    pub uuid: String,
}

impl NotebookRef {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self { uuid: uuid.into() }
    }
}
