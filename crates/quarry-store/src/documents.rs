//! SQLite-backed document store

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use quarry_core::errors::ExResult;
use quarry_core::model::Document;
use quarry_core::DocumentStore;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::errors::{document_not_found, from_rusqlite, serialization_error, storage_error, Result};

const DOCUMENT_COLUMNS: &str =
    "id, uuid, name, doc_type, owner, data, is_trashed, created_at, updated_at";

/// Document store over the `documents` table
///
/// One connection guarded by a mutex; each mutation runs in its own
/// transaction so concurrent trash/copy of one document is last-writer-wins.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        uuid: row.get(1)?,
        name: row.get(2)?,
        doc_type: row.get(3)?,
        owner: row.get(4)?,
        data: row.get(5)?,
        is_trashed: row.get::<_, i64>(6)? != 0,
        created_at: timestamp(row.get(7)?),
        updated_at: timestamp(row.get(8)?),
    })
}

/// Point the copied notebook payload at its new identity
fn rewrite_identity(data: &str, uuid: &str, name: &str) -> Result<String> {
    let mut value: serde_json::Value =
        serde_json::from_str(data).map_err(|e| serialization_error("copy", e))?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("uuid".to_string(), serde_json::Value::String(uuid.to_string()));
        obj.insert("name".to_string(), serde_json::Value::String(name.to_string()));
    }
    serde_json::to_string(&value).map_err(|e| serialization_error("copy", e))
}

impl SqliteDocumentStore {
    /// Wrap a connection whose schema is already migrated
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| storage_error("lock", "documents", "connection lock poisoned"))
    }

    /// Save a new document owned by `owner`
    ///
    /// The notebook payload gets the document's uuid and name written into it.
    pub fn create(
        &self,
        name: &str,
        doc_type: &str,
        owner: &str,
        data: &serde_json::Value,
    ) -> Result<Document> {
        let uuid = Uuid::new_v4().to_string();
        let data = rewrite_identity(&data.to_string(), &uuid, name)?;
        let now = Utc::now().timestamp();

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (uuid, name, doc_type, owner, data, is_trashed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
            rusqlite::params![uuid, name, doc_type, owner, data, now],
        )
        .map_err(from_rusqlite)?;

        Self::load_by_uuid(&conn, &uuid)
    }

    /// Live documents owned by `owner`, newest first
    pub fn list(&self, owner: &str) -> Result<Vec<Document>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM documents WHERE owner = ?1 AND is_trashed = 0 ORDER BY id DESC",
                DOCUMENT_COLUMNS
            ))
            .map_err(from_rusqlite)?;
        let documents = stmt
            .query_map([owner], row_to_document)
            .map_err(from_rusqlite)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(from_rusqlite)?;
        Ok(documents)
    }

    fn load_by_uuid(conn: &Connection, uuid: &str) -> Result<Document> {
        conn.query_row(
            &format!("SELECT {} FROM documents WHERE uuid = ?1", DOCUMENT_COLUMNS),
            [uuid],
            row_to_document,
        )
        .optional()
        .map_err(from_rusqlite)?
        .ok_or_else(|| document_not_found(uuid))
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn get_document(&self, id: i64) -> ExResult<Document> {
        let conn = self.lock()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM documents WHERE id = ?1 AND is_trashed = 0",
                DOCUMENT_COLUMNS
            ),
            [id],
            row_to_document,
        )
        .optional()
        .map_err(from_rusqlite)?
        .ok_or_else(|| document_not_found(&id.to_string()))
    }

    fn get_by_uuid(&self, uuid: &str) -> ExResult<Document> {
        let conn = self.lock()?;
        Self::load_by_uuid(&conn, uuid)
    }

    fn trash(&self, uuid: &str, user: &str) -> ExResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(from_rusqlite)?;

        let document = Self::load_by_uuid(&tx, uuid)?;
        if !document.can_write(user) {
            return Err(storage_error(
                "trash",
                uuid,
                format!("User {} does not have permission to delete this document", user),
            ));
        }

        tx.execute(
            "UPDATE documents SET is_trashed = 1, updated_at = ?1 WHERE uuid = ?2",
            rusqlite::params![Utc::now().timestamp(), uuid],
        )
        .map_err(from_rusqlite)?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(uuid = uuid, user = user, "document trashed");
        Ok(())
    }

    fn copy(&self, uuid: &str, new_name: &str, owner: &str) -> ExResult<Document> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(from_rusqlite)?;

        let source = Self::load_by_uuid(&tx, uuid)?;
        let new_uuid = Uuid::new_v4().to_string();
        let data = rewrite_identity(&source.data, &new_uuid, new_name)?;
        let now = Utc::now().timestamp();

        tx.execute(
            "INSERT INTO documents (uuid, name, doc_type, owner, data, is_trashed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
            rusqlite::params![new_uuid, new_name, source.doc_type, owner, data, now],
        )
        .map_err(from_rusqlite)?;

        let copy = Self::load_by_uuid(&tx, &new_uuid)?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(source = uuid, copy = %copy.uuid, owner = owner, "document copied");
        Ok(copy)
    }
}
