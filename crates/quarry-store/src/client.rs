//! Query client over a local SQLite database
//!
//! Backs interpreters whose engine is an embedded database, and stands in
//! for remote engines in tests and the CLI.

use std::path::Path;
use std::sync::Mutex;

use quarry_core::errors::{ExError, ExErrorKind, ExResult};
use quarry_core::interpreter::{ColumnMeta, QueryClient, ResultSet};
use quarry_core::model::split_statements;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::db;
use crate::errors::{from_rusqlite, storage_error, Result};

pub struct SqliteQueryClient {
    conn: Mutex<Connection>,
}

impl SqliteQueryClient {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        db::configure(&conn)?;
        Ok(Self::new(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(db::open_in_memory()?))
    }
}

fn to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
        ValueRef::Blob(bytes) => serde_json::Value::String(hex::encode(bytes)),
    }
}

/// Engine type name of a column, inferred from its first non-null value
fn infer_type(rows: &[Vec<serde_json::Value>], column: usize, blobs: &[bool]) -> &'static str {
    if blobs.get(column).copied().unwrap_or(false) {
        return "BINARY_TYPE";
    }
    let first = rows
        .iter()
        .filter_map(|row| row.get(column))
        .find(|value| !value.is_null());

    match first {
        Some(serde_json::Value::Number(n)) if n.is_i64() || n.is_u64() => "BIGINT_TYPE",
        Some(serde_json::Value::Number(_)) => "DOUBLE_TYPE",
        Some(_) => "STRING_TYPE",
        None => "NULL_TYPE",
    }
}

/// Check that `database` names an attached schema; `default` means `main`
fn ensure_schema(conn: &Connection, database: &str) -> ExResult<()> {
    let database = if database == "default" { "main" } else { database };
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_database_list")
        .map_err(from_rusqlite)?;
    let schemas = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(from_rusqlite)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(from_rusqlite)?;

    if schemas.iter().any(|s| s == database) {
        Ok(())
    } else {
        Err(ExError::new(ExErrorKind::ExternalService)
            .with_op("run")
            .with_entity_id(database)
            .with_message(format!("Unknown database: {}", database)))
    }
}

/// Run one statement; `None` for statements without a result set
fn run_one(conn: &Connection, sql: &str) -> ExResult<Option<ResultSet>> {
    let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
    if stmt.column_count() == 0 {
        stmt.execute([]).map_err(from_rusqlite)?;
        return Ok(None);
    }

    let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
    let mut blobs = vec![false; names.len()];
    let mut rows = Vec::new();

    let mut cursor = stmt.query([]).map_err(from_rusqlite)?;
    while let Some(row) = cursor.next().map_err(from_rusqlite)? {
        let mut values = Vec::with_capacity(names.len());
        for (i, is_blob) in blobs.iter_mut().enumerate() {
            let value = row.get_ref(i).map_err(from_rusqlite)?;
            if matches!(value, ValueRef::Blob(_)) {
                *is_blob = true;
            }
            values.push(to_json(value));
        }
        rows.push(values);
    }

    let meta = names
        .iter()
        .enumerate()
        .map(|(i, name)| ColumnMeta::new(name.clone(), infer_type(&rows, i, &blobs)))
        .collect();
    Ok(Some(ResultSet { meta, rows }))
}

impl QueryClient for SqliteQueryClient {
    /// Runs every `;`-separated statement in order and returns the last
    /// result set produced (empty if none produced one)
    fn run(&self, statement: &str, database: &str) -> ExResult<ResultSet> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| storage_error("lock", "query_client", "connection lock poisoned"))?;
        ensure_schema(&conn, database)?;

        let mut last = ResultSet::default();
        for sql in split_statements(statement) {
            if let Some(result) = run_one(&conn, &sql)? {
                last = result;
            }
        }
        Ok(last)
    }
}
