//! SQLite-backed index job ledger
//!
//! Records submitted indexing jobs and the collections they fill. A
//! collection is owned by the first schema submitted for it; later jobs must
//! carry the same schema.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use quarry_core::errors::ExResult;
use quarry_core::indexer::{
    is_valid_collection_name, FileFormatSpec, IndexInput, IndexJobSubmitter, JobHandle,
};
use rusqlite::{Connection, OptionalExtension, Transaction};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{from_rusqlite, serialization_error, storage_error, submission_error, Result};

/// Ledger entry of one submitted job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexJob {
    pub id: String,
    pub destination: String,
    pub source_query_id: String,
    /// `query` or `hs2_handle`
    pub input_format: String,
    /// `submitted` for query jobs, `succeeded` once live rows are stored
    pub status: String,
    pub rows_indexed: i64,
}

pub struct SqliteIndexJobLedger {
    conn: Mutex<Connection>,
    batch_size: usize,
}

impl SqliteIndexJobLedger {
    /// Wrap a migrated connection; live jobs pull `batch_size` rows at a time
    pub fn new(conn: Connection, batch_size: usize) -> Self {
        Self {
            conn: Mutex::new(conn),
            batch_size: batch_size.max(1),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| storage_error("lock", "index_jobs", "connection lock poisoned"))
    }

    pub fn job(&self, id: &str) -> Result<Option<IndexJob>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, destination, source_query_id, input_format, status, rows_indexed
             FROM index_jobs WHERE id = ?1",
            [id],
            |row| {
                Ok(IndexJob {
                    id: row.get(0)?,
                    destination: row.get(1)?,
                    source_query_id: row.get(2)?,
                    input_format: row.get(3)?,
                    status: row.get(4)?,
                    rows_indexed: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Rows stored in a collection, in insertion order
    pub fn collection_rows(&self, collection: &str) -> Result<Vec<serde_json::Value>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT fields FROM collection_documents WHERE collection = ?1 ORDER BY id")
            .map_err(from_rusqlite)?;
        let raw = stmt
            .query_map([collection], |row| row.get::<_, String>(0))
            .map_err(from_rusqlite)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(from_rusqlite)?;

        raw.iter()
            .map(|fields| {
                serde_json::from_str(fields).map_err(|e| serialization_error("collection_rows", e))
            })
            .collect()
    }

    /// Claim `destination` for this schema, or confirm an earlier compatible claim
    fn claim_collection(tx: &Transaction<'_>, spec: &FileFormatSpec, destination: &str) -> Result<()> {
        let signature = spec.schema_signature();
        let existing: Option<String> = tx
            .query_row(
                "SELECT schema_signature FROM collections WHERE name = ?1",
                [destination],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;

        match existing {
            Some(owned) if owned != signature => Err(submission_error(
                destination,
                format!(
                    "Collection {} is already owned by a job with schema [{}]",
                    destination, owned
                ),
            )),
            Some(_) => Ok(()),
            None => {
                let file_format =
                    serde_json::to_string(spec).map_err(|e| serialization_error("claim_collection", e))?;
                tx.execute(
                    "INSERT INTO collections (name, schema_signature, file_format, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![destination, signature, file_format, Utc::now().timestamp()],
                )
                .map_err(from_rusqlite)?;
                Ok(())
            }
        }
    }

    /// Pull every live batch into the collection; returns the row count
    fn drain_batches(
        &self,
        tx: &Transaction<'_>,
        spec: &FileFormatSpec,
        input: IndexInput<'_>,
        destination: &str,
        job_id: &str,
    ) -> Result<i64> {
        let IndexInput::Streaming(source) = input else {
            return Ok(0);
        };

        let mut stmt = tx
            .prepare(
                "INSERT INTO collection_documents (collection, job_id, fields) VALUES (?1, ?2, ?3)",
            )
            .map_err(from_rusqlite)?;

        let mut indexed = 0i64;
        let mut start_over = true;
        loop {
            let batch = source.next_batch(self.batch_size, start_over).map_err(|e| {
                submission_error(destination, "Failed to read live result batch").with_source(e)
            })?;
            start_over = false;

            for row in &batch.data {
                let fields: serde_json::Map<String, serde_json::Value> = spec
                    .columns
                    .iter()
                    .zip(row.iter())
                    .map(|(field, value)| (field.name.clone(), value.clone()))
                    .collect();
                let fields = serde_json::Value::Object(fields).to_string();
                stmt.execute(rusqlite::params![destination, job_id, fields])
                    .map_err(from_rusqlite)?;
                indexed += 1;
            }

            if batch.data.len() < self.batch_size {
                break;
            }
        }

        Ok(indexed)
    }
}

impl IndexJobSubmitter for SqliteIndexJobLedger {
    fn submit_index_job(
        &self,
        spec: &FileFormatSpec,
        input: IndexInput<'_>,
        destination: &str,
        source_query_id: &str,
    ) -> ExResult<JobHandle> {
        if !is_valid_collection_name(destination) {
            return Err(submission_error(
                destination,
                format!("Invalid collection name: {}", destination),
            ));
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(from_rusqlite)?;

        Self::claim_collection(&tx, spec, destination)?;

        let job_id = Uuid::now_v7().to_string();
        let input_format = if input.is_streaming() {
            "hs2_handle"
        } else {
            "query"
        };
        tx.execute(
            "INSERT INTO index_jobs (id, destination, source_query_id, input_format, status, rows_indexed, submitted_at)
             VALUES (?1, ?2, ?3, ?4, 'submitted', 0, ?5)",
            rusqlite::params![job_id, destination, source_query_id, input_format, Utc::now().timestamp()],
        )
        .map_err(from_rusqlite)?;

        if input.is_streaming() {
            let indexed = self.drain_batches(&tx, spec, input, destination, &job_id)?;
            tx.execute(
                "UPDATE index_jobs SET status = 'succeeded', rows_indexed = ?1 WHERE id = ?2",
                rusqlite::params![indexed, job_id],
            )
            .map_err(from_rusqlite)?;
        }

        tx.commit().map_err(from_rusqlite)?;

        tracing::info!(
            job_id = %job_id,
            destination = destination,
            source_query_id = source_query_id,
            input_format = input_format,
            "index job submitted"
        );
        Ok(JobHandle { id: job_id })
    }
}
