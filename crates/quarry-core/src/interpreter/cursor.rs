use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{ResultSet, Sample};
use crate::errors::{QuarryError, Result};

/// Open result cursor of one snippet
#[derive(Debug)]
struct Cursor {
    result: ResultSet,
    position: usize,
}

/// Result cursors keyed by (notebook uuid, snippet id)
///
/// Shared by every request that goes through the same driver instance, so
/// access is serialized by a mutex.
#[derive(Debug, Default)]
pub struct CursorCache {
    cursors: Mutex<HashMap<(String, u32), Cursor>>,
}

impl CursorCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<(String, u32), Cursor>>> {
        self.cursors.lock().map_err(|_| QuarryError::Poisoned {
            what: "cursor cache".to_string(),
        })
    }

    /// Replace the snippet's cursor with a fresh one over `result`
    pub fn open(&self, notebook_uuid: &str, snippet_id: u32, result: ResultSet) -> Result<()> {
        let mut cursors = self.lock()?;
        cursors.insert(
            (notebook_uuid.to_string(), snippet_id),
            Cursor {
                result,
                position: 0,
            },
        );
        Ok(())
    }

    /// Advance the snippet's cursor by at most `rows` rows
    ///
    /// # Errors
    ///
    /// `NoActiveCursor` if `open` was never called for the snippet.
    pub fn fetch(&self, notebook_uuid: &str, snippet_id: u32, rows: usize) -> Result<Sample> {
        let mut cursors = self.lock()?;
        let cursor = cursors
            .get_mut(&(notebook_uuid.to_string(), snippet_id))
            .ok_or_else(|| QuarryError::NoActiveCursor {
                notebook_uuid: notebook_uuid.to_string(),
                snippet_id,
            })?;

        let end = cursor
            .position
            .saturating_add(rows)
            .min(cursor.result.rows.len());
        let data = cursor.result.rows[cursor.position..end].to_vec();
        cursor.position = end;

        Ok(Sample {
            meta: cursor.result.meta.clone(),
            data,
            has_more: end < cursor.result.rows.len(),
        })
    }

    /// Drop the snippet's cursor; returns whether one was open
    pub fn close(&self, notebook_uuid: &str, snippet_id: u32) -> Result<bool> {
        let mut cursors = self.lock()?;
        Ok(cursors
            .remove(&(notebook_uuid.to_string(), snippet_id))
            .is_some())
    }

    pub fn is_open(&self, notebook_uuid: &str, snippet_id: u32) -> Result<bool> {
        let cursors = self.lock()?;
        Ok(cursors.contains_key(&(notebook_uuid.to_string(), snippet_id)))
    }
}
