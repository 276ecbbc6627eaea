//! Document persistence contract

use crate::errors::ExResult;
use crate::model::{Document, Notebook};

/// Persistence of saved queries and notebooks
///
/// Failures surface as `StorageException` (or `NotFound` for unknown ids).
pub trait DocumentStore: Send + Sync {
    /// Fetch a live (not trashed) document by numeric id
    fn get_document(&self, id: i64) -> ExResult<Document>;

    /// Fetch a document by uuid, trashed or not
    fn get_by_uuid(&self, uuid: &str) -> ExResult<Document>;

    /// Move the document to the trash on behalf of `user`
    ///
    /// # Errors
    ///
    /// `StorageException` when `user` may not write the document.
    fn trash(&self, uuid: &str, user: &str) -> ExResult<()>;

    /// Copy a document under a new name and owner; returns the copy
    fn copy(&self, uuid: &str, new_name: &str, owner: &str) -> ExResult<Document>;

    /// Build the notebook stored in document `id`
    fn get_notebook(&self, id: i64) -> ExResult<Notebook> {
        let document = self.get_document(id)?;
        Ok(Notebook::from_document(&document)?)
    }
}
