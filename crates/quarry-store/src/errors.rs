//! Error handling for quarry-store
//!
//! Wraps quarry-core ExError with store-specific helpers

use quarry_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::StorageException)
        .with_op("migration")
        .with_entity_id(migration_id)
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::StorageException)
        .with_op("migration_checksum")
        .with_entity_id(migration_id)
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a storage error for a failed document operation
pub fn storage_error(op: &str, entity_id: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::StorageException)
        .with_op(op)
        .with_entity_id(entity_id)
        .with_message(reason)
}

/// Create a submission error for a rejected index job
pub fn submission_error(destination: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::SubmissionError)
        .with_op("submit_index_job")
        .with_entity_id(destination)
        .with_message(reason)
}

/// Create a not-found error for a missing document
pub fn document_not_found(entity_id: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_entity_id(entity_id)
        .with_message("Document not found")
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::StorageException)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a serialization error
pub fn serialization_error(op: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(op)
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
