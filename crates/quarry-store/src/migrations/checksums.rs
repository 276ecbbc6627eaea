//! Migration checksums
//!
//! An applied migration whose embedded SQL later changes is a corrupted
//! schema history; the runner refuses to continue.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of the migration SQL
pub fn compute_checksum(sql: &str) -> String {
    hex::encode(Sha256::digest(sql.as_bytes()))
}

/// Whether a recorded checksum still matches the embedded SQL
///
/// Rows recorded without a checksum are accepted.
pub fn matches_recorded(recorded: Option<&str>, sql: &str) -> bool {
    match recorded {
        Some(recorded) => recorded == compute_checksum(sql),
        None => true,
    }
}
