//! Schema migrations
//!
//! - Embedded SQL applied in order inside one transaction each
//! - Idempotent: applied migrations are recorded in `schema_version`
//! - Checksums guard against edited history

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations};
