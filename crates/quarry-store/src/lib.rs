//! Quarry Store - SQLite persistence for the workbench
//!
//! Provides:
//! - Connection management and embedded migrations
//! - `SqliteDocumentStore`: saved queries and notebooks, trash and copy
//! - `SqliteIndexJobLedger`: index job handoff and collection ownership
//! - `SqliteQueryClient`: statement execution against a local database

#![allow(clippy::result_large_err)]

pub mod client;
pub mod db;
pub mod documents;
pub mod errors;
pub mod jobs;
pub mod migrations;

// Re-export key types
pub use client::SqliteQueryClient;
pub use documents::SqliteDocumentStore;
pub use errors::Result;
pub use jobs::{IndexJob, SqliteIndexJobLedger};
