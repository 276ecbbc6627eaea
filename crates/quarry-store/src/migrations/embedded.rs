//! SQL migrations compiled into the binary

/// One schema migration
pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// Every migration, oldest first
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        id: "001_documents",
        sql: include_str!("../../migrations/001_documents.sql"),
    },
    Migration {
        id: "002_index_jobs",
        sql: include_str!("../../migrations/002_index_jobs.sql"),
    },
];
