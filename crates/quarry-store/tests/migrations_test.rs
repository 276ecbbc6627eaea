// Integration tests for the migration framework

use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty SQLite database
    let mut conn = setup_test_db();

    // When: Migrations are applied
    let result = quarry_store::migrations::apply_migrations(&mut conn);

    // Then: All migrations succeed
    assert!(
        result.is_ok(),
        "Migrations should succeed: {:?}",
        result.err()
    );

    // And: Every workbench table exists
    let tables = get_table_names(&conn);
    for expected_table in [
        "schema_version",
        "documents",
        "collections",
        "index_jobs",
        "collection_documents",
        "sqlite_sequence", // Auto-created by SQLite for AUTOINCREMENT columns
    ] {
        assert!(
            tables.contains(&expected_table.to_string()),
            "Missing table: {}",
            expected_table
        );
    }
}

#[test]
fn test_reapplying_is_a_no_op() {
    // Given: A database with migrations applied
    let mut conn = setup_test_db();
    quarry_store::migrations::apply_migrations(&mut conn).unwrap();
    let before = quarry_store::migrations::applied_migrations(&conn).unwrap();

    // When: Migrations are applied again
    quarry_store::migrations::apply_migrations(&mut conn).unwrap();

    // Then: Nothing new is recorded
    assert_eq!(
        quarry_store::migrations::applied_migrations(&conn).unwrap(),
        before
    );
}

#[test]
fn test_on_disk_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quarry.db");

    {
        let conn = quarry_store::db::open_workbench(&path).unwrap();
        conn.execute(
            "INSERT INTO documents (uuid, name, doc_type, owner, data, created_at, updated_at)
             VALUES ('u1', 'n', 'query-hive', 'alice', '{}', 0, 0)",
            [],
        )
        .unwrap();
    }

    let conn = quarry_store::db::open_workbench(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}
