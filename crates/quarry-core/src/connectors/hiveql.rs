//! HiveQL statement builders shared by the HiveServer2-family drivers

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::errors::{QuarryError, Result};

/// Characters kept verbatim in storage paths embedded in URLs
const PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Row limit of browse queries
pub const BROWSE_LIMIT: usize = 100;

/// Reject anything that is not a query
///
/// # Errors
///
/// `InvalidStatement` unless the statement starts with `SELECT` or `WITH`.
pub fn ensure_query(statement: &str) -> Result<()> {
    let first_word = statement
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();

    match first_word.as_str() {
        "SELECT" | "WITH" => Ok(()),
        _ => Err(QuarryError::InvalidStatement {
            reason: "Only SELECT statements can be saved".to_string(),
        }),
    }
}

/// Split a `database.table` destination, falling back to `default_database`
///
/// # Errors
///
/// `InvalidDestination` when either part is empty.
pub fn split_destination(destination: &str, default_database: &str) -> Result<(String, String)> {
    let destination = destination.trim();
    let (database, table) = match destination.split_once('.') {
        Some((db, table)) => (db.trim(), table.trim()),
        None => (default_database, destination),
    };

    if database.is_empty() || table.is_empty() {
        return Err(QuarryError::InvalidDestination {
            destination: destination.to_string(),
            reason: "Expected <table> or <database>.<table>".to_string(),
        });
    }
    Ok((database.to_string(), table.to_string()))
}

/// Backtick-quote an identifier
pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Single-quote a string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// `CREATE [TEMPORARY] TABLE .. [LOCATION ..] AS <query>`
pub fn create_table_as(
    database: &str,
    table: &str,
    query: &str,
    temporary: bool,
    location: Option<&str>,
) -> String {
    let mut statement = String::from("CREATE ");
    if temporary {
        statement.push_str("TEMPORARY ");
    }
    statement.push_str(&format!(
        "TABLE {}.{}\n",
        quote_identifier(database),
        quote_identifier(table)
    ));
    if let Some(location) = location.filter(|l| !l.trim().is_empty()) {
        statement.push_str(&format!("LOCATION {}\n", quote_literal(location)));
    }
    statement.push_str("AS\n");
    statement.push_str(query);
    statement
}

/// Staged external-table export of a query result into a storage directory
///
/// The staging table is created as plain delimited text at `destination`,
/// flipped to external so dropping it keeps the files, then dropped.
pub fn export_to_directory(
    database: &str,
    staging_table: &str,
    destination: &str,
    query: &str,
) -> String {
    let target = format!(
        "{}.{}",
        quote_identifier(database),
        quote_identifier(staging_table)
    );

    [
        format!("DROP TABLE IF EXISTS {}", target),
        format!(
            "CREATE TABLE {}\nROW FORMAT DELIMITED FIELDS TERMINATED BY '\\t'\nSTORED AS TEXTFILE\nLOCATION {}\nAS\n{}",
            target,
            quote_literal(destination),
            query
        ),
        format!("ALTER TABLE {} SET TBLPROPERTIES('EXTERNAL'='TRUE')", target),
        format!("DROP TABLE IF EXISTS {}", target),
    ]
    .join(";\n\n")
}

/// Name of the throwaway staging table of one export
pub fn staging_table_name(token: &str) -> String {
    format!("__quarry_export_{}", token)
}

/// Metastore page of a table
pub fn table_url(database: &str, table: &str) -> String {
    format!("/metastore/table/{}/{}", database, table)
}

/// File browser page of a storage path
pub fn file_browser_url(path: &str) -> String {
    format!("/filebrowser/view={}", utf8_percent_encode(path, PATH_SAFE))
}
