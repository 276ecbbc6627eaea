//! Engine drivers
//!
//! - `HiveServer2Api`: Hive and Impala, sharing the HiveQL builders in `hiveql`
//! - `SqliteApi`: embedded SQLite databases

pub mod hiveql;
pub mod hiveserver2;
pub mod sqlite;

pub use hiveserver2::{Flavor, HiveServer2Api};
pub use sqlite::SqliteApi;
