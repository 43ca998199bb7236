//! SQLite inspector.
//!
//! # Module Structure
//! - `connection`: Opening and closing the database file
//! - `schema_collection`: Table, column and foreign-key queries via PRAGMA
//!   table-valued functions and `sqlite_master`
//!
//! # SQLite-Specific Behavior
//! - Schemas are attached databases (`main`, `temp`, or an `ATTACH` alias);
//!   `main` is the default
//! - Files are opened read-only and never created
//! - A foreign key declared without a column list references the parent
//!   table's primary key

pub mod connection;
pub mod schema_collection;

#[cfg(test)]
mod tests;

use sqlx::SqliteConnection;

/// Schema inspected when none is requested.
pub const DEFAULT_SCHEMA: &str = "main";

/// Inspector over a single SQLite connection.
pub struct SqliteInspector {
    conn: SqliteConnection,
}

impl std::fmt::Debug for SqliteInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteInspector").finish_non_exhaustive()
    }
}
