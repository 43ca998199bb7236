//! MySQL inspector.
//!
//! # Module Structure
//! - `connection`: Opening and closing the server connection
//! - `schema_collection`: Table, column and foreign-key queries against
//!   `INFORMATION_SCHEMA`
//!
//! # Security Guarantees
//! - All operations are read-only (SELECT only)
//! - Connection strings are sanitized in error messages
//!
//! In MySQL a schema is a database; the default schema is the database named
//! in the connection target.

pub mod connection;
pub mod schema_collection;


use sqlx::MySqlConnection;

/// Inspector over a single MySQL connection.
pub struct MySqlInspector {
    conn: MySqlConnection,
}

impl std::fmt::Debug for MySqlInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Connection details are omitted to prevent credential exposure
        f.debug_struct("MySqlInspector").finish_non_exhaustive()
    }
}
