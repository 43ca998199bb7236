//! PostgreSQL inspector.
//!
//! # Module Structure
//! - `connection`: Connection setup, session settings and shutdown
//! - `schema_collection`: Table, column and foreign-key queries against
//!   `pg_catalog`
//!
//! # Security Guarantees
//! - All operations are read-only (SELECT only)
//! - Sessions are switched to read-only transactions on connect
//! - Connection strings are sanitized in error messages

mod connection;
mod schema_collection;


use sqlx::PgConnection;

/// Inspector over a single PostgreSQL connection.
pub struct PostgresInspector {
    conn: PgConnection,
}

impl std::fmt::Debug for PostgresInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresInspector").finish_non_exhaustive()
    }
}
