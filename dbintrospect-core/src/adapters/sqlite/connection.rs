//! SQLite connection handling.
//!
//! SQLite databases are local files, so a single connection is all an
//! extraction needs. The file is opened from the target's raw path, never by
//! re-parsing its `sqlite://` URL.
//!
//! # Security Features
//! - Opens databases in read-only mode
//! - Never creates a missing database file

use super::SqliteInspector;
use crate::Result;
use crate::adapters::ConnectionTarget;
use crate::error::IntrospectError;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};

impl SqliteInspector {
    /// Opens the database file named by `target`.
    ///
    /// # Errors
    /// Returns `Configuration` if the target carries no file path, and
    /// `Connection` if the file does not exist or is not a SQLite database.
    pub async fn connect(target: &ConnectionTarget) -> Result<Self> {
        let options = connect_options(target)?;

        tracing::debug!("Opening SQLite database {}", target);
        let conn = options.connect().await.map_err(|e| {
            IntrospectError::connection_failed(
                format!("Failed to open SQLite database '{}'", target),
                e,
            )
        })?;

        Ok(Self { conn })
    }

    /// Checks the connection with a trivial round trip.
    pub(crate) async fn ping_connection(&mut self) -> Result<()> {
        self.conn
            .ping()
            .await
            .map_err(|e| IntrospectError::connection_failed("SQLite connection check failed", e))
    }

    /// Closes the connection gracefully.
    pub(crate) async fn close_connection(self) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| IntrospectError::connection_failed("Failed to close SQLite connection", e))
    }
}

/// Builds read-only connect options for a SQLite target.
fn connect_options(target: &ConnectionTarget) -> Result<SqliteConnectOptions> {
    let file_path = target.file_path().ok_or_else(|| {
        IntrospectError::configuration(format!("SQLite target '{}' has no file path", target))
    })?;

    Ok(SqliteConnectOptions::new()
        .filename(file_path)
        .read_only(true)
        .create_if_missing(false))
}
