//! MySQL connection handling.
//!
//! # Security Features
//! - Credentials are redacted from every error and log line

use super::MySqlInspector;
use crate::Result;
use crate::adapters::ConnectionTarget;
use crate::error::IntrospectError;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;

impl MySqlInspector {
    /// Connects to the MySQL server named by `target`.
    ///
    /// # Errors
    /// Returns `Connection` if the server is unreachable, rejects the
    /// credentials, or the named database does not exist.
    pub async fn connect(target: &ConnectionTarget) -> Result<Self> {
        let options = connect_options(target)?;

        tracing::debug!("Connecting to MySQL server {}", target);
        let conn = options.connect().await.map_err(|e| {
            IntrospectError::connection_failed(
                format!("Failed to connect to MySQL server '{}'", target),
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
            .map_err(|e| IntrospectError::connection_failed("MySQL connection check failed", e))
    }

    /// Sends COM_QUIT and closes the socket.
    pub(crate) async fn close_connection(self) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| IntrospectError::connection_failed("Failed to close MySQL connection", e))
    }
}

/// Parses a MySQL target into connect options.
pub(crate) fn connect_options(target: &ConnectionTarget) -> Result<MySqlConnectOptions> {
    MySqlConnectOptions::from_str(target.expose_url()).map_err(|e| {
        IntrospectError::connection_failed(format!("Invalid MySQL target '{}'", target), e)
    })
}
