//! PostgreSQL connection setup and session configuration.
//!
//! # Security Features
//! - Credentials are redacted from every error and log line
//! - Session defaults to read-only transactions
//!
//! No statement or lock timeout is set; catalog queries wait as long as the
//! server takes to answer.

use super::PostgresInspector;
use crate::Result;
use crate::adapters::ConnectionTarget;
use crate::error::IntrospectError;
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, Connection, Executor};
use std::str::FromStr;

/// Statements run on every new session before any catalog query.
pub(super) const SESSION_SETUP: &[&str] =
    &["SET SESSION CHARACTERISTICS AS TRANSACTION READ ONLY"];

impl PostgresInspector {
    /// Connects to the PostgreSQL server named by `target` and applies the
    /// session settings.
    ///
    /// # Errors
    /// Returns `Connection` if the server is unreachable, rejects the
    /// credentials, or the session cannot be configured.
    pub async fn connect(target: &ConnectionTarget) -> Result<Self> {
        let options = connect_options(target)?;

        tracing::debug!("Connecting to PostgreSQL server {}", target);
        let mut conn = options.connect().await.map_err(|e| {
            IntrospectError::connection_failed(
                format!("Failed to connect to PostgreSQL server '{}'", target),
                e,
            )
        })?;

        for statement in SESSION_SETUP {
            if let Err(e) = conn.execute(*statement).await {
                // Don't leak the half-configured session
                let _ = conn.close().await;
                return Err(IntrospectError::connection_failed(
                    "Failed to configure PostgreSQL session",
                    e,
                ));
            }
        }

        Ok(Self { conn })
    }

    /// Checks the connection with a trivial round trip.
    pub(crate) async fn ping_connection(&mut self) -> Result<()> {
        self.conn.ping().await.map_err(|e| {
            IntrospectError::connection_failed("PostgreSQL connection check failed", e)
        })
    }

    /// Sends Terminate and closes the socket.
    pub(crate) async fn close_connection(self) -> Result<()> {
        self.conn.close().await.map_err(|e| {
            IntrospectError::connection_failed("Failed to close PostgreSQL connection", e)
        })
    }
}

/// Parses a PostgreSQL target into connect options.
pub(crate) fn connect_options(target: &ConnectionTarget) -> Result<PgConnectOptions> {
    let options = PgConnectOptions::from_str(target.expose_url()).map_err(|e| {
        IntrospectError::connection_failed(format!("Invalid PostgreSQL target '{}'", target), e)
    })?;

    Ok(options.application_name("dbintrospect"))
}
