//! Database driver and inspector traits with the `sqlx`-backed factory.
//!
//! The extractor talks to a database only through these two traits:
//! a [`Driver`] turns a [`ConnectionTarget`] into a live [`Inspector`], and
//! the inspector answers catalog questions until it is closed.
//!
//! # Module Structure
//! - `config`: Configuration types (ConnectionConfig, Dialect, ConnectionTarget)
//! - `helpers`: Shared row decoding and foreign-key grouping
//! - Dialect-specific inspectors (sqlite, mysql, postgres), feature-gated

use crate::Result;
use crate::error::IntrospectError;
use crate::models::{ColumnInfo, ForeignKeyConstraint};
use async_trait::async_trait;

pub mod config;

#[cfg(any(feature = "sqlite", feature = "mysql", feature = "postgresql"))]
pub(crate) mod helpers;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgresql")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{ConnectionConfig, ConnectionTarget, Dialect};

/// Live connection handle answering catalog queries.
///
/// An inspector owns exactly one database connection. It must be released
/// with [`Inspector::close`]; dropping it without closing is a handle leak
/// from the extractor's point of view.
///
/// # Security
/// All operations are read-only catalog queries.
#[async_trait]
pub trait Inspector: Send {
    /// Dialect of the underlying connection.
    fn dialect(&self) -> Dialect;

    /// Round-trips to the server without touching the catalog.
    async fn ping(&mut self) -> Result<()>;

    /// Resolves the schema to inspect.
    ///
    /// Returns the requested schema if it exists, or the connection's default
    /// schema when `schema` is `None`.
    ///
    /// # Errors
    /// Returns `SchemaNotFound` if the named schema does not exist.
    async fn resolve_schema(&mut self, schema: Option<&str>) -> Result<String>;

    /// Lists base tables of `schema` in catalog order.
    async fn table_names(&mut self, schema: &str) -> Result<Vec<String>>;

    /// Lists the columns of a table in declaration order.
    async fn columns(&mut self, schema: &str, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Lists the foreign-key constraints declared on a table.
    async fn foreign_keys(&mut self, schema: &str, table: &str)
    -> Result<Vec<ForeignKeyConstraint>>;

    /// Releases the connection.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Factory producing inspectors from connection targets.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Opens a fresh connection for `target`.
    ///
    /// # Errors
    /// Returns `Connection` if the database is unreachable, rejects the
    /// credentials, or the dialect's driver is not compiled in.
    async fn connect(&self, target: &ConnectionTarget) -> Result<Box<dyn Inspector>>;
}

/// Driver backed by `sqlx`, dispatching on the target's dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxDriver;

#[async_trait]
impl Driver for SqlxDriver {
    async fn connect(&self, target: &ConnectionTarget) -> Result<Box<dyn Inspector>> {
        match target.dialect() {
            #[cfg(feature = "sqlite")]
            Dialect::Sqlite => {
                let inspector = sqlite::SqliteInspector::connect(target).await?;
                Ok(Box::new(inspector))
            }
            #[cfg(feature = "mysql")]
            Dialect::MySql => {
                let inspector = mysql::MySqlInspector::connect(target).await?;
                Ok(Box::new(inspector))
            }
            #[cfg(feature = "postgresql")]
            Dialect::PostgreSql => {
                let inspector = postgres::PostgresInspector::connect(target).await?;
                Ok(Box::new(inspector))
            }
            #[allow(unreachable_patterns)]
            dialect => Err(driver_unavailable(dialect)),
        }
    }
}

/// Connection error for a dialect whose driver feature is disabled.
fn driver_unavailable(dialect: Dialect) -> IntrospectError {
    let feature = match dialect {
        Dialect::Sqlite => "sqlite",
        Dialect::MySql => "mysql",
        Dialect::PostgreSql => "postgresql",
    };
    IntrospectError::connection_failed(
        format!("{} driver is not available", dialect),
        std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("compile with --features {} to enable it", feature),
        ),
    )
}
