//! Connection configuration and dialect selection.
//!
//! `ConnectionConfig` accepts every field as an optional string; nothing is
//! validated until a [`ConnectionTarget`](super::ConnectionTarget) is built
//! from it.

use crate::error::IntrospectError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Database dialect selecting the driver and wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Sqlite,
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "postgresql", alias = "postgres")]
    PostgreSql,
}

impl Dialect {
    /// Every supported dialect.
    pub const ALL: [Dialect; 3] = [Dialect::Sqlite, Dialect::MySql, Dialect::PostgreSql];

    /// Canonical configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::MySql => "mysql",
            Dialect::PostgreSql => "postgresql",
        }
    }

    /// URL scheme used in connection targets.
    pub fn scheme(self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::MySql => "mysql",
            Dialect::PostgreSql => "postgres",
        }
    }

    /// Whether the database lives in a local file rather than behind a server.
    pub fn is_file_based(self) -> bool {
        matches!(self, Dialect::Sqlite)
    }

    /// Whether the driver for this dialect was compiled in.
    pub fn driver_available(self) -> bool {
        match self {
            Dialect::Sqlite => cfg!(feature = "sqlite"),
            Dialect::MySql => cfg!(feature = "mysql"),
            Dialect::PostgreSql => cfg!(feature = "postgresql"),
        }
    }

    /// Parses an optional dialect value, failing on unset or unknown values.
    pub fn parse(value: Option<&str>) -> crate::Result<Self> {
        match value {
            Some(value) => value.parse(),
            None => Err(IntrospectError::unsupported_dialect(None)),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = IntrospectError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "mysql" => Ok(Dialect::MySql),
            "postgresql" | "postgres" => Ok(Dialect::PostgreSql),
            _ => Err(IntrospectError::unsupported_dialect(Some(s))),
        }
    }
}

/// Connection parameters for one extractor.
///
/// # Security
/// The password is zeroed on drop and never appears in `Debug` or `Display`
/// output.
///
/// # Example
/// ```rust
/// use dbintrospect_core::adapters::ConnectionConfig;
///
/// let config = ConnectionConfig::new("postgresql")
///     .with_host("localhost")
///     .with_port("5432")
///     .with_user("admin")
///     .with_password("secret")
///     .with_database("app");
///
/// assert!(!format!("{config:?}").contains("secret"));
/// ```
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ConnectionConfig {
    /// Dialect name (`sqlite`, `mysql`, `postgresql`)
    pub dialect: Option<String>,
    /// Server host for network dialects
    pub host: Option<String>,
    /// Server port for network dialects
    pub port: Option<String>,
    /// Login user for network dialects
    pub user: Option<String>,
    /// Login password for network dialects
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Database name for network dialects
    pub database: Option<String>,
    /// Schema to extract; the database's default schema when unset
    pub schema: Option<String>,
    /// Database file for file-based dialects
    pub file_path: Option<String>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("dialect", &self.dialect)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("file_path", &self.file_path)
            .finish()
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dialect = self.dialect.as_deref().unwrap_or("<unset>");
        match &self.file_path {
            Some(path) if self.host.is_none() => write!(f, "{}:{}", dialect, path),
            _ => write!(
                f,
                "{}://{}{}{}",
                dialect,
                self.host.as_deref().unwrap_or(""),
                self.port.as_ref().map_or_else(String::new, |p| format!(":{}", p)),
                self.database
                    .as_ref()
                    .map_or_else(String::new, |db| format!("/{}", db))
            ),
        }
        // Intentionally omit user and password
    }
}

impl ConnectionConfig {
    /// Creates a config for the given dialect name.
    pub fn new(dialect: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.dialect = Some(dialect.into());
        config
    }

    /// Creates a SQLite config for a database file.
    pub fn sqlite(file_path: impl Into<String>) -> Self {
        Self::new(Dialect::Sqlite.as_str()).with_file_path(file_path)
    }

    /// Builder method to set host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// Builder method to set user.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Builder method to set password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Builder method to set schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Builder method to set file path.
    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    /// Resolves the dialect field.
    ///
    /// # Errors
    /// Returns `UnsupportedDialect` when the field is unset or unrecognized.
    pub fn dialect(&self) -> crate::Result<Dialect> {
        Dialect::parse(self.dialect.as_deref())
    }

    /// Schema filter, treating an empty string as unset.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref().filter(|s| !s.is_empty())
    }
}
