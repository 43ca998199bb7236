//! Library module for the `dbintrospect` command-line tool.
//!
//! Holds the argument definitions and command handlers so they can be
//! exercised from tests; `main.rs` only parses arguments and reports errors.

pub mod output;

use clap::{Args, Parser, Subcommand};
use dbintrospect_core::{ConnectionConfig, Dialect, IntrospectError, Result, SchemaExtractor};
use std::path::PathBuf;
use tracing::info;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// CLI argument structure
#[derive(Debug, Parser)]
#[command(name = "dbintrospect")]
#[command(about = "Extract table, column and foreign-key metadata from a database")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "
dbintrospect - Relational schema extraction

Connects to a database and prints its tables, their columns and the
foreign-key reference of each column as a JSON array.

SUPPORTED DATABASES:
- SQLite      (--dialect sqlite --file-path app.db)
- MySQL       (--dialect mysql --host --port --user --password --database)
- PostgreSQL  (--dialect postgresql --host --port --user --password --database)

Every connection flag can also be set through a DBINTROSPECT_* environment
variable, e.g. DBINTROSPECT_PASSWORD.

EXAMPLES:
  dbintrospect --dialect sqlite --file-path test.db
  dbintrospect extract --dialect postgresql --host localhost --port 5432 \\
      --user app --password-prompt --database shop -o schema.json
  dbintrospect test --dialect mysql --host db --port 3306 --user root \\
      --password '' --database shop
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Extraction arguments used when no subcommand is given
    #[command(flatten)]
    pub extract: ExtractArgs,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract the schema and write it as JSON (default)
    Extract(ExtractArgs),
    /// Test the database connection
    Test(ConnectionArgs),
    /// List supported dialects
    List,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(
        short,
        long,
        global = true,
        help = "Suppress all log output except errors"
    )]
    pub quiet: bool,
}

/// Connection settings, mirrored onto [`ConnectionConfig`].
#[derive(Clone, Default, Args, Zeroize, ZeroizeOnDrop)]
pub struct ConnectionArgs {
    /// Database dialect
    #[arg(
        long,
        env = "DBINTROSPECT_DIALECT",
        help = "Database dialect: sqlite, mysql or postgresql"
    )]
    pub dialect: Option<String>,

    #[arg(long, env = "DBINTROSPECT_HOST", help = "Database server host")]
    pub host: Option<String>,

    #[arg(long, env = "DBINTROSPECT_PORT", help = "Database server port")]
    pub port: Option<String>,

    #[arg(long, env = "DBINTROSPECT_USER", help = "Database user")]
    pub user: Option<String>,

    /// Database password
    #[arg(
        long,
        env = "DBINTROSPECT_PASSWORD",
        hide_env_values = true,
        conflicts_with = "password_prompt",
        help = "Database password (prefer DBINTROSPECT_PASSWORD or --password-prompt)"
    )]
    pub password: Option<String>,

    #[arg(long, help = "Read the database password from the terminal")]
    pub password_prompt: bool,

    #[arg(long, env = "DBINTROSPECT_DATABASE", help = "Database name")]
    pub database: Option<String>,

    #[arg(
        long,
        env = "DBINTROSPECT_SCHEMA",
        help = "Schema to inspect (defaults to the connection's default schema)"
    )]
    pub schema: Option<String>,

    #[arg(
        long,
        env = "DBINTROSPECT_FILE_PATH",
        help = "Path to the SQLite database file"
    )]
    pub file_path: Option<String>,
}

impl std::fmt::Debug for ConnectionArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionArgs")
            .field("dialect", &self.dialect)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("password_prompt", &self.password_prompt)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("file_path", &self.file_path)
            .finish()
    }
}

impl ConnectionArgs {
    /// Builds the library configuration, prompting for the password when
    /// `--password-prompt` is set.
    ///
    /// # Errors
    /// Returns `Configuration` if the password cannot be read.
    pub fn to_config(&self) -> Result<ConnectionConfig> {
        let mut config = self.config_without_prompt();
        if self.password_prompt {
            let password = Zeroizing::new(rpassword::prompt_password("Database password: ").map_err(
                |e| IntrospectError::configuration(format!("Failed to read password: {}", e)),
            )?);
            config.password = Some(password.to_string());
        }
        Ok(config)
    }

    /// Copies the flag values into a configuration without any I/O.
    pub fn config_without_prompt(&self) -> ConnectionConfig {
        let mut config = ConnectionConfig::default();
        config.dialect = self.dialect.clone();
        config.host = self.host.clone();
        config.port = self.port.clone();
        config.user = self.user.clone();
        config.password = self.password.clone();
        config.database = self.database.clone();
        config.schema = self.schema.clone();
        config.file_path = self.file_path.clone();
        config
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output file path
    #[arg(short, long, help = "Write JSON to this file instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Write compact JSON instead of pretty-printed")]
    pub compact: bool,
}

/// Executes the parsed command.
///
/// # Errors
/// Returns the library error of the failed step.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Extract(args)) => extract(&args).await,
        Some(Command::Test(args)) => test_connection(&args).await,
        Some(Command::List) => {
            print!("{}", list_dialects());
            Ok(())
        }
        None => extract(&cli.extract).await,
    }
}

/// Extracts the schema and writes it to the requested destination.
async fn extract(args: &ExtractArgs) -> Result<()> {
    let extractor = SchemaExtractor::new(args.connection.to_config()?);
    let snapshot = extractor.extract().await?;

    output::write_snapshot(&snapshot, args.output.as_deref(), args.compact).await?;
    if let Some(path) = &args.output {
        info!(
            "Schema with {} tables saved to {}",
            snapshot.len(),
            path.display()
        );
    }
    Ok(())
}

/// Opens and closes a connection without reading the catalog.
async fn test_connection(args: &ConnectionArgs) -> Result<()> {
    let config = args.to_config()?;
    let dialect = config.dialect()?;
    SchemaExtractor::new(config).test_connection().await?;

    println!("Connection to {} database successful", dialect);
    Ok(())
}

/// Describes each dialect, its target template and driver availability.
pub fn list_dialects() -> String {
    let mut listing = String::from("Supported Dialects:\n\n");
    for dialect in Dialect::ALL {
        let template = match dialect {
            Dialect::Sqlite => "sqlite://{file_path}",
            Dialect::MySql => "mysql://{user}:{password}@{host}:{port}/{database}",
            Dialect::PostgreSql => "postgres://{user}:{password}@{host}:{port}/{database}",
        };
        let status = if dialect.driver_available() {
            "available"
        } else {
            "not compiled in"
        };
        listing.push_str(&format!("{}:\n", dialect));
        listing.push_str(&format!("  Target: {}\n", template));
        listing.push_str(&format!("  Driver: {}\n\n", status));
    }
    listing
}
