//! Core library for dbintrospect.
//!
//! Connects to a relational database and extracts a snapshot of its tables,
//! their columns and the foreign-key reference of each column.
//!
//! # Security Guarantees
//! - Passwords are never logged or included in error messages
//! - Credentials are zeroized when configurations are dropped
//! - All database operations are read-only
//!
//! # Architecture
//! - [`SchemaExtractor`] drives one extraction per call over a [`Driver`]
//! - [`Driver`] opens a connection and yields an [`Inspector`]
//! - `sqlx`-backed inspectors per dialect, selected by cargo features

pub mod adapters;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use adapters::{ConnectionConfig, ConnectionTarget, Dialect, Driver, Inspector, SqlxDriver};
pub use error::{IntrospectError, Result};
pub use extractor::{SchemaExtractor, extract_schema, resolve_foreign_reference};
pub use logging::init_logging;
pub use models::{
    ColumnDescriptor, ColumnInfo, ForeignKeyConstraint, SchemaSnapshot, TableDescriptor,
};
