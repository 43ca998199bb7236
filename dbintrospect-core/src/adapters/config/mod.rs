//! Configuration types for database adapters.
//!
//! - `ConnectionConfig`: caller-supplied connection parameters
//! - `Dialect`: the closed set of supported database dialects
//! - `ConnectionTarget`: the dialect-specific connection URL built from a config
//!
//! # Security
//! Passwords held by these types are zeroed on drop and masked in every
//! formatted representation.

mod connection;
mod target;

pub use connection::{ConnectionConfig, Dialect};
pub use target::ConnectionTarget;
