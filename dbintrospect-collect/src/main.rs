//! Database schema extraction tool.
//!
//! Connects to a SQLite, MySQL or PostgreSQL database and prints its tables,
//! columns and foreign-key references as JSON.
//!
//! # Security Guarantees
//! - Read-only database operations only
//! - Passwords never appear in logs or error messages
//! - Logs go to stderr; stdout carries only the JSON document

use clap::Parser;
use dbintrospect_collect::{Cli, run};
use dbintrospect_core::init_logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
