//! Unit tests for the SQLite inspector.
//!
//! These tests build throwaway database files and verify:
//! - Schema resolution for the default and missing schemas
//! - Table enumeration order and internal table filtering
//! - Column order and declared types
//! - Foreign key grouping and implicit primary key references

use super::{DEFAULT_SCHEMA, SqliteInspector};
use crate::adapters::{ConnectionConfig, ConnectionTarget, Dialect, Inspector};
use crate::error::IntrospectError;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::path::Path;
use tempfile::TempDir;

/// Creates a database file from `statements` and returns its directory guard.
async fn create_database(statements: &[&str]) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.db");

    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .connect()
        .await
        .expect("create database");
    for statement in statements {
        sqlx::query(statement)
            .execute(&mut conn)
            .await
            .expect("run ddl");
    }
    conn.close().await.expect("close setup connection");

    (dir, path)
}

async fn open(path: &Path) -> SqliteInspector {
    let config = ConnectionConfig::sqlite(path.to_string_lossy());
    let target = ConnectionTarget::from_config(&config).expect("sqlite target");
    SqliteInspector::connect(&target).await.expect("open database")
}

const SHOP_DDL: &[&str] = &[
    "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)",
    "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER REFERENCES users(id), total NUMERIC(10,2))",
];

// =============================================================================
// Schema Resolution
// =============================================================================

#[tokio::test]
async fn test_default_schema_is_main() {
    let (_dir, path) = create_database(SHOP_DDL).await;
    let mut inspector = open(&path).await;

    assert_eq!(inspector.dialect(), Dialect::Sqlite);
    assert_eq!(
        inspector.resolve_schema(None).await.expect("default schema"),
        DEFAULT_SCHEMA
    );
    assert_eq!(
        inspector.resolve_schema(Some("main")).await.expect("main"),
        "main"
    );

    Box::new(inspector).close().await.expect("close");
}

#[tokio::test]
async fn test_missing_schema_is_reported() {
    let (_dir, path) = create_database(SHOP_DDL).await;
    let mut inspector = open(&path).await;

    let result = inspector.resolve_schema(Some("analytics")).await;
    assert!(matches!(
        result,
        Err(IntrospectError::SchemaNotFound { ref schema }) if schema == "analytics"
    ));

    Box::new(inspector).close().await.expect("close");
}

// =============================================================================
// Tables and Columns
// =============================================================================

#[tokio::test]
async fn test_table_names_are_sorted_and_skip_internal_tables() {
    let (_dir, path) = create_database(&[
        "CREATE TABLE zebra (id INTEGER PRIMARY KEY AUTOINCREMENT)",
        "CREATE TABLE apple (id INTEGER)",
        "CREATE VIEW apple_view AS SELECT id FROM apple",
    ])
    .await;
    let mut inspector = open(&path).await;

    // AUTOINCREMENT creates sqlite_sequence, which must not be reported
    let tables = inspector.table_names("main").await.expect("tables");
    assert_eq!(tables, vec!["apple", "zebra"]);

    Box::new(inspector).close().await.expect("close");
}

#[tokio::test]
async fn test_columns_keep_declaration_order_and_types() {
    let (_dir, path) = create_database(&[
        "CREATE TABLE items (sku VARCHAR(32), id INTEGER PRIMARY KEY, price NUMERIC(10,2), notes)",
    ])
    .await;
    let mut inspector = open(&path).await;

    let columns = inspector.columns("main", "items").await.expect("columns");
    let pairs: Vec<(&str, &str)> = columns
        .iter()
        .map(|c| (c.name.as_str(), c.data_type.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("sku", "VARCHAR(32)"),
            ("id", "INTEGER"),
            ("price", "NUMERIC(10,2)"),
            ("notes", "NULL"),
        ]
    );

    Box::new(inspector).close().await.expect("close");
}

#[tokio::test]
async fn test_columns_of_unknown_table_are_empty() {
    let (_dir, path) = create_database(SHOP_DDL).await;
    let mut inspector = open(&path).await;

    let columns = inspector.columns("main", "ghost").await.expect("columns");
    assert!(columns.is_empty());

    Box::new(inspector).close().await.expect("close");
}

// =============================================================================
// Foreign Keys
// =============================================================================

#[tokio::test]
async fn test_single_column_foreign_key() {
    let (_dir, path) = create_database(SHOP_DDL).await;
    let mut inspector = open(&path).await;

    let fks = inspector.foreign_keys("main", "orders").await.expect("fks");
    assert_eq!(fks.len(), 1);
    assert_eq!(fks[0].constrained_columns, vec!["user_id"]);
    assert_eq!(fks[0].referred_table, "users");
    assert_eq!(fks[0].referred_columns, vec!["id"]);
    assert!(fks[0].name.is_none());

    let fks = inspector.foreign_keys("main", "users").await.expect("fks");
    assert!(fks.is_empty());

    Box::new(inspector).close().await.expect("close");
}

#[tokio::test]
async fn test_composite_foreign_key_is_grouped() {
    let (_dir, path) = create_database(&[
        "CREATE TABLE orders (region TEXT, number INTEGER, PRIMARY KEY (region, number))",
        "CREATE TABLE shipments (id INTEGER PRIMARY KEY, order_region TEXT, order_number INTEGER, \
         FOREIGN KEY (order_region, order_number) REFERENCES orders(region, number))",
    ])
    .await;
    let mut inspector = open(&path).await;

    let fks = inspector
        .foreign_keys("main", "shipments")
        .await
        .expect("fks");
    assert_eq!(fks.len(), 1);
    assert_eq!(fks[0].constrained_columns, vec!["order_region", "order_number"]);
    assert_eq!(fks[0].referred_columns, vec!["region", "number"]);

    Box::new(inspector).close().await.expect("close");
}

#[tokio::test]
async fn test_implicit_reference_resolves_to_primary_key() {
    let (_dir, path) = create_database(&[
        "CREATE TABLE accounts (code TEXT PRIMARY KEY, label TEXT)",
        "CREATE TABLE invoices (id INTEGER PRIMARY KEY, account TEXT REFERENCES accounts)",
    ])
    .await;
    let mut inspector = open(&path).await;

    let fks = inspector.foreign_keys("main", "invoices").await.expect("fks");
    assert_eq!(fks.len(), 1);
    assert_eq!(fks[0].referred_table, "accounts");
    assert_eq!(fks[0].referred_columns, vec!["code"]);

    Box::new(inspector).close().await.expect("close");
}

// =============================================================================
// Connection Lifecycle
// =============================================================================

#[tokio::test]
async fn test_ping_and_read_only() {
    let (_dir, path) = create_database(SHOP_DDL).await;
    let mut inspector = open(&path).await;

    inspector.ping().await.expect("ping");

    let write = sqlx::query("INSERT INTO users (name) VALUES ('mallory')")
        .execute(&mut inspector.conn)
        .await;
    assert!(write.is_err(), "inspector connections must be read-only");

    Box::new(inspector).close().await.expect("close");
}
