//! SQLite catalog queries.
//!
//! # SQLite System Tables
//! - `pragma_database_list`: attached databases (the SQLite notion of schema)
//! - `<schema>.sqlite_master`: schema definitions for all database objects
//! - `pragma_table_info(table, schema)`: column information for a table
//! - `pragma_foreign_key_list(table, schema)`: foreign key information

use super::{DEFAULT_SCHEMA, SqliteInspector};
use crate::Result;
use crate::adapters::helpers::{ForeignKeyRow, RowExt, group_foreign_key_rows, quote_identifier};
use crate::adapters::{Dialect, Inspector};
use crate::error::IntrospectError;
use crate::models::{ColumnInfo, ForeignKeyConstraint};
use async_trait::async_trait;

/// Type name reported for columns declared without a type.
const UNTYPED_COLUMN_TYPE: &str = "NULL";

#[async_trait]
impl Inspector for SqliteInspector {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn ping(&mut self) -> Result<()> {
        self.ping_connection().await
    }

    async fn resolve_schema(&mut self, schema: Option<&str>) -> Result<String> {
        let Some(schema) = schema else {
            return Ok(DEFAULT_SCHEMA.to_string());
        };

        let attached: Option<String> =
            sqlx::query_scalar("SELECT name FROM pragma_database_list WHERE name = ?1")
                .bind(schema)
                .fetch_optional(&mut self.conn)
                .await
                .map_err(|e| {
                    IntrospectError::introspection_failed("Failed to list attached databases", e)
                })?;

        attached.ok_or_else(|| IntrospectError::schema_not_found(schema))
    }

    async fn table_names(&mut self, schema: &str) -> Result<Vec<String>> {
        let tables_query = format!(
            r#"
            SELECT name
            FROM {}.sqlite_master
            WHERE type = 'table'
            AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
            ORDER BY name
            "#,
            quote_identifier(schema)
        );

        let table_rows = sqlx::query(&tables_query)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| IntrospectError::introspection_failed("Failed to enumerate tables", e))?;

        table_rows
            .iter()
            .map(|row| row.get_field("name", None))
            .collect()
    }

    async fn columns(&mut self, schema: &str, table: &str) -> Result<Vec<ColumnInfo>> {
        let column_rows = sqlx::query(
            r#"
            SELECT name, type
            FROM pragma_table_info(?1, ?2)
            ORDER BY cid
            "#,
        )
        .bind(table)
        .bind(schema)
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| {
            IntrospectError::introspection_failed(
                format!("Failed to collect columns for table '{}'", table),
                e,
            )
        })?;

        let mut columns = Vec::with_capacity(column_rows.len());
        for row in &column_rows {
            let name: String = row.get_field("name", Some(table))?;
            let data_type: Option<String> = row.get_field("type", Some(table))?;
            let data_type = data_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTYPED_COLUMN_TYPE.to_string());
            columns.push(ColumnInfo::new(name, data_type));
        }

        Ok(columns)
    }

    async fn foreign_keys(
        &mut self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ForeignKeyConstraint>> {
        let fk_rows = sqlx::query(
            r#"
            SELECT id, seq, "table" AS referred_table, "from" AS constrained_column,
                   "to" AS referred_column
            FROM pragma_foreign_key_list(?1, ?2)
            ORDER BY id, seq
            "#,
        )
        .bind(table)
        .bind(schema)
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| {
            IntrospectError::introspection_failed(
                format!("Failed to collect foreign keys for table '{}'", table),
                e,
            )
        })?;

        let mut rows = Vec::with_capacity(fk_rows.len());
        for row in &fk_rows {
            let id: i64 = row.get_field("id", Some(table))?;
            rows.push(ForeignKeyRow {
                key: id.to_string(),
                name: None, // SQLite doesn't name FK constraints
                constrained_column: row.get_field("constrained_column", Some(table))?,
                referred_schema: None,
                referred_table: row.get_field("referred_table", Some(table))?,
                referred_column: row.get_field("referred_column", Some(table))?,
            });
        }

        let mut constraints = group_foreign_key_rows(rows);

        // `REFERENCES parent` without a column list points at parent's primary key
        for constraint in &mut constraints {
            if constraint.referred_columns.is_empty() {
                constraint.referred_columns = self
                    .primary_key_columns(schema, &constraint.referred_table)
                    .await?;
            }
        }

        Ok(constraints)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.close_connection().await
    }
}

impl SqliteInspector {
    /// Primary key columns of a table in key order; empty if the table has
    /// no primary key or does not exist.
    async fn primary_key_columns(&mut self, schema: &str, table: &str) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT name
            FROM pragma_table_info(?1, ?2)
            WHERE pk > 0
            ORDER BY pk
            "#,
        )
        .bind(table)
        .bind(schema)
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| {
            IntrospectError::introspection_failed(
                format!("Failed to collect primary key for table '{}'", table),
                e,
            )
        })
    }
}
