//! MySQL catalog queries.
//!
//! Every text column is cast to CHAR because MySQL 8.0 reports several
//! `INFORMATION_SCHEMA` columns as VARBINARY, which would not decode as
//! strings.

use super::MySqlInspector;
use crate::Result;
use crate::adapters::helpers::{ForeignKeyRow, RowExt, group_foreign_key_rows};
use crate::adapters::{Dialect, Inspector};
use crate::error::IntrospectError;
use crate::models::{ColumnInfo, ForeignKeyConstraint};
use async_trait::async_trait;

#[async_trait]
impl Inspector for MySqlInspector {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn ping(&mut self) -> Result<()> {
        self.ping_connection().await
    }

    async fn resolve_schema(&mut self, schema: Option<&str>) -> Result<String> {
        match schema {
            None => {
                let current: Option<String> =
                    sqlx::query_scalar("SELECT CAST(DATABASE() AS CHAR)")
                        .fetch_one(&mut self.conn)
                        .await
                        .map_err(|e| {
                            IntrospectError::introspection_failed(
                                "Failed to query the current database",
                                e,
                            )
                        })?;
                // A connection without a selected database has no default schema
                current.ok_or_else(|| IntrospectError::schema_not_found("<none>"))
            }
            Some(schema) => {
                let exists: i64 = sqlx::query_scalar(
                    r#"
                    SELECT COUNT(*)
                    FROM INFORMATION_SCHEMA.SCHEMATA
                    WHERE SCHEMA_NAME = ?
                    "#,
                )
                .bind(schema)
                .fetch_one(&mut self.conn)
                .await
                .map_err(|e| IntrospectError::introspection_failed("Failed to list schemas", e))?;

                if exists == 0 {
                    return Err(IntrospectError::schema_not_found(schema));
                }
                Ok(schema.to_string())
            }
        }
    }

    async fn table_names(&mut self, schema: &str) -> Result<Vec<String>> {
        let table_rows = sqlx::query(
            r#"
            SELECT CAST(TABLE_NAME AS CHAR) AS TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = ?
            AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
            "#,
        )
        .bind(schema)
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| IntrospectError::introspection_failed("Failed to enumerate tables", e))?;

        table_rows
            .iter()
            .map(|row| row.get_field("TABLE_NAME", None))
            .collect()
    }

    async fn columns(&mut self, schema: &str, table: &str) -> Result<Vec<ColumnInfo>> {
        let column_rows = sqlx::query(
            r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR) AS COLUMN_NAME,
                CAST(COLUMN_TYPE AS CHAR) AS COLUMN_TYPE
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
            "#,
        )
        .bind(schema)
        .bind(table)
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
            let name: String = row.get_field("COLUMN_NAME", Some(table))?;
            let data_type: String = row.get_field("COLUMN_TYPE", Some(table))?;
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
            SELECT
                CAST(CONSTRAINT_NAME AS CHAR) AS CONSTRAINT_NAME,
                CAST(COLUMN_NAME AS CHAR) AS COLUMN_NAME,
                CAST(REFERENCED_TABLE_SCHEMA AS CHAR) AS REFERENCED_TABLE_SCHEMA,
                CAST(REFERENCED_TABLE_NAME AS CHAR) AS REFERENCED_TABLE_NAME,
                CAST(REFERENCED_COLUMN_NAME AS CHAR) AS REFERENCED_COLUMN_NAME
            FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE
            WHERE TABLE_SCHEMA = ?
            AND TABLE_NAME = ?
            AND REFERENCED_TABLE_NAME IS NOT NULL
            ORDER BY CONSTRAINT_NAME, ORDINAL_POSITION
            "#,
        )
        .bind(schema)
        .bind(table)
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
            let name: String = row.get_field("CONSTRAINT_NAME", Some(table))?;
            let referred_schema: Option<String> =
                row.get_field("REFERENCED_TABLE_SCHEMA", Some(table))?;
            rows.push(ForeignKeyRow {
                key: name.clone(),
                name: Some(name),
                constrained_column: row.get_field("COLUMN_NAME", Some(table))?,
                // Same-schema references are reported without a schema
                referred_schema: referred_schema.filter(|s| s != schema),
                referred_table: row.get_field("REFERENCED_TABLE_NAME", Some(table))?,
                referred_column: row.get_field("REFERENCED_COLUMN_NAME", Some(table))?,
            });
        }

        Ok(group_foreign_key_rows(rows))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.close_connection().await
    }
}
