//! PostgreSQL catalog queries against `pg_catalog`.
//!
//! Column types come from `format_type`, so they carry modifiers
//! (`character varying(64)`, `numeric(10,2)`).

use super::PostgresInspector;
use crate::Result;
use crate::adapters::helpers::{ForeignKeyRow, RowExt, group_foreign_key_rows};
use crate::adapters::{Dialect, Inspector};
use crate::error::IntrospectError;
use crate::models::{ColumnInfo, ForeignKeyConstraint};
use async_trait::async_trait;

#[async_trait]
impl Inspector for PostgresInspector {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSql
    }

    async fn ping(&mut self) -> Result<()> {
        self.ping_connection().await
    }

    async fn resolve_schema(&mut self, schema: Option<&str>) -> Result<String> {
        match schema {
            None => {
                let current: Option<String> = sqlx::query_scalar("SELECT current_schema()::text")
                    .fetch_one(&mut self.conn)
                    .await
                    .map_err(|e| {
                        IntrospectError::introspection_failed(
                            "Failed to query the current schema",
                            e,
                        )
                    })?;
                // An empty search_path leaves no current schema
                current.ok_or_else(|| IntrospectError::schema_not_found("<search_path>"))
            }
            Some(schema) => {
                let exists: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM pg_namespace WHERE nspname = $1)",
                )
                .bind(schema)
                .fetch_one(&mut self.conn)
                .await
                .map_err(|e| IntrospectError::introspection_failed("Failed to list schemas", e))?;

                if !exists {
                    return Err(IntrospectError::schema_not_found(schema));
                }
                Ok(schema.to_string())
            }
        }
    }

    async fn table_names(&mut self, schema: &str) -> Result<Vec<String>> {
        let table_rows = sqlx::query(
            r#"
            SELECT c.relname::text AS table_name
            FROM pg_class c
            JOIN pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname = $1
            AND c.relkind IN ('r', 'p')
            ORDER BY c.relname
            "#,
        )
        .bind(schema)
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| IntrospectError::introspection_failed("Failed to enumerate tables", e))?;

        table_rows
            .iter()
            .map(|row| row.get_field("table_name", None))
            .collect()
    }

    async fn columns(&mut self, schema: &str, table: &str) -> Result<Vec<ColumnInfo>> {
        let column_rows = sqlx::query(
            r#"
            SELECT
                a.attname::text AS column_name,
                format_type(a.atttypid, a.atttypmod) AS data_type
            FROM pg_attribute a
            JOIN pg_class c ON c.oid = a.attrelid
            JOIN pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname = $1
            AND c.relname = $2
            AND a.attnum > 0
            AND NOT a.attisdropped
            ORDER BY a.attnum
            "#,
        )
        .bind(schema)
        .bind(table)
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| {
            IntrospectError::introspection_failed(
                format!("Failed to collect columns for table '{}.{}'", schema, table),
                e,
            )
        })?;

        let mut columns = Vec::with_capacity(column_rows.len());
        for row in &column_rows {
            let name: String = row.get_field("column_name", Some(table))?;
            let data_type: String = row.get_field("data_type", Some(table))?;
            columns.push(ColumnInfo::new(name, data_type));
        }

        Ok(columns)
    }

    async fn foreign_keys(
        &mut self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ForeignKeyConstraint>> {
        // conkey and confkey are parallel arrays; unnesting them together
        // keeps each local column paired with the column it references
        let fk_rows = sqlx::query(
            r#"
            SELECT
                con.conname::text AS constraint_name,
                a.attname::text AS column_name,
                fns.nspname::text AS referenced_table_schema,
                fcl.relname::text AS referenced_table_name,
                fa.attname::text AS referenced_column_name
            FROM pg_constraint con
            JOIN pg_class cl ON con.conrelid = cl.oid
            JOIN pg_namespace ns ON cl.relnamespace = ns.oid
            JOIN pg_class fcl ON con.confrelid = fcl.oid
            JOIN pg_namespace fns ON fcl.relnamespace = fns.oid
            CROSS JOIN LATERAL unnest(con.conkey, con.confkey)
                WITH ORDINALITY AS k(attnum, fattnum, position)
            JOIN pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
            JOIN pg_attribute fa ON fa.attrelid = con.confrelid AND fa.attnum = k.fattnum
            WHERE con.contype = 'f'
            AND ns.nspname = $1
            AND cl.relname = $2
            ORDER BY con.conname, k.position
            "#,
        )
        .bind(schema)
        .bind(table)
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| {
            IntrospectError::introspection_failed(
                format!(
                    "Failed to collect foreign keys for table '{}.{}'",
                    schema, table
                ),
                e,
            )
        })?;

        let mut rows = Vec::with_capacity(fk_rows.len());
        for row in &fk_rows {
            let name: String = row.get_field("constraint_name", Some(table))?;
            let referred_schema: String = row.get_field("referenced_table_schema", Some(table))?;
            let referred_column: String = row.get_field("referenced_column_name", Some(table))?;
            rows.push(ForeignKeyRow {
                key: name.clone(),
                name: Some(name),
                constrained_column: row.get_field("column_name", Some(table))?,
                referred_schema: (referred_schema != schema).then_some(referred_schema),
                referred_table: row.get_field("referenced_table_name", Some(table))?,
                referred_column: Some(referred_column),
            });
        }

        Ok(group_foreign_key_rows(rows))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.close_connection().await
    }
}
