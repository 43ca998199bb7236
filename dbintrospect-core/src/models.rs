//! Data models for extracted schema metadata.
//!
//! The snapshot types (`SchemaSnapshot`, `TableDescriptor`,
//! `ColumnDescriptor`) are immutable value records built once per extraction
//! and handed to the caller. `ColumnInfo` and `ForeignKeyConstraint` are the
//! raw records reported by an inspector before cross-referencing.

use serde::{Deserialize, Serialize};

/// A column of an extracted table.
///
/// The foreign reference is either fully present (table and column) or fully
/// absent; the constructors make any other state unrepresentable and
/// deserialization rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColumnRecord")]
pub struct ColumnDescriptor {
    name: String,
    data_type: String,
    foreign_table: Option<String>,
    foreign_column: Option<String>,
}

impl ColumnDescriptor {
    /// Creates a column with no foreign reference.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            foreign_table: None,
            foreign_column: None,
        }
    }

    /// Builder method to attach a foreign reference.
    pub fn with_reference(
        mut self,
        foreign_table: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        self.foreign_table = Some(foreign_table.into());
        self.foreign_column = Some(foreign_column.into());
        self
    }

    /// Column name, unique within the owning table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type string as reported by the database catalog.
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// Referenced table, if the column participates in a foreign key.
    pub fn foreign_table(&self) -> Option<&str> {
        self.foreign_table.as_deref()
    }

    /// Referenced column, present exactly when `foreign_table` is.
    pub fn foreign_column(&self) -> Option<&str> {
        self.foreign_column.as_deref()
    }

    /// The `(table, column)` pair this column references.
    pub fn foreign_reference(&self) -> Option<(&str, &str)> {
        self.foreign_table().zip(self.foreign_column())
    }
}

/// Wire shape of a column, validated on the way in.
#[derive(Deserialize)]
struct ColumnRecord {
    name: String,
    data_type: String,
    #[serde(default)]
    foreign_table: Option<String>,
    #[serde(default)]
    foreign_column: Option<String>,
}

impl TryFrom<ColumnRecord> for ColumnDescriptor {
    type Error = String;

    fn try_from(record: ColumnRecord) -> std::result::Result<Self, Self::Error> {
        let column = Self::new(record.name, record.data_type);
        match (record.foreign_table, record.foreign_column) {
            (Some(table), Some(referenced)) => Ok(column.with_reference(table, referenced)),
            (None, None) => Ok(column),
            _ => Err(format!(
                "column '{}' must carry both foreign_table and foreign_column or neither",
                column.name
            )),
        }
    }
}

/// A table of an extracted schema with its columns in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableDescriptor {
    name: String,
    columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Creates a table descriptor.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Table name, unique within the snapshot.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in the order reported by the catalog.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Result of one extraction call: every table of the target schema in
/// enumeration order.
///
/// Serializes as a bare JSON array of tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaSnapshot {
    tables: Vec<TableDescriptor>,
}

impl SchemaSnapshot {
    /// Creates a snapshot from already-assembled tables.
    pub fn new(tables: Vec<TableDescriptor>) -> Self {
        Self { tables }
    }

    /// Tables in enumeration order.
    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the schema had no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of columns across all tables.
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    /// Consumes the snapshot, returning its tables.
    pub fn into_tables(self) -> Vec<TableDescriptor> {
        self.tables
    }
}

impl IntoIterator for SchemaSnapshot {
    type Item = TableDescriptor;
    type IntoIter = std::vec::IntoIter<TableDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

impl<'a> IntoIterator for &'a SchemaSnapshot {
    type Item = &'a TableDescriptor;
    type IntoIter = std::slice::Iter<'a, TableDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

/// Column metadata as reported by an inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Type string as the catalog reports it
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates column metadata.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Foreign-key constraint as reported by an inspector.
///
/// `constrained_columns[i]` references `referred_columns[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    /// Constraint name, if the database names constraints
    pub name: Option<String>,
    /// Local columns in key order
    pub constrained_columns: Vec<String>,
    /// Schema of the referenced table when it differs from the inspected one
    pub referred_schema: Option<String>,
    /// Referenced table
    pub referred_table: String,
    /// Referenced columns, paired by position with `constrained_columns`
    pub referred_columns: Vec<String>,
}

impl ForeignKeyConstraint {
    /// Creates an unnamed constraint in the inspected schema.
    pub fn new(
        constrained_columns: Vec<String>,
        referred_table: impl Into<String>,
        referred_columns: Vec<String>,
    ) -> Self {
        Self {
            name: None,
            constrained_columns,
            referred_schema: None,
            referred_table: referred_table.into(),
            referred_columns,
        }
    }

    /// Builder method to set the constraint name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether `column` is one of the constrained (local) columns.
    pub fn constrains(&self, column: &str) -> bool {
        self.constrained_columns.iter().any(|c| c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_table() -> TableDescriptor {
        TableDescriptor::new(
            "users",
            vec![
                ColumnDescriptor::new("id", "INTEGER"),
                ColumnDescriptor::new("name", "TEXT"),
            ],
        )
    }

    #[test]
    fn test_column_reference_is_paired() {
        let column = ColumnDescriptor::new("user_id", "INTEGER");
        assert_eq!(column.foreign_table(), None);
        assert_eq!(column.foreign_column(), None);
        assert_eq!(column.foreign_reference(), None);

        let column = column.with_reference("users", "id");
        assert_eq!(column.foreign_reference(), Some(("users", "id")));
    }

    #[test]
    fn test_snapshot_serializes_as_array() {
        let snapshot = SchemaSnapshot::new(vec![users_table()]);
        let json = serde_json::to_value(&snapshot).expect("serialize snapshot");

        assert_eq!(
            json,
            serde_json::json!([
                {
                    "name": "users",
                    "columns": [
                        {"name": "id", "data_type": "INTEGER", "foreign_table": null, "foreign_column": null},
                        {"name": "name", "data_type": "TEXT", "foreign_table": null, "foreign_column": null}
                    ]
                }
            ])
        );
    }

    #[test]
    fn test_deserialize_rejects_half_reference() {
        let json = r#"[{"name": "orders", "columns": [
            {"name": "user_id", "data_type": "INTEGER", "foreign_table": "users", "foreign_column": null}
        ]}]"#;
        let error = serde_json::from_str::<SchemaSnapshot>(json).expect_err("half reference");
        assert!(error.to_string().contains("user_id"));
    }

    #[test]
    fn test_deserialize_full_snapshot() {
        let json = r#"[{"name": "orders", "columns": [
            {"name": "id", "data_type": "INTEGER"},
            {"name": "user_id", "data_type": "INTEGER", "foreign_table": "users", "foreign_column": "id"}
        ]}]"#;
        let snapshot: SchemaSnapshot = serde_json::from_str(json).expect("valid snapshot");

        let orders = snapshot.table("orders").expect("orders table");
        assert_eq!(orders.columns().len(), 2);
        assert_eq!(
            orders.column("user_id").and_then(ColumnDescriptor::foreign_reference),
            Some(("users", "id"))
        );
        assert_eq!(orders.column("id").and_then(ColumnDescriptor::foreign_table), None);
    }

    #[test]
    fn test_snapshot_accessors() {
        let snapshot = SchemaSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.column_count(), 0);

        let snapshot = SchemaSnapshot::new(vec![users_table()]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.column_count(), 2);
        assert!(snapshot.table("missing").is_none());
        let names: Vec<String> = snapshot.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["users".to_string()]);
    }

    #[test]
    fn test_foreign_key_constrains() {
        let fk = ForeignKeyConstraint::new(
            vec!["a".to_string(), "b".to_string()],
            "parent",
            vec!["x".to_string(), "y".to_string()],
        )
        .with_name("fk_parent");

        assert!(fk.constrains("a"));
        assert!(fk.constrains("b"));
        assert!(!fk.constrains("x"));
        assert_eq!(fk.name.as_deref(), Some("fk_parent"));
    }
}
