//! Helper utilities shared by the dialect inspectors.

use crate::models::ForeignKeyConstraint;
use crate::{Result, error::IntrospectError};
use sqlx::Row;

/// Extension trait for extracting typed values from catalog rows
/// with consistent error handling.
///
/// # Example
/// ```rust,ignore
/// use crate::adapters::helpers::RowExt;
///
/// let name: String = row.get_field("column_name", Some("my_table"))?;
/// ```
pub(crate) trait RowExt: Row {
    /// Extracts a typed field from the row with proper error context.
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, Self::Database> + sqlx::Type<Self::Database>;
}

impl<R> RowExt for R
where
    R: Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
{
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, Self::Database> + sqlx::Type<Self::Database>,
    {
        self.try_get(field_name)
            .map_err(|e| IntrospectError::parse_field(field_name, table_context, e))
    }
}

/// One row of a foreign-key catalog query: a single constrained column and
/// the column it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ForeignKeyRow {
    /// Groups rows of the same constraint
    pub(crate) key: String,
    pub(crate) name: Option<String>,
    pub(crate) constrained_column: String,
    pub(crate) referred_schema: Option<String>,
    pub(crate) referred_table: String,
    /// `None` when the catalog leaves the referenced column implicit
    pub(crate) referred_column: Option<String>,
}

/// Folds consecutive rows sharing a key into constraints.
///
/// Rows must arrive ordered by key, then by position within the key; the
/// constraint order and the column pairing follow the row order.
pub(crate) fn group_foreign_key_rows(
    rows: impl IntoIterator<Item = ForeignKeyRow>,
) -> Vec<ForeignKeyConstraint> {
    let mut constraints: Vec<ForeignKeyConstraint> = Vec::new();
    let mut current_key: Option<String> = None;

    for row in rows {
        if current_key.as_deref() == Some(row.key.as_str())
            && let Some(constraint) = constraints.last_mut()
        {
            constraint.constrained_columns.push(row.constrained_column);
            constraint.referred_columns.extend(row.referred_column);
            continue;
        }

        constraints.push(ForeignKeyConstraint {
            name: row.name,
            constrained_columns: vec![row.constrained_column],
            referred_schema: row.referred_schema,
            referred_table: row.referred_table,
            referred_columns: row.referred_column.into_iter().collect(),
        });
        current_key = Some(row.key);
    }

    constraints
}

/// Quotes an identifier for interpolation into catalog SQL.
#[cfg(feature = "sqlite")]
pub(crate) fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
