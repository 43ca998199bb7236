//! Schema extraction over a driver-provided inspector.
//!
//! [`SchemaExtractor`] owns a [`ConnectionConfig`] and runs one extraction
//! per call: build the connection target, open a fresh connection, walk the
//! catalog, release the connection and hand the snapshot to the caller.
//!
//! # Lifecycle
//! Idle → Connecting → Connected → Introspecting → Disposing → Idle. A
//! failure after the connection is open still passes through Disposing, so
//! every opened connection is closed before the call returns.

use crate::Result;
use crate::adapters::{ConnectionConfig, ConnectionTarget, Driver, Inspector, SqlxDriver};
use crate::models::{
    ColumnDescriptor, ColumnInfo, ForeignKeyConstraint, SchemaSnapshot, TableDescriptor,
};
use std::collections::HashMap;
use std::time::Instant;

/// Extracts table, column and foreign-key metadata from one database.
///
/// # Example
/// ```rust,no_run
/// use dbintrospect_core::{ConnectionConfig, SchemaExtractor};
///
/// # async fn example() -> dbintrospect_core::Result<()> {
/// let extractor = SchemaExtractor::new(ConnectionConfig::sqlite("test.db"));
/// let snapshot = extractor.extract().await?;
/// for table in &snapshot {
///     println!("{} ({} columns)", table.name(), table.columns().len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SchemaExtractor<D: Driver = SqlxDriver> {
    config: ConnectionConfig,
    driver: D,
}

impl SchemaExtractor<SqlxDriver> {
    /// Creates an extractor using the compiled-in `sqlx` drivers.
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_driver(config, SqlxDriver)
    }
}

impl<D: Driver> SchemaExtractor<D> {
    /// Creates an extractor over a custom driver.
    pub fn with_driver(config: ConnectionConfig, driver: D) -> Self {
        Self { config, driver }
    }

    /// Configuration supplied at construction.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Extracts a snapshot of the configured schema.
    ///
    /// Each call opens its own connection, so repeated calls observe the
    /// database as it is at that moment.
    ///
    /// # Errors
    /// - `UnsupportedDialect` or `Configuration` before any I/O
    /// - `Connection` if the connection cannot be opened
    /// - `SchemaNotFound` if the requested schema does not exist
    /// - `Introspection` if a catalog query fails
    pub async fn extract(&self) -> Result<SchemaSnapshot> {
        let target = ConnectionTarget::from_config(&self.config)?;
        let start_time = Instant::now();
        tracing::info!("Starting schema extraction from {}", target);

        let mut inspector = self.open(&target).await?;

        tracing::debug!("Introspecting {}", target);
        let result = extract_schema(inspector.as_mut(), self.config.schema()).await;
        if let Err(e) = &result {
            tracing::error!("Schema extraction failed: {}", e);
        }

        let snapshot = release(inspector, result).await?;
        tracing::info!(
            "Extracted {} tables ({} columns) in {:.2}s",
            snapshot.len(),
            snapshot.column_count(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(snapshot)
    }

    /// Opens a connection, pings the server and releases the connection.
    ///
    /// # Errors
    /// Same configuration and connection errors as [`Self::extract`].
    pub async fn test_connection(&self) -> Result<()> {
        let target = ConnectionTarget::from_config(&self.config)?;
        let mut inspector = self.open(&target).await?;

        let result = inspector.ping().await;
        match &result {
            Ok(()) => tracing::info!("Connection to {} succeeded", target),
            Err(e) => tracing::error!("Connection check failed: {}", e),
        }

        release(inspector, result).await
    }

    async fn open(&self, target: &ConnectionTarget) -> Result<Box<dyn Inspector>> {
        tracing::debug!("Connecting to {}", target);
        let inspector = self.driver.connect(target).await.inspect_err(|e| {
            tracing::error!("Failed to connect: {}", e);
        })?;
        tracing::debug!("Connected ({})", inspector.dialect());
        Ok(inspector)
    }
}

/// Closes the inspector and passes `result` through.
///
/// A close failure never replaces the outcome of the work done on the
/// connection: it is logged and the original result is returned.
async fn release<T>(inspector: Box<dyn Inspector>, result: Result<T>) -> Result<T> {
    tracing::debug!("Disposing connection");
    if let Err(e) = inspector.close().await {
        tracing::warn!("Failed to close database connection: {}", e);
    }
    tracing::debug!(
        "Connection released ({})",
        if result.is_ok() { "idle" } else { "failed" }
    );
    result
}

/// Walks the catalog of `schema` (or the connection's default schema) and
/// assembles a snapshot.
///
/// Tables appear in the order the inspector reports them. If a name is
/// reported twice, the later column list replaces the earlier one and the
/// table keeps its first position.
///
/// # Errors
/// Propagates the first inspector error; no partial snapshot is returned.
pub async fn extract_schema(
    inspector: &mut dyn Inspector,
    schema: Option<&str>,
) -> Result<SchemaSnapshot> {
    let schema = inspector.resolve_schema(schema).await?;
    let table_names = inspector.table_names(&schema).await?;
    tracing::debug!(
        "Found {} tables in schema '{}'",
        table_names.len(),
        schema
    );

    let mut tables: Vec<TableDescriptor> = Vec::with_capacity(table_names.len());
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(table_names.len());

    for table_name in table_names {
        let columns = inspector.columns(&schema, &table_name).await?;
        let foreign_keys = inspector.foreign_keys(&schema, &table_name).await?;
        tracing::debug!(
            "Table '{}': {} columns, {} foreign keys",
            table_name,
            columns.len(),
            foreign_keys.len()
        );

        let columns = columns
            .into_iter()
            .map(|column| describe_column(column, &foreign_keys))
            .collect();
        let table = TableDescriptor::new(table_name.clone(), columns);

        match positions.get(&table_name) {
            Some(&position) => {
                tracing::warn!("Table '{}' reported twice; keeping the later one", table_name);
                tables[position] = table;
            }
            None => {
                positions.insert(table_name, tables.len());
                tables.push(table);
            }
        }
    }

    Ok(SchemaSnapshot::new(tables))
}

/// Finds the `(table, column)` a column references.
///
/// The first constraint that lists `column` among its constrained columns
/// wins, and its first referred column is reported even for composite keys.
/// Constraints without referred columns are skipped.
pub fn resolve_foreign_reference<'a>(
    column: &str,
    constraints: &'a [ForeignKeyConstraint],
) -> Option<(&'a str, &'a str)> {
    constraints
        .iter()
        .filter(|fk| fk.constrains(column))
        .find_map(|fk| {
            fk.referred_columns
                .first()
                .map(|referred| (fk.referred_table.as_str(), referred.as_str()))
        })
}

fn describe_column(column: ColumnInfo, constraints: &[ForeignKeyConstraint]) -> ColumnDescriptor {
    let reference = resolve_foreign_reference(&column.name, constraints);
    let descriptor = ColumnDescriptor::new(column.name, column.data_type);
    match reference {
        Some((table, referred)) => descriptor.with_reference(table, referred),
        None => descriptor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Dialect;
    use crate::error::IntrospectError;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Phase at which the fake database fails.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum FailAt {
        Connect,
        ResolveSchema,
        TableNames,
        Columns,
        ForeignKeys,
        Close,
    }

    #[derive(Debug, Clone)]
    struct FakeTable {
        name: String,
        columns: Vec<ColumnInfo>,
        foreign_keys: Vec<ForeignKeyConstraint>,
    }

    fn table(name: &str, columns: &[(&str, &str)]) -> FakeTable {
        FakeTable {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|(name, data_type)| ColumnInfo::new(*name, *data_type))
                .collect(),
            foreign_keys: Vec::new(),
        }
    }

    fn fk(constrained: &[&str], referred_table: &str, referred: &[&str]) -> ForeignKeyConstraint {
        ForeignKeyConstraint::new(
            constrained.iter().map(|c| c.to_string()).collect(),
            referred_table,
            referred.iter().map(|c| c.to_string()).collect(),
        )
    }

    impl FakeTable {
        fn with_fk(mut self, constraint: ForeignKeyConstraint) -> Self {
            self.foreign_keys.push(constraint);
            self
        }
    }

    /// Driver that records how many connections were opened and closed.
    #[derive(Debug, Clone, Default)]
    struct RecordingDriver {
        tables: Vec<FakeTable>,
        fail_at: Option<FailAt>,
        opened: Arc<AtomicUsize>,
        closed: Arc<AtomicUsize>,
    }

    impl RecordingDriver {
        fn new(tables: Vec<FakeTable>) -> Self {
            Self {
                tables,
                ..Default::default()
            }
        }

        fn failing_at(mut self, phase: FailAt) -> Self {
            self.fail_at = Some(phase);
            self
        }

        fn opened(&self) -> usize {
            self.opened.load(Ordering::SeqCst)
        }

        fn closed(&self) -> usize {
            self.closed.load(Ordering::SeqCst)
        }
    }

    struct FakeInspector {
        tables: Vec<FakeTable>,
        fail_at: Option<FailAt>,
        closed: Arc<AtomicUsize>,
    }

    impl FakeInspector {
        fn check(&self, phase: FailAt) -> Result<()> {
            if self.fail_at == Some(phase) {
                return Err(IntrospectError::introspection_failed(
                    format!("{:?} failed", phase),
                    std::io::Error::other("simulated failure"),
                ));
            }
            Ok(())
        }

        fn find(&self, table: &str) -> Option<&FakeTable> {
            self.tables.iter().rev().find(|t| t.name == table)
        }
    }

    #[async_trait]
    impl Inspector for FakeInspector {
        fn dialect(&self) -> Dialect {
            Dialect::Sqlite
        }

        async fn ping(&mut self) -> Result<()> {
            Ok(())
        }

        async fn resolve_schema(&mut self, schema: Option<&str>) -> Result<String> {
            self.check(FailAt::ResolveSchema)?;
            match schema {
                None | Some("main") => Ok("main".to_string()),
                Some(other) => Err(IntrospectError::schema_not_found(other)),
            }
        }

        async fn table_names(&mut self, _schema: &str) -> Result<Vec<String>> {
            self.check(FailAt::TableNames)?;
            Ok(self.tables.iter().map(|t| t.name.clone()).collect())
        }

        async fn columns(&mut self, _schema: &str, table: &str) -> Result<Vec<ColumnInfo>> {
            self.check(FailAt::Columns)?;
            Ok(self.find(table).map(|t| t.columns.clone()).unwrap_or_default())
        }

        async fn foreign_keys(
            &mut self,
            _schema: &str,
            table: &str,
        ) -> Result<Vec<ForeignKeyConstraint>> {
            self.check(FailAt::ForeignKeys)?;
            Ok(self
                .find(table)
                .map(|t| t.foreign_keys.clone())
                .unwrap_or_default())
        }

        async fn close(self: Box<Self>) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            self.check(FailAt::Close)
        }
    }

    #[async_trait]
    impl Driver for RecordingDriver {
        async fn connect(&self, _target: &ConnectionTarget) -> Result<Box<dyn Inspector>> {
            if self.fail_at == Some(FailAt::Connect) {
                return Err(IntrospectError::connection_failed(
                    "Failed to open database",
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                ));
            }
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeInspector {
                tables: self.tables.clone(),
                fail_at: self.fail_at,
                closed: Arc::clone(&self.closed),
            }))
        }
    }

    fn extractor(driver: RecordingDriver) -> SchemaExtractor<RecordingDriver> {
        SchemaExtractor::with_driver(ConnectionConfig::sqlite("test.db"), driver)
    }

    fn shop() -> Vec<FakeTable> {
        vec![
            table("users", &[("id", "INTEGER"), ("name", "TEXT")]),
            table(
                "orders",
                &[("id", "INTEGER"), ("user_id", "INTEGER"), ("total", "NUMERIC")],
            )
            .with_fk(fk(&["user_id"], "users", &["id"])),
        ]
    }

    // =========================================================================
    // Foreign reference resolution
    // =========================================================================

    #[test]
    fn test_resolve_single_column_reference() {
        let constraints = vec![fk(&["user_id"], "users", &["id"])];
        assert_eq!(
            resolve_foreign_reference("user_id", &constraints),
            Some(("users", "id"))
        );
        assert_eq!(resolve_foreign_reference("total", &constraints), None);
    }

    #[test]
    fn test_resolve_first_matching_constraint_wins() {
        let constraints = vec![
            fk(&["account_id"], "accounts", &["id"]),
            fk(&["account_id"], "legacy_accounts", &["account_no"]),
        ];
        assert_eq!(
            resolve_foreign_reference("account_id", &constraints),
            Some(("accounts", "id"))
        );
    }

    #[test]
    fn test_resolve_composite_uses_first_referred_column() {
        let constraints = vec![fk(
            &["order_region", "order_number"],
            "orders",
            &["region", "number"],
        )];
        // Both local columns report the first referred column
        assert_eq!(
            resolve_foreign_reference("order_region", &constraints),
            Some(("orders", "region"))
        );
        assert_eq!(
            resolve_foreign_reference("order_number", &constraints),
            Some(("orders", "region"))
        );
    }

    #[test]
    fn test_resolve_skips_constraint_without_referred_columns() {
        let constraints = vec![
            fk(&["owner"], "people", &[]),
            fk(&["owner"], "teams", &["slug"]),
        ];
        assert_eq!(
            resolve_foreign_reference("owner", &constraints),
            Some(("teams", "slug"))
        );
        assert_eq!(
            resolve_foreign_reference("owner", &constraints[..1]),
            None
        );
    }

    // =========================================================================
    // Extraction
    // =========================================================================

    #[tokio::test]
    async fn test_extract_assembles_snapshot() {
        let driver = RecordingDriver::new(shop());
        let snapshot = extractor(driver.clone()).extract().await.expect("extract");

        let names: Vec<&str> = snapshot.tables().iter().map(TableDescriptor::name).collect();
        assert_eq!(names, vec!["users", "orders"]);

        let orders = snapshot.table("orders").expect("orders");
        let columns: Vec<&str> = orders.columns().iter().map(ColumnDescriptor::name).collect();
        assert_eq!(columns, vec!["id", "user_id", "total"]);
        assert_eq!(
            orders.column("user_id").and_then(ColumnDescriptor::foreign_reference),
            Some(("users", "id"))
        );
        assert_eq!(
            orders.column("total").and_then(ColumnDescriptor::foreign_reference),
            None
        );

        assert_eq!(driver.opened(), 1);
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn test_extract_users_scenario() {
        let driver = RecordingDriver::new(vec![table(
            "users",
            &[("id", "INTEGER"), ("name", "TEXT")],
        )]);
        let snapshot = extractor(driver).extract().await.expect("extract");

        assert_eq!(
            snapshot,
            SchemaSnapshot::new(vec![TableDescriptor::new(
                "users",
                vec![
                    ColumnDescriptor::new("id", "INTEGER"),
                    ColumnDescriptor::new("name", "TEXT"),
                ],
            )])
        );
    }

    #[tokio::test]
    async fn test_extract_empty_database() {
        let driver = RecordingDriver::new(Vec::new());
        let snapshot = extractor(driver.clone()).extract().await.expect("extract");

        assert!(snapshot.is_empty());
        assert_eq!(driver.opened(), driver.closed());
    }

    #[tokio::test]
    async fn test_extract_is_repeatable() {
        let driver = RecordingDriver::new(shop());
        let extractor = extractor(driver.clone());

        let first = extractor.extract().await.expect("first extract");
        let second = extractor.extract().await.expect("second extract");

        assert_eq!(first, second);
        assert_eq!(driver.opened(), 2);
        assert_eq!(driver.closed(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_table_keeps_position_and_later_columns() {
        let driver = RecordingDriver::new(vec![
            table("events", &[("id", "INTEGER")]),
            table("users", &[("id", "INTEGER")]),
            table("events", &[("id", "BIGINT"), ("kind", "TEXT")]),
        ]);
        let snapshot = extractor(driver).extract().await.expect("extract");

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.tables()[0].name(), "events");
        assert_eq!(snapshot.tables()[1].name(), "users");
        let events = &snapshot.tables()[0];
        assert_eq!(events.columns().len(), 2);
        assert_eq!(events.columns()[0].data_type(), "BIGINT");
    }

    #[tokio::test]
    async fn test_extract_missing_schema() {
        let driver = RecordingDriver::new(shop());
        let config = ConnectionConfig::sqlite("test.db").with_schema("analytics");
        let extractor = SchemaExtractor::with_driver(config, driver.clone());

        let result = extractor.extract().await;
        assert!(matches!(
            result,
            Err(IntrospectError::SchemaNotFound { ref schema }) if schema == "analytics"
        ));
        assert_eq!(driver.opened(), 1);
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_dialect_opens_nothing() {
        let driver = RecordingDriver::new(shop());
        let extractor = SchemaExtractor::with_driver(ConnectionConfig::new("oracle"), driver.clone());

        let result = extractor.extract().await;
        assert!(matches!(
            result,
            Err(IntrospectError::UnsupportedDialect { .. })
        ));
        assert_eq!(driver.opened(), 0);
        assert_eq!(driver.closed(), 0);
    }

    // =========================================================================
    // Connection release
    // =========================================================================

    #[tokio::test]
    async fn test_connection_released_on_every_failure() {
        for phase in [
            FailAt::ResolveSchema,
            FailAt::TableNames,
            FailAt::Columns,
            FailAt::ForeignKeys,
        ] {
            let driver = RecordingDriver::new(shop()).failing_at(phase);
            let result = extractor(driver.clone()).extract().await;

            assert!(
                matches!(result, Err(IntrospectError::Introspection { .. })),
                "{:?} should fail with an introspection error",
                phase
            );
            assert_eq!(driver.opened(), 1, "{:?}", phase);
            assert_eq!(driver.closed(), 1, "{:?}", phase);
        }
    }

    #[tokio::test]
    async fn test_connect_failure_is_connection_error() {
        let driver = RecordingDriver::new(shop()).failing_at(FailAt::Connect);
        let result = extractor(driver.clone()).extract().await;

        assert!(matches!(result, Err(IntrospectError::Connection { .. })));
        assert_eq!(driver.opened(), 0);
        assert_eq!(driver.closed(), 0);
    }

    #[tokio::test]
    async fn test_close_failure_keeps_snapshot() {
        let driver = RecordingDriver::new(shop()).failing_at(FailAt::Close);
        let snapshot = extractor(driver.clone()).extract().await.expect("extract");

        assert_eq!(snapshot.len(), 2);
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn test_connection_check_releases_connection() {
        let driver = RecordingDriver::new(Vec::new());
        extractor(driver.clone())
            .test_connection()
            .await
            .expect("connection check");

        assert_eq!(driver.opened(), 1);
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn test_extract_schema_over_inspector() {
        let mut inspector = FakeInspector {
            tables: shop(),
            fail_at: None,
            closed: Arc::new(AtomicUsize::new(0)),
        };

        let snapshot = extract_schema(&mut inspector, Some("main"))
            .await
            .expect("extract");
        assert_eq!(snapshot.column_count(), 5);
    }
}
