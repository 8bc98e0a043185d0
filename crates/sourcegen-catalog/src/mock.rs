//! Mock catalog for testing
//!
//! Returns predefined dataset metadata without connecting to any
//! warehouse. Useful for:
//! - Unit testing merge logic
//! - Integration testing the sync pipeline in CI
//! - Simulating error conditions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sourcegen_catalog::{DatasetRef, MockCatalog, WarehouseCatalog};
//! use sourcegen_core::{Column, Table};
//!
//! let catalog = MockCatalog::new();
//! let dataset = DatasetRef::new("project", "analytics");
//! catalog.add_table(
//!     &dataset,
//!     Table::new("users").with_columns(vec![Column::new("id", "INT64")]),
//! ).await;
//! ```

use crate::adapter::{DatasetRef, FetchError, WarehouseCatalog};
use sourcegen_core::{Column, Table};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock warehouse catalog
///
/// Stores tables in memory keyed by fully qualified name. Listings come
/// back in name order, matching the BigQuery adapter. Thread-safe;
/// clones share state.
pub struct MockCatalog {
    /// Predefined tables by table FQN (BTreeMap keeps name order)
    tables: Arc<RwLock<BTreeMap<String, Table>>>,

    /// Errors to return for specific table FQNs
    errors: Arc<RwLock<HashMap<String, FetchError>>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,
}

impl MockCatalog {
    /// Create a new mock catalog with no tables
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(BTreeMap::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            fail_connection: false,
            latency_ms: 0,
        }
    }

    /// Add a table (with its columns) to a dataset
    pub async fn add_table(&self, dataset: &DatasetRef, table: Table) {
        let fqn = dataset.table_fqn(&table.table_id);
        self.tables.write().await.insert(fqn, table);
    }

    /// Configure an error to be returned when fetching a table's columns
    pub async fn add_error_for_table(
        &self,
        dataset: &DatasetRef,
        table_id: &str,
        error: FetchError,
    ) {
        let fqn = dataset.table_fqn(table_id);
        self.errors.write().await.insert(fqn, error);
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure simulated latency for all operations
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Number of stored tables across all datasets
    pub async fn table_count(&self) -> usize {
        self.tables.read().await.len()
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockCatalog {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            errors: Arc::clone(&self.errors),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
        }
    }
}

#[async_trait::async_trait]
impl WarehouseCatalog for MockCatalog {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn list_tables(&self, dataset: &DatasetRef) -> Result<Vec<Table>, FetchError> {
        self.simulate_latency().await;

        let prefix = format!("{}.", dataset.fqn());
        let tables = self.tables.read().await;

        // Listings carry name and description only, like the real adapter
        let listed = tables
            .iter()
            .filter(|(fqn, _)| fqn.starts_with(&prefix))
            .map(|(_, table)| {
                let mut entry = Table::new(&table.table_id);
                entry.description = table.description.clone();
                entry
            })
            .collect();

        Ok(listed)
    }

    async fn fetch_columns(
        &self,
        dataset: &DatasetRef,
        table_id: &str,
    ) -> Result<Vec<Column>, FetchError> {
        self.simulate_latency().await;

        let fqn = dataset.table_fqn(table_id);

        if let Some(error) = self.errors.read().await.get(&fqn) {
            return Err(error.clone());
        }

        let tables = self.tables.read().await;
        tables
            .get(&fqn)
            .map(|t| t.columns.clone())
            .ok_or_else(|| FetchError::TableNotFound(fqn))
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        self.simulate_latency().await;

        if self.fail_connection {
            Err(FetchError::NetworkError(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Builder for creating a MockCatalog with predefined tables
///
/// ```rust,ignore
/// let catalog = MockCatalogBuilder::new("project", "analytics")
///     .with_table(Table::new("users").with_columns(vec![
///         Column::new("id", "INT64"),
///     ]))
///     .build();
/// ```
pub struct MockCatalogBuilder {
    dataset: DatasetRef,
    tables: BTreeMap<String, Table>,
    fail_connection: bool,
    latency_ms: u64,
}

impl MockCatalogBuilder {
    /// Create a builder targeting one dataset
    pub fn new(project: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            dataset: DatasetRef::new(project, dataset),
            tables: BTreeMap::new(),
            fail_connection: false,
            latency_ms: 0,
        }
    }

    /// Add a table to the dataset
    pub fn with_table(mut self, table: Table) -> Self {
        let fqn = self.dataset.table_fqn(&table.table_id);
        self.tables.insert(fqn, table);
        self
    }

    /// Configure connection failure
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure latency
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Build the MockCatalog
    pub fn build(self) -> MockCatalog {
        MockCatalog {
            tables: Arc::new(RwLock::new(self.tables)),
            errors: Arc::new(RwLock::new(HashMap::new())),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
        }
    }
}
