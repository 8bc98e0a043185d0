//! Warehouse catalog trait for fetching dataset metadata

use sourcegen_core::{Column, Dataset, Table, TableFilter};
use std::fmt;

/// Identifies a dataset in a warehouse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    /// Database / cloud project name
    pub project: String,

    /// Schema / dataset name
    pub dataset: String,
}

impl DatasetRef {
    /// Create a new dataset reference
    pub fn new(project: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
        }
    }

    /// Get the fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}", self.project, self.dataset)
    }

    /// Fully qualified name of a table in this dataset
    pub fn table_fqn(&self, table_id: &str) -> String {
        format!("{}.{}.{}", self.project, self.dataset, table_id)
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// Errors that can occur when fetching catalog metadata
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Trait for warehouse catalogs that expose dataset metadata
///
/// Implementations query the warehouse's catalog views; they never read
/// table data and never mutate anything.
#[async_trait::async_trait]
pub trait WarehouseCatalog: Send + Sync {
    /// Get the catalog name (e.g. "BigQuery")
    fn name(&self) -> &'static str;

    /// List the tables of a dataset, in name order, without columns
    ///
    /// Returned tables carry their name and description only; columns
    /// come from `fetch_columns`.
    async fn list_tables(&self, dataset: &DatasetRef) -> Result<Vec<Table>, FetchError>;

    /// Fetch the columns of one table, in catalog (ordinal) order
    async fn fetch_columns(
        &self,
        dataset: &DatasetRef,
        table_id: &str,
    ) -> Result<Vec<Column>, FetchError>;

    /// Test the connection to the warehouse
    ///
    /// Useful for validating credentials before a sync run.
    async fn test_connection(&self) -> Result<(), FetchError>;

    /// Fetch a filtered dataset: listing plus columns per kept table
    async fn fetch_dataset(
        &self,
        dataset: &DatasetRef,
        filter: &TableFilter,
    ) -> Result<Dataset, FetchError> {
        let mut tables = Vec::new();

        for mut table in self.list_tables(dataset).await? {
            if !filter.matches(&table.table_id) {
                tracing::debug!(table = %table.table_id, "skipped by filter");
                continue;
            }

            table.columns = self.fetch_columns(dataset, &table.table_id).await?;
            tables.push(table);
        }

        tracing::info!(
            dataset = %dataset,
            tables = tables.len(),
            "fetched dataset metadata"
        );

        Ok(Dataset::new(&dataset.project, &dataset.dataset).with_tables(tables))
    }
}
