//! BigQuery catalog using the dataset's INFORMATION_SCHEMA views
//!
//! Table listings come from `INFORMATION_SCHEMA.TABLES` joined with
//! `TABLE_OPTIONS` (the `description` option); column listings come from
//! `INFORMATION_SCHEMA.COLUMNS` joined with `COLUMN_FIELD_PATHS`, which
//! is the view that carries column descriptions. Requires IAM
//! permissions:
//! - bigquery.tables.get
//! - bigquery.tables.getData (for INFORMATION_SCHEMA access)
//!
//! ## Authentication
//!
//! Three methods are supported:
//! 1. Application Default Credentials (ADC)
//! 2. Service account JSON file (explicit path)
//! 3. Service account JSON content (inline)
//!
//! Reference: https://cloud.google.com/bigquery/docs/information-schema-intro

use crate::adapter::{DatasetRef, FetchError, WarehouseCatalog};
use sourcegen_core::{Column, Table};

#[cfg(feature = "bigquery")]
use gcp_bigquery_client::{model::query_request::QueryRequest, Client as BigQueryClient};

/// BigQuery warehouse catalog
pub struct BigQueryCatalog {
    /// Project billed for the metadata queries
    project_id: String,

    /// BigQuery client (only available with the bigquery feature)
    #[cfg(feature = "bigquery")]
    client: BigQueryClient,

    /// Placeholder for when the feature is disabled
    #[cfg(not(feature = "bigquery"))]
    _phantom: std::marker::PhantomData<()>,
}

impl BigQueryCatalog {
    /// Create a catalog using Application Default Credentials (ADC)
    ///
    /// ADC automatically detects credentials from:
    /// - GOOGLE_APPLICATION_CREDENTIALS environment variable
    /// - gcloud CLI default credentials
    /// - GCE/GKE metadata service
    #[cfg(feature = "bigquery")]
    pub async fn with_adc(project_id: impl Into<String>) -> Result<Self, FetchError> {
        let project_id = project_id.into();

        let client = BigQueryClient::from_application_default_credentials()
            .await
            .map_err(|e| {
                FetchError::AuthenticationError(format!(
                    "Failed to authenticate with ADC: {}. \
                     Ensure GOOGLE_APPLICATION_CREDENTIALS is set or run \
                     'gcloud auth application-default login'",
                    e
                ))
            })?;

        Ok(Self { project_id, client })
    }

    /// Create a catalog without the bigquery feature (returns an error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn with_adc(project_id: impl Into<String>) -> Result<Self, FetchError> {
        let _ = project_id;
        Err(Self::feature_disabled())
    }

    /// Create a catalog using a service account key file
    #[cfg(feature = "bigquery")]
    pub async fn from_service_account_file(
        project_id: impl Into<String>,
        key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, FetchError> {
        let project_id = project_id.into();
        let key_path_str = key_path.as_ref().to_string_lossy().to_string();

        let client = BigQueryClient::from_service_account_key_file(&key_path_str)
            .await
            .map_err(|e| {
                FetchError::AuthenticationError(format!(
                    "Failed to read service account key file '{}': {}",
                    key_path_str, e
                ))
            })?;

        Ok(Self { project_id, client })
    }

    /// Create a catalog without the bigquery feature (returns an error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn from_service_account_file(
        project_id: impl Into<String>,
        _key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, FetchError> {
        let _ = project_id;
        Err(Self::feature_disabled())
    }

    /// Create a catalog using inline service account JSON content
    #[cfg(feature = "bigquery")]
    pub async fn from_service_account_json(
        project_id: impl Into<String>,
        key_json: &str,
    ) -> Result<Self, FetchError> {
        let project_id = project_id.into();

        let sa_key: gcp_bigquery_client::yup_oauth2::ServiceAccountKey =
            serde_json::from_str(key_json).map_err(|e| {
                FetchError::ConfigError(format!("Failed to parse service account JSON: {}", e))
            })?;

        let client = BigQueryClient::from_service_account_key(sa_key, false)
            .await
            .map_err(|e| {
                FetchError::AuthenticationError(format!(
                    "Failed to authenticate with service account: {}",
                    e
                ))
            })?;

        Ok(Self { project_id, client })
    }

    /// Create a catalog without the bigquery feature (returns an error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn from_service_account_json(
        project_id: impl Into<String>,
        _key_json: &str,
    ) -> Result<Self, FetchError> {
        let _ = project_id;
        Err(Self::feature_disabled())
    }

    #[cfg(not(feature = "bigquery"))]
    fn feature_disabled() -> FetchError {
        FetchError::ConfigError(
            "BigQuery support not compiled. Rebuild with: cargo build --features bigquery"
                .to_string(),
        )
    }

    #[cfg(feature = "bigquery")]
    fn map_query_error(e: impl std::fmt::Display, dataset: &DatasetRef) -> FetchError {
        let err_str = e.to_string();
        if err_str.contains("Not found") {
            FetchError::DatasetNotFound(dataset.fqn())
        } else if err_str.contains("Access Denied") || err_str.contains("Permission") {
            FetchError::PermissionDenied(format!("Cannot access {}: {}", dataset, err_str))
        } else {
            FetchError::QueryError(err_str)
        }
    }
}

/// Strip the quoting of an INFORMATION_SCHEMA option value
///
/// `TABLE_OPTIONS.option_value` is rendered as a SQL literal, so a table
/// description arrives as `"orders placed by users"`.
fn unquote_option_value(raw: &str) -> String {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    inner.replace("\\\"", "\"").replace("\\\\", "\\")
}

#[async_trait::async_trait]
impl WarehouseCatalog for BigQueryCatalog {
    fn name(&self) -> &'static str {
        "BigQuery"
    }

    #[cfg(feature = "bigquery")]
    async fn list_tables(&self, dataset: &DatasetRef) -> Result<Vec<Table>, FetchError> {
        let query = format!(
            r#"
            SELECT
                t.table_name,
                opt.option_value AS description
            FROM `{project}.{dataset}.INFORMATION_SCHEMA.TABLES` AS t
            LEFT JOIN `{project}.{dataset}.INFORMATION_SCHEMA.TABLE_OPTIONS` AS opt
              ON opt.table_name = t.table_name AND opt.option_name = 'description'
            ORDER BY t.table_name
            "#,
            project = dataset.project,
            dataset = dataset.dataset,
        );

        let request = QueryRequest::new(query);
        let query_response = self
            .client
            .job()
            .query(&self.project_id, request)
            .await
            .map_err(|e| Self::map_query_error(e, dataset))?;

        let mut tables = Vec::new();
        let mut rs = gcp_bigquery_client::model::query_response::ResultSet::new_from_query_response(
            query_response,
        );

        while rs.next_row() {
            let table_name = rs
                .get_string_by_name("table_name")
                .map_err(|e| FetchError::InvalidResponse(format!("Failed to get table_name: {}", e)))?
                .unwrap_or_default();

            let description = rs
                .get_string_by_name("description")
                .map_err(|e| {
                    FetchError::InvalidResponse(format!("Failed to get description: {}", e))
                })?
                .map(|raw| unquote_option_value(&raw))
                .filter(|d| !d.is_empty());

            let mut table = Table::new(table_name);
            table.description = description;
            tables.push(table);
        }

        Ok(tables)
    }

    #[cfg(not(feature = "bigquery"))]
    async fn list_tables(&self, _dataset: &DatasetRef) -> Result<Vec<Table>, FetchError> {
        Err(Self::feature_disabled())
    }

    #[cfg(feature = "bigquery")]
    async fn fetch_columns(
        &self,
        dataset: &DatasetRef,
        table_id: &str,
    ) -> Result<Vec<Column>, FetchError> {
        // COLUMN_FIELD_PATHS also lists nested STRUCT members; the join on
        // field_path = column_name keeps only top-level columns.
        let query = format!(
            r#"
            SELECT
                c.column_name,
                c.data_type,
                fp.description
            FROM `{project}.{dataset}.INFORMATION_SCHEMA.COLUMNS` AS c
            LEFT JOIN `{project}.{dataset}.INFORMATION_SCHEMA.COLUMN_FIELD_PATHS` AS fp
              ON fp.table_name = c.table_name AND fp.field_path = c.column_name
            WHERE c.table_name = '{table}'
            ORDER BY c.ordinal_position
            "#,
            project = dataset.project,
            dataset = dataset.dataset,
            table = table_id,
        );

        let request = QueryRequest::new(query);
        let query_response = self
            .client
            .job()
            .query(&self.project_id, request)
            .await
            .map_err(|e| Self::map_query_error(e, dataset))?;

        let mut columns = Vec::new();
        let mut rs = gcp_bigquery_client::model::query_response::ResultSet::new_from_query_response(
            query_response,
        );

        while rs.next_row() {
            let column_name = rs
                .get_string_by_name("column_name")
                .map_err(|e| {
                    FetchError::InvalidResponse(format!("Failed to get column_name: {}", e))
                })?
                .unwrap_or_default();

            let data_type = rs
                .get_string_by_name("data_type")
                .map_err(|e| FetchError::InvalidResponse(format!("Failed to get data_type: {}", e)))?
                .unwrap_or_else(|| "STRING".to_string());

            let description = rs
                .get_string_by_name("description")
                .map_err(|e| {
                    FetchError::InvalidResponse(format!("Failed to get description: {}", e))
                })?
                .filter(|d| !d.is_empty());

            let mut column = Column::new(column_name, data_type);
            column.description = description;
            columns.push(column);
        }

        if columns.is_empty() {
            return Err(FetchError::TableNotFound(format!(
                "Table {} not found or has no columns",
                dataset.table_fqn(table_id)
            )));
        }

        Ok(columns)
    }

    #[cfg(not(feature = "bigquery"))]
    async fn fetch_columns(
        &self,
        _dataset: &DatasetRef,
        _table_id: &str,
    ) -> Result<Vec<Column>, FetchError> {
        Err(Self::feature_disabled())
    }

    #[cfg(feature = "bigquery")]
    async fn test_connection(&self) -> Result<(), FetchError> {
        let request = QueryRequest::new("SELECT 1".to_string());

        self.client
            .job()
            .query(&self.project_id, request)
            .await
            .map_err(|e| FetchError::QueryError(format!("Connection test failed: {}", e)))?;

        Ok(())
    }

    #[cfg(not(feature = "bigquery"))]
    async fn test_connection(&self) -> Result<(), FetchError> {
        Err(Self::feature_disabled())
    }
}
