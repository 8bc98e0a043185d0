//! Warehouse catalog adapters
//!
//! Read-only access to warehouse metadata: table listings and column
//! schemas for a dataset. Nothing here ever mutates the warehouse.
//!
//! ## Features
//!
//! - `bigquery` - Google BigQuery support via `gcp-bigquery-client`
//!
//! ## Example
//!
//! ```rust,ignore
//! use sourcegen_catalog::{BigQueryCatalog, DatasetRef, WarehouseCatalog};
//! use sourcegen_core::TableFilter;
//!
//! let catalog = BigQueryCatalog::with_adc("my-project").await?;
//! let dataset = DatasetRef::new("my-project", "analytics");
//! let fetched = catalog.fetch_dataset(&dataset, &TableFilter::new()).await?;
//! ```

pub mod adapter;
pub mod bigquery;
pub mod mock;

pub use adapter::{DatasetRef, FetchError, WarehouseCatalog};
pub use bigquery::BigQueryCatalog;
pub use mock::{MockCatalog, MockCatalogBuilder};
