//! Test fixtures for sync pipeline integration tests
//!
//! Reusable warehouse datasets and authored YAML documents that
//! represent common shapes found in real dbt projects.

use sourcegen_catalog::{DatasetRef, MockCatalog, MockCatalogBuilder};
use sourcegen_core::{Column, Table};

/// The dataset every fixture targets
pub fn dataset_ref() -> DatasetRef {
    DatasetRef::new("acme-dwh", "shop")
}

/// A typical e-commerce dataset with three tables
pub fn shop_catalog() -> MockCatalog {
    MockCatalogBuilder::new("acme-dwh", "shop")
        .with_table(
            Table::new("orders")
                .with_description("Orders placed by customers")
                .with_columns(vec![
                    Column::new("id", "INT64").with_description("Order id"),
                    Column::new("customer_id", "INT64"),
                    Column::new("total_amount", "NUMERIC(10, 2)"),
                    Column::new("status", "STRING"),
                    Column::new("created_at", "TIMESTAMP"),
                ]),
        )
        .with_table(
            Table::new("customers").with_columns(vec![
                Column::new("id", "INT64"),
                Column::new("email", "STRING").with_description("Contact email"),
                Column::new("name", "STRING"),
            ]),
        )
        .with_table(
            Table::new("events_tmp").with_columns(vec![Column::new("payload", "JSON")]),
        )
        .build()
}

/// An authored source file with user annotations the sync must not touch
pub fn authored_yaml() -> &'static str {
    r#"
version: 2
sources:
  - name: shop
    database: acme-dwh
    schema: shop
    loader: fivetran
    freshness:
      warn_after:
        count: 24
        period: hour
    tables:
      - name: orders
        description: Curated description written by an analyst
        loaded_at_field: created_at
        tests:
          - row_count_above_zero
        columns:
          - name: id
            data_type: INT64
            description: Primary key
            tests:
              - unique
              - not_null
          - name: status
            data_type: STRING
            meta:
              accepted_values: [pending, shipped, delivered]
      - name: legacy_refunds
        description: Table dropped from the warehouse in 2024
        columns:
          - name: id
            data_type: INT64
"#
}
