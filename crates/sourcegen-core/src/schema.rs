//! Warehouse-side table and column metadata
//!
//! Types are kept as the warehouse reports them (e.g. `INT64`,
//! `ARRAY<STRING>`) because the generated YAML stores warehouse-native
//! type strings.

use serde::{Deserialize, Serialize};

/// A column as reported by the warehouse catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Warehouse-native data type string
    pub data_type: String,

    /// Column description from the catalog, if any
    pub description: Option<String>,
}

impl Column {
    /// Create a new column with no description
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            description: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A table as reported by the warehouse catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name within its dataset
    pub table_id: String,

    /// Table description from the catalog, if any
    pub description: Option<String>,

    /// Ordered columns, in catalog (ordinal) order
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a new table with no columns
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            description: None,
            columns: Vec::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the columns
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get column names in catalog order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// A dataset (schema) and its tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Cloud project holding the dataset
    pub project_id: String,

    /// Dataset name
    pub dataset_id: String,

    /// Ordered tables
    pub tables: Vec<Table>,
}

impl Dataset {
    /// Create a new empty dataset
    pub fn new(project_id: impl Into<String>, dataset_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            tables: Vec::new(),
        }
    }

    /// Set the tables
    pub fn with_tables(mut self, tables: Vec<Table>) -> Self {
        self.tables = tables;
        self
    }

    /// Find a table by name
    pub fn find_table(&self, table_id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.table_id == table_id)
    }

    /// True if the dataset holds no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
