//! Typed model of a dbt `sources:` YAML document
//!
//! Every struct carries a flattened `extra` map so that keys this tool
//! does not manage (`freshness`, `loader`, `tags`, `loaded_at_field`,
//! `quoting`, ...) survive a read/merge/write cycle untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_version() -> u32 {
    2
}

/// Empty or missing descriptions are not emitted
fn skip_if_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// A column entry under a source table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceColumn {
    /// Column name
    pub name: String,

    /// Warehouse-native data type string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    /// Column description
    #[serde(default, skip_serializing_if = "skip_if_blank")]
    pub description: Option<String>,

    /// Free-form meta block, retained verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_yaml::Value>,

    /// dbt tests, retained verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<serde_yaml::Value>,

    /// Any other keys, retained verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl SourceColumn {
    /// Create a bare column entry
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A table entry under a source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    /// Table name as referenced from dbt models
    pub name: String,

    /// Physical table name, when it differs from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Table description
    #[serde(default, skip_serializing_if = "skip_if_blank")]
    pub description: Option<String>,

    /// Free-form meta block, retained verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_yaml::Value>,

    /// dbt tests, retained verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<serde_yaml::Value>,

    /// Any other keys, retained verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,

    /// Column entries, in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<SourceColumn>,
}

impl SourceTable {
    /// Create a bare table entry
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Find a column entry by name
    pub fn find_column(&self, name: &str) -> Option<&SourceColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A source section: one dataset's worth of tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Source name as referenced from dbt models
    pub name: String,

    /// Database / cloud project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Schema / dataset name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Source description
    #[serde(default, skip_serializing_if = "skip_if_blank")]
    pub description: Option<String>,

    /// Free-form meta block, retained verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_yaml::Value>,

    /// Any other keys, retained verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,

    /// Table entries, in document order
    #[serde(default)]
    pub tables: Vec<SourceTable>,
}

impl Source {
    /// Create a bare source section
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Find a table entry by name
    pub fn find_table(&self, name: &str) -> Option<&SourceTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Whether this section describes the given source name or dataset
    pub fn matches(&self, source_name: &str, dataset_id: &str) -> bool {
        self.name == source_name || self.schema.as_deref() == Some(dataset_id)
    }
}

/// A whole dbt source file (`version: 2` document)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    /// dbt schema file version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Source sections, in document order
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl SourceFile {
    /// Create an empty version-2 file
    pub fn new() -> Self {
        Self {
            version: 2,
            sources: Vec::new(),
        }
    }

    /// Find a source section by name
    pub fn find_source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name == name)
    }
}

impl Default for SourceFile {
    fn default() -> Self {
        Self::new()
    }
}
