//! Configuration schema (sourcegen.toml)
//!
//! Everything in the config file can also be supplied as a CLI flag;
//! flags win over file values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Warehouse connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Warehouse type (currently only `bigquery`)
    #[serde(rename = "type")]
    pub warehouse_type: String,

    /// Connection settings (warehouse-specific), e.g. `project_id`,
    /// `credentials_file`
    #[serde(flatten)]
    pub settings: HashMap<String, String>,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            warehouse_type: "bigquery".to_string(),
            settings: HashMap::new(),
        }
    }
}

/// Default sync behavior, overridable per invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncDefaults {
    /// Sync column lists of existing tables
    #[serde(default)]
    pub sync_columns: bool,

    /// Remove tables/columns that no longer exist in the warehouse
    #[serde(default)]
    pub remove_deleted: bool,

    /// Default include pattern for table names
    #[serde(default)]
    pub table_pattern: Option<String>,

    /// Default exclude substring for table names
    #[serde(default)]
    pub exclude: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Warehouse connection configuration
    #[serde(default)]
    pub warehouse: Option<WarehouseConfig>,

    /// Default sync behavior
    #[serde(default)]
    pub sync: SyncDefaults,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        Self::from_toml(&contents)
    }

    /// Load config from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
