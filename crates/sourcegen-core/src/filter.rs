//! Table name filtering for dataset listings

use serde::{Deserialize, Serialize};

/// Filter applied to warehouse table names before syncing
///
/// A table is kept when it matches the include pattern (or none is set)
/// and does not contain the exclude substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFilter {
    /// Include pattern with `*` wildcards (e.g. `stg_*`)
    #[serde(default)]
    pub pattern: Option<String>,

    /// Exclude tables whose name contains this substring
    #[serde(default)]
    pub exclude: Option<String>,
}

impl TableFilter {
    /// Create a filter that matches every table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the include pattern
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Set the exclude substring
    pub fn with_exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    /// Check whether a table name passes the filter
    pub fn matches(&self, table_name: &str) -> bool {
        if let Some(pattern) = &self.pattern {
            let included = if pattern.contains('*') {
                glob_match(pattern, table_name)
            } else {
                pattern == table_name
            };
            if !included {
                return false;
            }
        }

        if let Some(exclude) = &self.exclude {
            if !exclude.is_empty() && table_name.contains(exclude.as_str()) {
                return false;
            }
        }

        true
    }
}

/// Simple glob matching (supports a single `*` wildcard)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    if let Some(star_pos) = pattern.find('*') {
        let prefix = &pattern[..star_pos];
        let suffix = &pattern[star_pos + 1..];

        text.starts_with(prefix)
            && text.ends_with(suffix)
            && text.len() >= prefix.len() + suffix.len()
    } else {
        pattern == text
    }
}
