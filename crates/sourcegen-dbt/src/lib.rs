//! dbt source YAML support
//!
//! The typed document model for a dbt `sources:` file and its
//! reader/writer. User-authored content that is not derivable from the
//! warehouse (descriptions, tests, meta blocks, unknown keys such as
//! `freshness` or `loaded_at_field`) round-trips verbatim.

pub mod source_file;
pub mod yaml;

pub use source_file::{Source, SourceColumn, SourceFile, SourceTable};
pub use yaml::{read_source_file, write_source_file, YamlError};
