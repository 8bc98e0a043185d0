//! sourcegen engine
//!
//! The merge between warehouse metadata and an existing dbt source
//! document, plus the builder for entries that only exist in the
//! warehouse.

pub mod builder;
pub mod merge;

pub use builder::{build_column, build_source, build_source_file, build_table};
pub use merge::{merge_source_file, MergeOptions, MergeOutcome};
