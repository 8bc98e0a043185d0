//! Building source entries from warehouse metadata alone
//!
//! Used for the create-new-file path and for tables/columns that appear
//! in the warehouse but not yet in the YAML document.

use sourcegen_core::{Column, Dataset, Table};
use sourcegen_dbt::{Source, SourceColumn, SourceFile, SourceTable};

/// Build a column entry from warehouse metadata
pub fn build_column(column: &Column) -> SourceColumn {
    let mut entry = SourceColumn::new(&column.name);
    entry.data_type = Some(column.data_type.clone());
    entry.description = column.description.clone().filter(|d| !d.is_empty());
    entry
}

/// Build a table entry from warehouse metadata
pub fn build_table(table: &Table) -> SourceTable {
    let mut entry = SourceTable::new(&table.table_id);
    entry.description = table.description.clone().filter(|d| !d.is_empty());
    entry.columns = table.columns.iter().map(build_column).collect();
    entry
}

/// Build a source section from warehouse metadata
pub fn build_source(dataset: &Dataset, source_name: &str) -> Source {
    let mut source = Source::new(source_name);
    source.database = Some(dataset.project_id.clone());
    source.schema = Some(dataset.dataset_id.clone());
    source.tables = dataset.tables.iter().map(build_table).collect();
    source
}

/// Build a whole source file from warehouse metadata
pub fn build_source_file(dataset: &Dataset, source_name: &str) -> SourceFile {
    SourceFile {
        version: 2,
        sources: vec![build_source(dataset, source_name)],
    }
}
