//! Merging warehouse metadata into an existing source document
//!
//! The merge walks tables and columns in warehouse order, refreshes
//! everything the warehouse owns (presence, data types, missing
//! descriptions), and leaves everything the user owns untouched:
//! descriptions already set, meta blocks, tests, unknown keys, and the
//! relative order of entries that exist only in the YAML.

use sourcegen_core::{Column, Dataset, SyncAction, SyncReport, Table};
use sourcegen_dbt::{Source, SourceColumn, SourceFile, SourceTable};
use std::collections::HashSet;

use crate::builder::{build_column, build_table};

/// Options controlling what a merge is allowed to touch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Merge the column lists of existing tables
    ///
    /// When unset, existing tables keep their column lists exactly as
    /// authored; tables new to the document still get their full
    /// column list.
    pub sync_columns: bool,

    /// Drop table entries that no longer exist in the warehouse
    pub remove_deleted_tables: bool,

    /// Drop column entries that no longer exist in the warehouse
    /// (only effective together with `sync_columns`)
    pub remove_deleted_columns: bool,
}

/// A merged document plus the record of what changed
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The updated source file
    pub file: SourceFile,

    /// What the merge did
    pub report: SyncReport,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Merge warehouse columns with existing YAML columns
///
/// Emits warehouse columns in catalog order, then YAML-only survivors
/// in their original order.
fn merge_columns(
    table_name: &str,
    warehouse: &[Column],
    yaml: &[SourceColumn],
    remove_deleted: bool,
    report: &mut SyncReport,
) -> Vec<SourceColumn> {
    let warehouse_names: HashSet<&str> = warehouse.iter().map(|c| c.name.as_str()).collect();

    let mut merged = Vec::with_capacity(warehouse.len());

    for wh_col in warehouse {
        match yaml.iter().find(|c| c.name == wh_col.name) {
            Some(existing) => {
                let mut entry = existing.clone();

                if let Some(old_type) = entry.data_type.as_deref() {
                    if old_type != wh_col.data_type {
                        report.record(SyncAction::ColumnRetyped {
                            table: table_name.to_string(),
                            column: wh_col.name.clone(),
                            old_type: old_type.to_string(),
                            new_type: wh_col.data_type.clone(),
                        });
                    }
                }
                entry.data_type = Some(wh_col.data_type.clone());

                if non_blank(&entry.description).is_none() {
                    entry.description = wh_col.description.clone().filter(|d| !d.is_empty());
                }

                merged.push(entry);
            }
            None => {
                report.record(SyncAction::ColumnAdded {
                    table: table_name.to_string(),
                    column: wh_col.name.clone(),
                });
                merged.push(build_column(wh_col));
            }
        }
    }

    for yaml_col in yaml {
        if !warehouse_names.contains(yaml_col.name.as_str()) {
            if remove_deleted {
                report.record(SyncAction::ColumnRemoved {
                    table: table_name.to_string(),
                    column: yaml_col.name.clone(),
                });
            } else {
                merged.push(yaml_col.clone());
            }
        }
    }

    merged
}

/// Merge one warehouse table with its YAML entry, if any
fn merge_table(
    wh_table: &Table,
    yaml_table: Option<&SourceTable>,
    options: &MergeOptions,
    report: &mut SyncReport,
) -> SourceTable {
    let Some(existing) = yaml_table else {
        report.record(SyncAction::TableAdded {
            table: wh_table.table_id.clone(),
        });
        return build_table(wh_table);
    };

    let mut column_actions = SyncReport::new();
    let mut entry = existing.clone();

    if options.sync_columns {
        entry.columns = merge_columns(
            &existing.name,
            &wh_table.columns,
            &existing.columns,
            options.remove_deleted_columns,
            &mut column_actions,
        );
    }

    if non_blank(&entry.description).is_none() {
        entry.description = wh_table.description.clone().filter(|d| !d.is_empty());
    }

    if entry != *existing {
        report.record(SyncAction::TableUpdated {
            table: existing.name.clone(),
        });
    }
    report.actions.extend(column_actions.actions);

    entry
}

/// Merge warehouse tables into a source section
fn merge_source(
    dataset: &Dataset,
    yaml_source: Option<Source>,
    source_name: &str,
    options: &MergeOptions,
    report: &mut SyncReport,
) -> Source {
    let mut source = yaml_source.unwrap_or_else(|| {
        let mut s = Source::new(source_name);
        s.database = Some(dataset.project_id.clone());
        s.schema = Some(dataset.dataset_id.clone());
        s
    });

    let mut merged_tables = Vec::with_capacity(dataset.tables.len());

    for wh_table in &dataset.tables {
        let yaml_table = source.find_table(&wh_table.table_id);
        merged_tables.push(merge_table(wh_table, yaml_table, options, report));
    }

    for yaml_table in &source.tables {
        if dataset.find_table(&yaml_table.name).is_none() {
            if options.remove_deleted_tables {
                report.record(SyncAction::TableRemoved {
                    table: yaml_table.name.clone(),
                });
            } else {
                merged_tables.push(yaml_table.clone());
            }
        }
    }

    // Backfill connection coordinates, never overwrite authored ones
    if source.database.is_none() {
        source.database = Some(dataset.project_id.clone());
    }
    if source.schema.is_none() {
        source.schema = Some(dataset.dataset_id.clone());
    }
    source.tables = merged_tables;

    source
}

/// Merge warehouse metadata into a source file
///
/// The target section is the one whose name equals `source_name` or
/// whose `schema` equals the dataset id (first match wins); every other
/// section passes through untouched, ahead of the merged one. A missing
/// file or section is created from the warehouse metadata.
pub fn merge_source_file(
    dataset: &Dataset,
    existing_file: Option<SourceFile>,
    source_name: &str,
    options: &MergeOptions,
) -> MergeOutcome {
    let mut report = SyncReport::new();

    let file = existing_file.unwrap_or_default();

    let mut matched: Option<Source> = None;
    let mut others = Vec::new();

    for source in file.sources {
        if matched.is_none() && source.matches(source_name, &dataset.dataset_id) {
            matched = Some(source);
        } else {
            others.push(source);
        }
    }

    let merged = merge_source(dataset, matched, source_name, options, &mut report);

    tracing::info!(
        source = %merged.name,
        tables_added = report.tables_added(),
        tables_updated = report.tables_updated(),
        tables_removed = report.tables_removed(),
        columns_added = report.columns_added(),
        columns_removed = report.columns_removed(),
        columns_retyped = report.columns_retyped(),
        "merged source file"
    );

    let mut sources = others;
    sources.push(merged);

    MergeOutcome {
        file: SourceFile {
            version: file.version,
            sources,
        },
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dataset() -> Dataset {
        Dataset::new("my-project", "analytics").with_tables(vec![
            Table::new("orders")
                .with_description("All orders")
                .with_columns(vec![
                    Column::new("id", "INT64").with_description("Order id"),
                    Column::new("status", "STRING"),
                ]),
            Table::new("users").with_columns(vec![
                Column::new("id", "INT64"),
                Column::new("email", "STRING"),
            ]),
        ])
    }

    fn sync_all() -> MergeOptions {
        MergeOptions {
            sync_columns: true,
            ..MergeOptions::default()
        }
    }

    fn yaml_value(yaml: &str) -> serde_yaml::Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn create_from_scratch() {
        let outcome = merge_source_file(&dataset(), None, "analytics", &sync_all());

        assert_eq!(outcome.file.version, 2);
        assert_eq!(outcome.file.sources.len(), 1);

        let source = &outcome.file.sources[0];
        assert_eq!(source.name, "analytics");
        assert_eq!(source.database.as_deref(), Some("my-project"));
        assert_eq!(source.schema.as_deref(), Some("analytics"));
        assert_eq!(source.tables.len(), 2);
        assert_eq!(source.tables[0].name, "orders");
        assert_eq!(source.tables[0].columns.len(), 2);

        assert_eq!(outcome.report.tables_added(), 2);
        assert_eq!(outcome.report.tables_updated(), 0);
    }

    #[test]
    fn new_warehouse_table_is_added() {
        let mut existing = SourceFile::new();
        let mut source = Source::new("analytics");
        source.schema = Some("analytics".to_string());
        source.tables = vec![SourceTable::new("orders")];
        existing.sources.push(source);

        let outcome = merge_source_file(&dataset(), Some(existing), "analytics", &sync_all());

        let source = &outcome.file.sources[0];
        let names: Vec<_> = source.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["orders", "users"]);
        assert_eq!(outcome.report.tables_added(), 1);
    }

    #[test]
    fn user_annotations_survive_a_sync() {
        let mut column = SourceColumn::new("id");
        column.data_type = Some("INT64".to_string());
        column.description = Some("Primary key, assigned at checkout".to_string());
        column.tests = Some(yaml_value("[unique, not_null]"));
        column.meta = Some(yaml_value("pii: false"));

        let mut table = SourceTable::new("orders");
        table.description = Some("Hand-written description".to_string());
        table.tests = Some(yaml_value("[row_count_positive]"));
        table
            .extra
            .insert("loaded_at_field".to_string(), yaml_value("_synced_at"));
        table.columns = vec![column];

        let mut source = Source::new("analytics");
        source.schema = Some("analytics".to_string());
        source
            .extra
            .insert("loader".to_string(), yaml_value("fivetran"));
        source.tables = vec![table];

        let mut file = SourceFile::new();
        file.sources.push(source);

        let outcome = merge_source_file(&dataset(), Some(file), "analytics", &sync_all());

        let source = &outcome.file.sources[0];
        assert_eq!(source.extra["loader"], yaml_value("fivetran"));

        let table = source.find_table("orders").unwrap();
        // YAML description wins over the warehouse's "All orders"
        assert_eq!(
            table.description.as_deref(),
            Some("Hand-written description")
        );
        assert!(table.tests.is_some());
        assert_eq!(table.extra["loaded_at_field"], yaml_value("_synced_at"));

        let id = table.find_column("id").unwrap();
        assert_eq!(
            id.description.as_deref(),
            Some("Primary key, assigned at checkout")
        );
        assert!(id.tests.is_some());
        assert!(id.meta.is_some());
    }

    #[test]
    fn data_type_is_refreshed_and_reported() {
        let mut column = SourceColumn::new("id");
        column.data_type = Some("STRING".to_string());

        let mut table = SourceTable::new("orders");
        table.columns = vec![column];

        let mut source = Source::new("analytics");
        source.schema = Some("analytics".to_string());
        source.tables = vec![table];

        let mut file = SourceFile::new();
        file.sources.push(source);

        let outcome = merge_source_file(&dataset(), Some(file), "analytics", &sync_all());

        let table = outcome.file.sources[0].find_table("orders").unwrap();
        assert_eq!(
            table.find_column("id").unwrap().data_type.as_deref(),
            Some("INT64")
        );

        assert_eq!(outcome.report.columns_retyped(), 1);
        assert!(outcome
            .report
            .actions
            .contains(&SyncAction::ColumnRetyped {
                table: "orders".to_string(),
                column: "id".to_string(),
                old_type: "STRING".to_string(),
                new_type: "INT64".to_string(),
            }));
    }

    #[test]
    fn missing_description_is_backfilled_from_warehouse() {
        let mut table = SourceTable::new("orders");
        table.description = Some(String::new()); // blank counts as absent
        table.columns = vec![SourceColumn::new("id")];

        let mut source = Source::new("analytics");
        source.schema = Some("analytics".to_string());
        source.tables = vec![table];

        let mut file = SourceFile::new();
        file.sources.push(source);

        let outcome = merge_source_file(&dataset(), Some(file), "analytics", &sync_all());

        let table = outcome.file.sources[0].find_table("orders").unwrap();
        assert_eq!(table.description.as_deref(), Some("All orders"));
        assert_eq!(
            table.find_column("id").unwrap().description.as_deref(),
            Some("Order id")
        );
    }

    #[test]
    fn yaml_only_entries_are_kept_by_default() {
        let mut gone_col = SourceColumn::new("legacy_flag");
        gone_col.description = Some("kept for history".to_string());

        let mut orders = SourceTable::new("orders");
        orders.columns = vec![gone_col];

        let retired = SourceTable::new("retired_table");

        let mut source = Source::new("analytics");
        source.schema = Some("analytics".to_string());
        source.tables = vec![orders, retired];

        let mut file = SourceFile::new();
        file.sources.push(source);

        let outcome = merge_source_file(&dataset(), Some(file), "analytics", &sync_all());

        let source = &outcome.file.sources[0];
        let names: Vec<_> = source.tables.iter().map(|t| t.name.as_str()).collect();
        // Warehouse tables first, YAML-only survivor appended
        assert_eq!(names, vec!["orders", "users", "retired_table"]);

        let orders = source.find_table("orders").unwrap();
        let columns: Vec<_> = orders.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["id", "status", "legacy_flag"]);
        assert_eq!(outcome.report.tables_removed(), 0);
        assert_eq!(outcome.report.columns_removed(), 0);
    }

    #[test]
    fn remove_deleted_drops_stale_entries() {
        let mut orders = SourceTable::new("orders");
        orders.columns = vec![SourceColumn::new("legacy_flag")];

        let mut source = Source::new("analytics");
        source.schema = Some("analytics".to_string());
        source.tables = vec![orders, SourceTable::new("retired_table")];

        let mut file = SourceFile::new();
        file.sources.push(source);

        let options = MergeOptions {
            sync_columns: true,
            remove_deleted_tables: true,
            remove_deleted_columns: true,
        };
        let outcome = merge_source_file(&dataset(), Some(file), "analytics", &options);

        let source = &outcome.file.sources[0];
        let names: Vec<_> = source.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["orders", "users"]);

        let orders = source.find_table("orders").unwrap();
        let columns: Vec<_> = orders.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["id", "status"]);

        assert_eq!(outcome.report.tables_removed(), 1);
        assert_eq!(outcome.report.columns_removed(), 1);
    }

    #[test]
    fn without_sync_columns_existing_tables_are_untouched() {
        let mut stale = SourceColumn::new("id");
        stale.data_type = Some("STRING".to_string());

        let mut orders = SourceTable::new("orders");
        orders.columns = vec![stale.clone()];

        let mut source = Source::new("analytics");
        source.schema = Some("analytics".to_string());
        source.tables = vec![orders];

        let mut file = SourceFile::new();
        file.sources.push(source);

        let options = MergeOptions::default();
        let outcome = merge_source_file(&dataset(), Some(file), "analytics", &options);

        let source = &outcome.file.sources[0];
        let orders = source.find_table("orders").unwrap();
        // Column list untouched: no new columns, stale type kept
        assert_eq!(orders.columns, vec![stale]);

        // New tables still arrive complete
        let users = source.find_table("users").unwrap();
        assert_eq!(users.columns.len(), 2);
    }

    #[test]
    fn unrelated_sources_pass_through() {
        let mut other = Source::new("billing");
        other.schema = Some("billing".to_string());
        other.tables = vec![SourceTable::new("invoices")];

        let mut target = Source::new("analytics");
        target.schema = Some("analytics".to_string());

        let mut file = SourceFile::new();
        file.sources = vec![other.clone(), target];

        let outcome = merge_source_file(&dataset(), Some(file), "analytics", &sync_all());

        assert_eq!(outcome.file.sources.len(), 2);
        // Untouched section first, merged section last
        assert_eq!(outcome.file.sources[0], other);
        assert_eq!(outcome.file.sources[1].name, "analytics");
    }

    #[test]
    fn section_matched_by_schema_keeps_its_name() {
        let mut source = Source::new("warehouse_raw");
        source.schema = Some("analytics".to_string());
        source.database = Some("legacy-project".to_string());

        let mut file = SourceFile::new();
        file.sources.push(source);

        let outcome = merge_source_file(&dataset(), Some(file), "analytics", &sync_all());

        let merged = &outcome.file.sources[0];
        assert_eq!(merged.name, "warehouse_raw");
        // Authored coordinates are never overwritten
        assert_eq!(merged.database.as_deref(), Some("legacy-project"));
    }

    #[test]
    fn noop_merge_reports_nothing() {
        let first = merge_source_file(&dataset(), None, "analytics", &sync_all());
        let second =
            merge_source_file(&dataset(), Some(first.file.clone()), "analytics", &sync_all());

        assert_eq!(first.file, second.file);
        assert!(second.report.is_noop());
    }
}
