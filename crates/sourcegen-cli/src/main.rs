use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use sourcegen_catalog::{BigQueryCatalog, DatasetRef, WarehouseCatalog};
use sourcegen_core::{Config, SyncReport, TableFilter, WarehouseConfig};
use sourcegen_engine::{merge_source_file, MergeOptions};

/// dbt-sourcegen - Create or update BigQuery source YAML for dbt
#[derive(Parser)]
#[command(name = "dbt-sourcegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: sourcegen.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update a source YAML file (auto-detects if the file exists)
    Apply {
        /// Google Cloud project ID
        #[arg(long)]
        project_id: Option<String>,

        /// BigQuery dataset (schema) name
        #[arg(long, visible_alias = "schema")]
        dataset: String,

        /// Output YAML file path
        #[arg(short, long)]
        output: PathBuf,

        /// Table name pattern (e.g. 'stg_*')
        #[arg(long)]
        table_pattern: Option<String>,

        /// Exclude tables containing this string
        #[arg(long)]
        exclude: Option<String>,

        /// Sync column information of existing tables
        #[arg(long)]
        sync_columns: bool,

        /// Remove tables/columns no longer in BigQuery
        #[arg(long)]
        remove_deleted: bool,

        /// Report what would change without writing the file
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("sourcegen.toml").exists() {
        Config::from_file(Path::new("sourcegen.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::Apply {
            project_id,
            dataset,
            output,
            table_pattern,
            exclude,
            sync_columns,
            remove_deleted,
            dry_run,
        } => {
            apply_command(
                &config,
                ApplyArgs {
                    project_id,
                    dataset,
                    output,
                    table_pattern,
                    exclude,
                    sync_columns,
                    remove_deleted,
                    dry_run,
                },
                cli.verbose,
            )
            .await
        }
    }
}

struct ApplyArgs {
    project_id: Option<String>,
    dataset: String,
    output: PathBuf,
    table_pattern: Option<String>,
    exclude: Option<String>,
    sync_columns: bool,
    remove_deleted: bool,
    dry_run: bool,
}

/// Apply command - create or update the source YAML file
async fn apply_command(config: &Config, args: ApplyArgs, verbose: bool) -> Result<()> {
    let project_id = resolve_project_id(config, args.project_id.as_deref())?;
    let filter = resolve_filter(config, args.table_pattern, args.exclude);
    let options = resolve_merge_options(config, args.sync_columns, args.remove_deleted);

    let catalog = build_catalog(config, &project_id).await?;

    if verbose {
        eprintln!("{} {}...", "Connecting to".cyan(), catalog.name());
    }

    catalog
        .test_connection()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to warehouse: {}", e))?;

    let dataset_ref = DatasetRef::new(&project_id, &args.dataset);

    if verbose {
        eprintln!("{} {}...", "Fetching metadata for".cyan(), dataset_ref);
    }

    let dataset = catalog.fetch_dataset(&dataset_ref, &filter).await?;

    if dataset.is_empty() {
        tracing::warn!(dataset = %dataset_ref, "no tables found");
        eprintln!(
            "{} {}",
            "No tables found in dataset".yellow(),
            args.dataset.yellow()
        );
        return Ok(());
    }

    let existed = args.output.exists();
    let existing_file = sourcegen_dbt::read_source_file(&args.output)?;

    let outcome = merge_source_file(&dataset, existing_file, &args.dataset, &options);

    print_sync_summary(
        &outcome.report,
        &args.output,
        existed,
        args.dry_run,
        verbose,
    );

    if args.dry_run {
        return Ok(());
    }

    sourcegen_dbt::write_source_file(&args.output, &outcome.file)?;
    tracing::info!(path = %args.output.display(), existed, "wrote source file");

    Ok(())
}

/// Project id comes from the flag, falling back to the config file
fn resolve_project_id(config: &Config, flag: Option<&str>) -> Result<String> {
    if let Some(project_id) = flag {
        return Ok(project_id.to_string());
    }

    config
        .warehouse
        .as_ref()
        .and_then(|w| w.settings.get("project_id"))
        .cloned()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No project id given. Pass --project-id or set 'project_id' \
                 in the [warehouse] section of sourcegen.toml."
            )
        })
}

/// Flags win over config defaults
fn resolve_filter(
    config: &Config,
    table_pattern: Option<String>,
    exclude: Option<String>,
) -> TableFilter {
    TableFilter {
        pattern: table_pattern.or_else(|| config.sync.table_pattern.clone()),
        exclude: exclude.or_else(|| config.sync.exclude.clone()),
    }
}

/// Flags win over config defaults; column removal additionally requires
/// column syncing to be on
fn resolve_merge_options(config: &Config, sync_columns: bool, remove_deleted: bool) -> MergeOptions {
    let sync_columns = sync_columns || config.sync.sync_columns;
    let remove_deleted = remove_deleted || config.sync.remove_deleted;

    MergeOptions {
        sync_columns,
        remove_deleted_tables: remove_deleted,
        remove_deleted_columns: remove_deleted && sync_columns,
    }
}

/// Build the warehouse catalog from the config's [warehouse] section
async fn build_catalog(config: &Config, project_id: &str) -> Result<BigQueryCatalog> {
    let default_warehouse = WarehouseConfig::default();
    let warehouse = config.warehouse.as_ref().unwrap_or(&default_warehouse);

    match warehouse.warehouse_type.to_lowercase().as_str() {
        "bigquery" => {
            let catalog = if let Some(key_path) = warehouse.settings.get("credentials_file") {
                BigQueryCatalog::from_service_account_file(project_id, key_path).await
            } else if let Some(key_json) = warehouse.settings.get("credentials_json") {
                BigQueryCatalog::from_service_account_json(project_id, key_json).await
            } else {
                BigQueryCatalog::with_adc(project_id).await
            };

            catalog.map_err(|e| anyhow::anyhow!("Failed to create BigQuery client: {}", e))
        }
        other => Err(anyhow::anyhow!(
            "Unsupported warehouse type '{}'. Supported: bigquery",
            other
        )),
    }
}

/// Print the sync summary to stdout
fn print_sync_summary(
    report: &SyncReport,
    output: &Path,
    existed: bool,
    dry_run: bool,
    verbose: bool,
) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Source Sync Summary".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    let mode = match (existed, dry_run) {
        (true, false) => "update",
        (false, false) => "create",
        (true, true) => "update (dry run)",
        (false, true) => "create (dry run)",
    };
    println!("{} {}", "File:".bold(), output.display());
    println!("{} {}", "Mode:".bold(), mode);
    println!();

    if report.is_noop() {
        println!("{}", "✓ Already up to date".green().bold());
    } else {
        println!("{}", "Changes:".bold());
        println!(
            "  Tables:  {} added, {} updated, {} removed",
            count_colored(report.tables_added()),
            count_colored(report.tables_updated()),
            count_colored(report.tables_removed()),
        );
        println!(
            "  Columns: {} added, {} retyped, {} removed",
            count_colored(report.columns_added()),
            count_colored(report.columns_retyped()),
            count_colored(report.columns_removed()),
        );

        if verbose || dry_run {
            println!();
            for action in &report.actions {
                println!("  - {}", action);
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

fn count_colored(count: usize) -> colored::ColoredString {
    if count > 0 {
        count.to_string().yellow()
    } else {
        count.to_string().green()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config_defaults() {
        let config = Config::from_toml(
            r#"
            [sync]
            table_pattern = "stg_*"
            "#,
        )
        .unwrap();

        let filter = resolve_filter(&config, Some("raw_*".to_string()), None);
        assert_eq!(filter.pattern.as_deref(), Some("raw_*"));

        let filter = resolve_filter(&config, None, None);
        assert_eq!(filter.pattern.as_deref(), Some("stg_*"));
    }

    #[test]
    fn column_removal_requires_column_sync() {
        let config = Config::default();

        let options = resolve_merge_options(&config, false, true);
        assert!(options.remove_deleted_tables);
        assert!(!options.remove_deleted_columns);

        let options = resolve_merge_options(&config, true, true);
        assert!(options.remove_deleted_columns);
    }

    #[test]
    fn project_id_resolution() {
        let config = Config::from_toml(
            r#"
            [warehouse]
            type = "bigquery"
            project_id = "config-project"
            "#,
        )
        .unwrap();

        assert_eq!(
            resolve_project_id(&config, Some("flag-project")).unwrap(),
            "flag-project"
        );
        assert_eq!(
            resolve_project_id(&config, None).unwrap(),
            "config-project"
        );
        assert!(resolve_project_id(&Config::default(), None).is_err());
    }
}
