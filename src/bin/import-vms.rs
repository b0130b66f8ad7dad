// Copyright (c) 2025 - Cowboy AI, Inc.
//! VM Import Tool
//!
//! Imports a CSV export of virtual machines (columns `Name`, `NIC`, `IP`, `VLAN`,
//! `Folder`) into the inventory database.
//!
//! Run with: cargo run --bin import-vms -- --database inventory.db vms.csv
//!
//! Configuration comes from `--config <file.toml>` when given, otherwise from the
//! `INVENTORY_DB`, `INVENTORY_AUTHOR` and `INVENTORY_PAGE_SIZE` environment variables.
//! `--database` overrides the database path of either source.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use cim_inventory::import::{read_records_from_path, ImportOptions, VmImporter};
use cim_inventory::store::schema::DEFAULT_OBJECT_TYPES;
use cim_inventory::{Inventory, SqliteGateway, StoreConfig};

#[derive(Debug, Parser)]
#[command(name = "import-vms", version, about = "Import VMs from a CSV export into the inventory")]
struct Cli {
    /// CSV file to import
    csv: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database file, overrides the configured path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Create missing tables and load the stock object types first
    #[arg(long)]
    init: bool,

    /// Remove addresses not listed in the CSV from imported interfaces
    #[arg(long)]
    prune: bool,

    /// Prefix object names with the leaf of their folder
    #[arg(long)]
    prefix_folder: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => StoreConfig::from_env().context("Failed to load configuration from environment")?,
    };
    if let Some(database) = &cli.database {
        config.database_path = database.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(database = %config.database_path.display(), author = %config.author, "Configuration loaded");

    let gateway = SqliteGateway::open(&config).context("Failed to open inventory database")?;
    if cli.init {
        gateway
            .initialize_schema()
            .context("Failed to create inventory schema")?;
        gateway
            .seed_object_types(DEFAULT_OBJECT_TYPES)
            .context("Failed to load object types")?;
    }
    let inventory = Inventory::new(gateway, &config);

    let records = read_records_from_path(&cli.csv)
        .with_context(|| format!("Failed to read {}", cli.csv.display()))?;
    info!(records = records.len(), "Read CSV");

    let options = ImportOptions {
        prefix_folder: cli.prefix_folder,
        prune_addresses: cli.prune,
        ..ImportOptions::default()
    };
    let summary = VmImporter::new(&inventory, options)
        .run(records)
        .context("Import aborted")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Imported {} records: {} created, {} renamed, {} interfaces, {} addresses added, {} removed, {} skipped",
            summary.records,
            summary.created,
            summary.renamed,
            summary.interfaces,
            summary.addresses_added,
            summary.addresses_removed,
            summary.skipped_addresses
        );
    }
    Ok(())
}
