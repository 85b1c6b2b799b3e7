//! bci-index - build cache inventory, index stage
//!
//! Reads the inventory written by `bci-enrich` and prints, one JSON array per
//! line, the arch values and then the OS values that occur more often than
//! the threshold. Optionally writes the package catalog and one page per
//! package name.

use anyhow::{Context, Result};
use bci_common::config::TomlConfig;
use bci_common::document::{read_json, write_json};
use bci_common::logging::{init_tracing_to, Console};
use bci_common::Inventory;
use bci_index::{package_pages, Attribute, Catalog, FrequencyIndex};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

/// Command-line arguments for bci-index
#[derive(Parser, Debug)]
#[command(name = "bci-index")]
#[command(about = "Summarize a build cache inventory by architecture and OS")]
#[command(version)]
struct Args {
    /// Inventory file written by bci-enrich
    #[arg(short, long, default_value = "inventory.json")]
    input: PathBuf,

    /// Values must occur more than this many times (default from config)
    #[arg(short, long)]
    threshold: Option<usize>,

    /// Also write the package catalog to this file
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Also write one `<NAME>.json` page per package name into this directory
    #[arg(long)]
    packages: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load().context("Failed to load configuration")?;
    init_tracing_to(&config.logging, Console::Stderr).context("Failed to initialize logging")?;

    info!("{}", bci_common::build_info!().banner());

    let inventory: Inventory = read_json(&args.input)
        .with_context(|| format!("Failed to read inventory {}", args.input.display()))?;
    let threshold = args.threshold.unwrap_or(config.index.threshold);

    let index = FrequencyIndex::from_inventory(&inventory);
    info!(
        "{} entries in {} packages, threshold {}",
        index.total_entries(),
        inventory.data.len(),
        threshold
    );

    for attr in Attribute::ALL {
        debug!(attribute = %attr, counts = ?index.counts(attr), "Value counts");
        let values = index.filtered(attr, threshold);
        println!("{}", serde_json::to_string(&values)?);
    }

    if let Some(path) = &args.catalog {
        let catalog = Catalog::from_inventory(&inventory);
        write_json(path, &catalog)
            .with_context(|| format!("Failed to write catalog {}", path.display()))?;
        info!(
            "Wrote catalog of {} packages ({} entries) to {}",
            catalog.packages.len(),
            catalog.package_count,
            path.display()
        );
    }

    if let Some(dir) = &args.packages {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create package directory {}", dir.display()))?;
        let pages = package_pages(&inventory);
        for page in &pages {
            let path = dir.join(page.file_name());
            write_json(&path, page)
                .with_context(|| format!("Failed to write package page {}", path.display()))?;
        }
        info!("Wrote {} package pages to {}", pages.len(), dir.display());
    }

    Ok(())
}
