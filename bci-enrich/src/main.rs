//! bci-enrich - build cache inventory, enrichment stage
//!
//! Reads a manifest of known package specs, stats each spec object in the
//! build cache bucket, and writes the grouped inventory:
//!
//! ```text
//! bci-enrich <input-file> <output-file>
//! ```
//!
//! Store credentials come from the environment (see `bci_common::config`).

use anyhow::{Context, Result};
use bci_common::config::{resolve_worker_count, StoreConfig, TomlConfig};
use bci_common::document::{read_json, write_json};
use bci_common::logging::init_tracing;
use bci_common::CandidateManifest;
use bci_enrich::store::S3Connector;
use bci_enrich::{build_inventory, Enricher, LookupPool};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Command-line arguments for bci-enrich
#[derive(Parser, Debug)]
#[command(name = "bci-enrich")]
#[command(about = "Add last-modified times to a build cache spec manifest and group it by package")]
#[command(version)]
struct Args {
    /// Spec manifest (JSON object mapping keys to specs)
    input_file: PathBuf,

    /// Inventory file to write
    output_file: PathBuf,
}

/// Parse arguments; anything other than help/version exits with status 1
fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("error: missing required command line parameter");
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args();

    let config = TomlConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!("{}", bci_common::build_info!().banner());
    info!("Reading from {}", args.input_file.display());
    info!("Writing to {}", args.output_file.display());

    let store_config = StoreConfig::from_env().context("Object store configuration incomplete")?;
    info!(
        "Bucket: {} at {} (prefix {})",
        store_config.bucket,
        store_config.endpoint_url(),
        store_config.key_prefix
    );

    let manifest: CandidateManifest = read_json(&args.input_file)
        .with_context(|| format!("Failed to read manifest {}", args.input_file.display()))?;
    let candidates: Vec<_> = manifest.into_values().collect();
    info!("Candidates: {}", candidates.len());

    let workers = resolve_worker_count(config.enrich.workers);
    info!("Using worker count: {}", workers);
    match config.enrich.lookup_timeout() {
        Some(timeout) => info!("Lookup timeout: {:?}", timeout),
        None => info!("Lookup timeout: disabled"),
    }

    let key_prefix = store_config.key_prefix.clone();
    let pool = LookupPool::new(
        S3Connector::new(store_config),
        workers,
        config.enrich.lookup_timeout(),
    );
    let enricher = Enricher::new(pool, key_prefix, config.enrich.epoch_mode);

    let started = Instant::now();
    let candidate_count = candidates.len();
    let enrichment = enricher.enrich(candidates).await;

    info!("Last Modified: {}", enrichment.max_timestamp());
    info!("Last Modified Pretty: {}", enrichment.max_timestamp_pretty());
    info!(
        "# results = {} of {} ({} failed)",
        enrichment.success_count(),
        candidate_count,
        enrichment.failed_count()
    );
    info!("{:.3} seconds", started.elapsed().as_secs_f64());

    let inventory = build_inventory(&enrichment);
    write_json(&args.output_file, &inventory)
        .with_context(|| format!("Failed to write inventory {}", args.output_file.display()))?;
    info!(
        "Wrote {} packages ({} entries) to {}",
        inventory.data.len(),
        inventory.entry_count(),
        args.output_file.display()
    );

    Ok(())
}
