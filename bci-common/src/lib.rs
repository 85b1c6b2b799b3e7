//! # Build Cache Inventory common library
//!
//! Shared code for the two inventory stages:
//! - Inventory data model (candidate manifest, enriched entries, grouped inventory)
//! - Configuration loading (environment + TOML)
//! - Tracing initialization
//! - Pacific timestamp conversion
//! - JSON document I/O
//! - Build identification for startup banners

pub mod build_info;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod model;
pub mod time;

pub use error::{Error, Result};
pub use model::{
    versioned_name, CandidateEntry, CandidateManifest, EnrichedEntry, Inventory, InventoryMeta,
    PackageGroup,
};
