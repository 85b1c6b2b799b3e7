//! # Build Cache Inventory index stage
//!
//! Reads the grouped inventory written by `bci-enrich` and derives:
//! - Frequency partitions of the arch and OS attributes
//! - The package catalog listing used by the index page
//! - Per-package pages listing every variant

pub mod catalog;
pub mod frequency;

pub use catalog::{package_pages, Catalog, PackageListing, PackagePage, Variant};
pub use frequency::{Attribute, FrequencyIndex, DEFAULT_THRESHOLD};
