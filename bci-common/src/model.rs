//! Inventory data model
//!
//! The enrichment stage reads a [`CandidateManifest`] and writes an
//! [`Inventory`]; the index stage reads that inventory back. Field names are
//! part of the on-disk format and must stay stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Manifest of known package specs, keyed by an arbitrary identifier
/// (the parse stage uses the spec file name).
pub type CandidateManifest = BTreeMap<String, CandidateEntry>;

/// One package spec known to exist in the build cache
///
/// Identity is `specfile`, which is also the object key (below the cache
/// prefix) used for the metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub name: String,
    pub version: String,
    /// Spec file path relative to the cache prefix
    #[serde(rename = "specfile")]
    pub specfile_path: String,
    pub arch: String,
    pub os: String,
    pub compiler: String,
    #[serde(default)]
    pub package_hash: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub full_hash: String,
    #[serde(default)]
    pub build_hash: String,
}

impl CandidateEntry {
    /// `name@version`
    pub fn versioned_name(&self) -> String {
        versioned_name(&self.name, &self.version)
    }
}

/// Build the grouping key for a package
pub fn versioned_name(name: &str, version: &str) -> String {
    format!("{}@{}", name, version)
}

/// Candidate plus the modification time of its spec object
///
/// Only created for candidates whose lookup succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEntry {
    #[serde(flatten)]
    pub spec: CandidateEntry,
    /// Epoch seconds (see `time::EpochMode` for how this is derived)
    pub last_modified: f64,
    /// `YYYY-MM-DD HH:MM <tz>` in US/Pacific
    pub last_modified_pretty: String,
    pub versioned_name: String,
}

/// All variants of one `name@version`, sorted by (arch, os, compiler, last_modified)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageGroup {
    /// Package name taken from the first sorted member
    pub name: String,
    pub objs: Vec<EnrichedEntry>,
}

impl PackageGroup {
    /// Grouping key shared by every member, if the group is non-empty
    pub fn versioned_name(&self) -> Option<&str> {
        self.objs.first().map(|e| e.versioned_name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryMeta {
    /// Pretty form of the newest modification time, empty if none
    pub last_mod: String,
}

/// Top-level output of the enrichment stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub meta: InventoryMeta,
    /// Groups sorted by versioned name
    pub data: Vec<PackageGroup>,
}

impl Inventory {
    /// Iterate over every entry of every group
    pub fn entries(&self) -> impl Iterator<Item = &EnrichedEntry> {
        self.data.iter().flat_map(|group| group.objs.iter())
    }

    /// Total number of entries across all groups
    pub fn entry_count(&self) -> usize {
        self.data.iter().map(|group| group.objs.len()).sum()
    }
}
