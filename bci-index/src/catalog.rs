//! Package catalog
//!
//! The data behind the cache pages: a [`Catalog`] with one listing per
//! inventory group for the index page, and one [`PackagePage`] per package
//! name listing every variant across all versions.

use bci_common::{versioned_name, EnrichedEntry, Inventory, PackageGroup};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Listing for a single `name@version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageListing {
    /// `name@version` of the group's first entry
    pub name: String,
    pub display_name: String,
    /// Distinct OS values then distinct arch values, space separated
    pub tags: String,
}

impl PackageListing {
    /// `None` for a group with no entries
    pub fn from_group(group: &PackageGroup) -> Option<Self> {
        let first = group.objs.first()?;

        let os = distinct(group.objs.iter().map(|e| e.spec.os.as_str()));
        let arch = distinct(group.objs.iter().map(|e| e.spec.arch.as_str()));
        let tags: Vec<&str> = os.into_iter().chain(arch).collect();

        Some(Self {
            name: versioned_name(&group.name, &first.spec.version),
            display_name: group.name.to_uppercase(),
            tags: tags.join(" "),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Total entry count, thousands separated
    pub package_count: String,
    pub last_updated_at: String,
    pub packages: Vec<PackageListing>,
}

impl Catalog {
    pub fn from_inventory(inventory: &Inventory) -> Self {
        Self {
            package_count: thousands(inventory.entry_count()),
            last_updated_at: inventory.meta.last_mod.clone(),
            packages: inventory.data.iter().filter_map(PackageListing::from_group).collect(),
        }
    }
}

/// One built variant of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// `name@version`
    pub name: String,
    pub compiler: String,
    pub arch: String,
    pub os: String,
    pub last_modified_pretty: String,
    pub specfile: String,
}

impl From<&EnrichedEntry> for Variant {
    fn from(entry: &EnrichedEntry) -> Self {
        Self {
            name: entry.versioned_name.clone(),
            compiler: entry.spec.compiler.clone(),
            arch: entry.spec.arch.clone(),
            os: entry.spec.os.clone(),
            last_modified_pretty: entry.last_modified_pretty.clone(),
            specfile: entry.spec.specfile_path.clone(),
        }
    }
}

/// Every variant of one package name, all versions together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagePage {
    /// Upper-case package name
    pub name: String,
    /// In inventory order
    pub variants: Vec<Variant>,
}

impl PackagePage {
    /// File name the page is written under
    pub fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }
}

/// One page per package name, ordered by name
pub fn package_pages(inventory: &Inventory) -> Vec<PackagePage> {
    let mut pages: BTreeMap<&str, PackagePage> = BTreeMap::new();
    for entry in inventory.entries() {
        pages
            .entry(entry.spec.name.as_str())
            .or_insert_with(|| PackagePage {
                name: entry.spec.name.to_uppercase(),
                variants: Vec::new(),
            })
            .variants
            .push(Variant::from(entry));
    }
    pages.into_values().collect()
}

/// Sorted distinct non-empty values
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> BTreeSet<&'a str> {
    values.filter(|v| !v.is_empty()).collect()
}

/// Format with `,` between groups of three digits
fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
