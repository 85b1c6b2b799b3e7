//! Attribute frequency index
//!
//! Counts how often each arch and OS value occurs across every entry of an
//! inventory, and selects the values common enough to get their own
//! partition.

use bci_common::{EnrichedEntry, Inventory};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub use bci_common::config::DEFAULT_THRESHOLD;

/// Entry attribute tallied by the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Arch,
    Os,
}

impl Attribute {
    pub const ALL: [Attribute; 2] = [Attribute::Arch, Attribute::Os];

    fn value_of(self, entry: &EnrichedEntry) -> &str {
        match self {
            Attribute::Arch => &entry.spec.arch,
            Attribute::Os => &entry.spec.os,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Arch => write!(f, "arch"),
            Attribute::Os => write!(f, "os"),
        }
    }
}

/// Per-attribute value counts over a flattened inventory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyIndex {
    arch: BTreeMap<String, usize>,
    os: BTreeMap<String, usize>,
    total: usize,
}

impl FrequencyIndex {
    pub fn from_inventory(inventory: &Inventory) -> Self {
        Self::from_entries(inventory.entries())
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a EnrichedEntry>) -> Self {
        let mut index = Self::default();
        for entry in entries {
            for attr in Attribute::ALL {
                *index
                    .counts_mut(attr)
                    .entry(attr.value_of(entry).to_string())
                    .or_default() += 1;
            }
            index.total += 1;
        }
        index
    }

    fn counts_mut(&mut self, attr: Attribute) -> &mut BTreeMap<String, usize> {
        match attr {
            Attribute::Arch => &mut self.arch,
            Attribute::Os => &mut self.os,
        }
    }

    /// All distinct values of `attr` with their counts
    pub fn counts(&self, attr: Attribute) -> &BTreeMap<String, usize> {
        match attr {
            Attribute::Arch => &self.arch,
            Attribute::Os => &self.os,
        }
    }

    /// Occurrences of `value` for `attr` (0 if never seen)
    pub fn count(&self, attr: Attribute, value: &str) -> usize {
        self.counts(attr).get(value).copied().unwrap_or(0)
    }

    /// Values of `attr` occurring strictly more than `threshold` times
    pub fn filtered(&self, attr: Attribute, threshold: usize) -> BTreeSet<String> {
        self.counts(attr)
            .iter()
            .filter(|(_, count)| **count > threshold)
            .map(|(value, _)| value.clone())
            .collect()
    }

    /// Number of entries tallied
    pub fn total_entries(&self) -> usize {
        self.total
    }
}
