//! Grouping and sorting of enriched entries into the inventory layout
//!
//! Output order never depends on lookup completion order: groups are keyed in
//! a `BTreeMap` by versioned name and members are stably sorted by
//! (arch, os, compiler, last_modified).

use crate::enrich::Enrichment;
use bci_common::{EnrichedEntry, Inventory, InventoryMeta, PackageGroup};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Order of entries within a group
fn variant_order(a: &EnrichedEntry, b: &EnrichedEntry) -> Ordering {
    a.spec
        .arch
        .cmp(&b.spec.arch)
        .then_with(|| a.spec.os.cmp(&b.spec.os))
        .then_with(|| a.spec.compiler.cmp(&b.spec.compiler))
        .then_with(|| a.last_modified.total_cmp(&b.last_modified))
}

/// Partition entries by versioned name, sort each partition, and emit the
/// partitions in versioned-name order
pub fn group_and_sort(entries: Vec<EnrichedEntry>) -> Vec<PackageGroup> {
    let mut groups: BTreeMap<String, Vec<EnrichedEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.versioned_name.clone()).or_default().push(entry);
    }

    groups
        .into_values()
        .filter_map(|mut objs| {
            objs.sort_by(variant_order);
            let name = objs.first()?.spec.name.clone();
            Some(PackageGroup { name, objs })
        })
        .collect()
}

/// Assemble the inventory document for an enrichment pass
pub fn build_inventory(enrichment: &Enrichment) -> Inventory {
    Inventory {
        meta: InventoryMeta {
            last_mod: enrichment.max_timestamp_pretty().to_string(),
        },
        data: group_and_sort(enrichment.entries.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bci_common::CandidateEntry;

    fn entry(name: &str, version: &str, arch: &str, os: &str, compiler: &str, ts: f64) -> EnrichedEntry {
        EnrichedEntry {
            spec: CandidateEntry {
                name: name.to_string(),
                version: version.to_string(),
                specfile_path: format!("{}-{}-{}-{}-{}.spec.json", name, version, arch, os, ts),
                arch: arch.to_string(),
                os: os.to_string(),
                compiler: compiler.to_string(),
                package_hash: String::new(),
                hash: String::new(),
                full_hash: String::new(),
                build_hash: String::new(),
            },
            last_modified: ts,
            last_modified_pretty: String::new(),
            versioned_name: format!("{}@{}", name, version),
        }
    }

    fn sample() -> Vec<EnrichedEntry> {
        vec![
            entry("zlib", "1.2.11", "x86_64", "ubuntu18.04", "gcc@7.5.0", 30.0),
            entry("bzip2", "1.0.8", "x86_64", "centos7", "gcc@4.8.5", 10.0),
            entry("zlib", "1.2.11", "ppc64le", "ubuntu18.04", "gcc@7.5.0", 20.0),
            entry("zlib", "1.2.12", "x86_64", "ubuntu18.04", "gcc@7.5.0", 5.0),
            entry("zlib", "1.2.11", "x86_64", "centos7", "gcc@7.5.0", 40.0),
            entry("zlib", "1.2.11", "x86_64", "centos7", "clang@12.0.0", 50.0),
            entry("zlib", "1.2.11", "x86_64", "centos7", "clang@12.0.0", 45.0),
        ]
    }

    #[test]
    fn test_groups_sorted_by_versioned_name() {
        let groups = group_and_sort(sample());
        let keys: Vec<&str> = groups.iter().filter_map(|g| g.versioned_name()).collect();
        assert_eq!(keys, vec!["bzip2@1.0.8", "zlib@1.2.11", "zlib@1.2.12"]);
        assert_eq!(groups[1].name, "zlib");
    }

    #[test]
    fn test_members_share_versioned_name() {
        for group in group_and_sort(sample()) {
            let key = group.versioned_name().unwrap().to_string();
            assert!(group.objs.iter().all(|e| e.versioned_name == key));
        }
    }

    #[test]
    fn test_no_entries_lost_or_duplicated() {
        let input = sample();
        let groups = group_and_sort(input.clone());
        let mut flattened: Vec<String> = groups
            .iter()
            .flat_map(|g| g.objs.iter().map(|e| e.spec.specfile_path.clone()))
            .collect();
        let mut expected: Vec<String> = input.iter().map(|e| e.spec.specfile_path.clone()).collect();
        flattened.sort();
        expected.sort();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_members_sorted_by_arch_os_compiler_time() {
        let groups = group_and_sort(sample());
        let zlib = &groups[1];
        let order: Vec<(&str, &str, &str, f64)> = zlib
            .objs
            .iter()
            .map(|e| (e.spec.arch.as_str(), e.spec.os.as_str(), e.spec.compiler.as_str(), e.last_modified))
            .collect();
        assert_eq!(
            order,
            vec![
                ("ppc64le", "ubuntu18.04", "gcc@7.5.0", 20.0),
                ("x86_64", "centos7", "clang@12.0.0", 45.0),
                ("x86_64", "centos7", "clang@12.0.0", 50.0),
                ("x86_64", "centos7", "gcc@7.5.0", 40.0),
                ("x86_64", "ubuntu18.04", "gcc@7.5.0", 30.0),
            ]
        );
        for pair in zlib.objs.windows(2) {
            assert_ne!(variant_order(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn test_same_name_version_different_arch() {
        let groups = group_and_sort(vec![
            entry("cmake", "3.20.2", "x86_64", "rhel8", "gcc@8.4.1", 1.0),
            entry("cmake", "3.20.2", "aarch64", "rhel8", "gcc@8.4.1", 2.0),
        ]);
        assert_eq!(groups.len(), 1);
        let arches: Vec<&str> = groups[0].objs.iter().map(|e| e.spec.arch.as_str()).collect();
        assert_eq!(arches, vec!["aarch64", "x86_64"]);
    }

    #[test]
    fn test_regrouping_is_order_independent() {
        let forward = group_and_sort(sample());
        let mut reversed_input = sample();
        reversed_input.reverse();
        let reversed = group_and_sort(reversed_input);

        let a = serde_json::to_vec(&forward).unwrap();
        let b = serde_json::to_vec(&reversed).unwrap();
        assert_eq!(a, b);

        let again = group_and_sort(forward.into_iter().flat_map(|g| g.objs).collect());
        assert_eq!(serde_json::to_vec(&again).unwrap(), a);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_and_sort(Vec::new()).is_empty());
        let inventory = build_inventory(&Enrichment::default());
        assert_eq!(inventory, Inventory::default());
    }
}
