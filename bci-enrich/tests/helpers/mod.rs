//! Shared helpers for bci-enrich integration tests

pub mod log_capture;

use async_trait::async_trait;
use bci_common::CandidateEntry;
use bci_enrich::{LookupError, MetadataStore, ObjectMetadata, StoreConnector};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory bucket contents shared by every worker's store
#[derive(Default)]
pub struct FakeBucket {
    objects: HashMap<String, DateTime<Utc>>,
    broken: HashSet<String>,
    slow: HashSet<String>,
    connects: AtomicUsize,
}

impl FakeBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, key: &str, last_modified: DateTime<Utc>) -> Self {
        self.objects.insert(key.to_string(), last_modified);
        self
    }

    /// Key exists but every lookup of it fails with a transport error
    pub fn with_broken(mut self, key: &str) -> Self {
        self.broken.insert(key.to_string());
        self
    }

    /// Key exists but lookups of it never finish
    pub fn with_slow(mut self, key: &str, last_modified: DateTime<Utc>) -> Self {
        self.slow.insert(key.to_string());
        self.with_object(key, last_modified)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct FakeConnector(pub Arc<FakeBucket>);

pub struct FakeStore(Arc<FakeBucket>);

impl StoreConnector for FakeConnector {
    type Store = FakeStore;

    fn connect(&self, _worker_id: usize) -> Result<FakeStore, LookupError> {
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        Ok(FakeStore(Arc::clone(&self.0)))
    }
}

#[async_trait]
impl MetadataStore for FakeStore {
    async fn stat(&self, key: &str) -> Result<ObjectMetadata, LookupError> {
        tokio::task::yield_now().await;
        if self.0.slow.contains(key) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.0.broken.contains(key) {
            return Err(LookupError::Transport {
                key: key.to_string(),
                reason: "connection reset".to_string(),
            });
        }
        self.0
            .objects
            .get(key)
            .map(|t| ObjectMetadata { last_modified: *t })
            .ok_or_else(|| LookupError::NotFound(key.to_string()))
    }
}

pub fn candidate(name: &str, version: &str, arch: &str, specfile: &str) -> CandidateEntry {
    CandidateEntry {
        name: name.to_string(),
        version: version.to_string(),
        specfile_path: specfile.to_string(),
        arch: arch.to_string(),
        os: "ubuntu20.04".to_string(),
        compiler: "gcc@9.3.0".to_string(),
        package_hash: String::new(),
        hash: String::new(),
        full_hash: String::new(),
        build_hash: String::new(),
    }
}

/// 2022-03-<day> 12:00:00 UTC
pub fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 3, day, 12, 0, 0).unwrap()
}
