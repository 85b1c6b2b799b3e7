//! Enrichment engine
//!
//! Fans one metadata lookup per candidate out across the [`LookupPool`],
//! converts successful lookups into [`EnrichedEntry`] values and drops
//! failures. Failures are kept only as a list of keys and reasons for
//! reporting; they never reach the inventory.

use crate::error::LookupError;
use crate::pool::{LookupJob, LookupPool, LookupResult};
use crate::store::{ObjectMetadata, StoreConnector};
use bci_common::time::{EpochMode, ModificationTime};
use bci_common::{CandidateEntry, EnrichedEntry};
use tracing::info;

/// A candidate whose lookup failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    pub key: String,
    pub error: LookupError,
}

/// Result of one enrichment pass
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    /// Successful lookups, in candidate order
    pub entries: Vec<EnrichedEntry>,
    pub failures: Vec<LookupFailure>,
    /// Newest modification time among `entries`
    pub latest: Option<ModificationTime>,
}

impl Enrichment {
    /// Pair lookup results with their candidates
    ///
    /// `results` may arrive in any order and may be missing indices (a worker
    /// that died); a missing result counts as a failure.
    pub fn collect(
        candidates: Vec<CandidateEntry>,
        keys: &[String],
        results: Vec<LookupResult>,
        mode: EpochMode,
    ) -> Self {
        let mut outcomes: Vec<Option<Result<ObjectMetadata, LookupError>>> =
            vec![None; candidates.len()];
        for result in results {
            if let Some(slot) = outcomes.get_mut(result.index) {
                *slot = Some(result.outcome);
            }
        }

        let mut entries = Vec::new();
        let mut failures = Vec::new();
        for ((candidate, outcome), key) in candidates.into_iter().zip(outcomes).zip(keys) {
            match outcome {
                Some(Ok(metadata)) => entries.push(enrich_entry(candidate, &metadata, mode)),
                Some(Err(error)) => failures.push(LookupFailure {
                    key: key.clone(),
                    error,
                }),
                None => failures.push(LookupFailure {
                    key: key.clone(),
                    error: LookupError::Abandoned(key.clone()),
                }),
            }
        }

        let latest = newest(&entries);
        Self {
            entries,
            failures,
            latest,
        }
    }

    /// Newest `last_modified`, or -1 when nothing succeeded
    pub fn max_timestamp(&self) -> f64 {
        self.latest.as_ref().map(|t| t.epoch).unwrap_or(-1.0)
    }

    /// Pretty form of the newest `last_modified`, or "" when nothing succeeded
    pub fn max_timestamp_pretty(&self) -> &str {
        self.latest.as_ref().map(|t| t.pretty.as_str()).unwrap_or("")
    }

    pub fn success_count(&self) -> usize {
        self.entries.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

/// First entry with the greatest `last_modified`
fn newest(entries: &[EnrichedEntry]) -> Option<ModificationTime> {
    let mut best: Option<&EnrichedEntry> = None;
    for entry in entries {
        if best.map_or(true, |b| entry.last_modified > b.last_modified) {
            best = Some(entry);
        }
    }
    best.map(|e| ModificationTime {
        epoch: e.last_modified,
        pretty: e.last_modified_pretty.clone(),
    })
}

/// Attach modification time and grouping key to a candidate
pub fn enrich_entry(candidate: CandidateEntry, metadata: &ObjectMetadata, mode: EpochMode) -> EnrichedEntry {
    let time = ModificationTime::from_utc(metadata.last_modified, mode);
    let versioned_name = candidate.versioned_name();
    EnrichedEntry {
        spec: candidate,
        last_modified: time.epoch,
        last_modified_pretty: time.pretty,
        versioned_name,
    }
}

/// Runs one enrichment pass against a store
pub struct Enricher<C: StoreConnector> {
    pool: LookupPool<C>,
    key_prefix: String,
    epoch_mode: EpochMode,
}

impl<C: StoreConnector> Enricher<C> {
    pub fn new(pool: LookupPool<C>, key_prefix: impl Into<String>, epoch_mode: EpochMode) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.into(),
            epoch_mode,
        }
    }

    pub fn pool(&self) -> &LookupPool<C> {
        &self.pool
    }

    /// Full object key for a candidate
    pub fn object_key(&self, candidate: &CandidateEntry) -> String {
        format!("{}{}", self.key_prefix, candidate.specfile_path)
    }

    /// Look up every candidate once; no retries
    pub async fn enrich(&self, candidates: Vec<CandidateEntry>) -> Enrichment {
        let keys: Vec<String> = candidates.iter().map(|c| self.object_key(c)).collect();
        let jobs = keys
            .iter()
            .enumerate()
            .map(|(index, key)| LookupJob {
                index,
                key: key.clone(),
            })
            .collect();

        info!(
            candidates = candidates.len(),
            workers = self.pool.worker_count(),
            "Starting metadata lookups"
        );

        let results = self.pool.run(jobs).await;
        let enrichment = Enrichment::collect(candidates, &keys, results, self.epoch_mode);

        info!(
            succeeded = enrichment.success_count(),
            failed = enrichment.failed_count(),
            "Metadata lookups complete"
        );
        enrichment
    }
}
