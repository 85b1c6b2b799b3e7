//! Remote store seam
//!
//! The pool never shares a store between workers: each worker asks the
//! [`StoreConnector`] for its own [`MetadataStore`] the first time it needs
//! one and keeps it until the worker exits.

pub mod s3;

use crate::error::LookupError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use s3::{S3Connector, S3Store};

/// Metadata returned by a successful lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub last_modified: DateTime<Utc>,
}

/// Look up object metadata by full key
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Fails with [`LookupError::NotFound`] when the key does not exist
    async fn stat(&self, key: &str) -> Result<ObjectMetadata, LookupError>;
}

/// Creates one store client per worker
pub trait StoreConnector: Send + Sync + 'static {
    type Store: MetadataStore + 'static;

    fn connect(&self, worker_id: usize) -> Result<Self::Store, LookupError>;
}
