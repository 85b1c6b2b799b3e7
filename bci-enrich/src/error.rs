//! Error types for bci-enrich
//!
//! A [`LookupError`] is always scoped to one candidate. It is logged and
//! recorded as a failure, never propagated to abort the batch.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single metadata lookup
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Object does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Lookup did not finish within the configured timeout
    #[error("Lookup timed out after {after:?}: {key}")]
    Timeout { key: String, after: Duration },

    /// Worker could not create its store client
    #[error("Store connection failed: {0}")]
    Connect(String),

    /// Network, auth or service error
    #[error("Lookup failed for {key}: {reason}")]
    Transport { key: String, reason: String },

    /// Store answered without a modification time
    #[error("No last-modified time returned for {0}")]
    MissingTimestamp(String),

    /// Worker ended before reporting a result for this key
    #[error("Lookup abandoned: {0}")]
    Abandoned(String),
}
