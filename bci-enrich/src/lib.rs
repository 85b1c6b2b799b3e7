//! bci-enrich library interface
//!
//! Enrichment stage of the build cache inventory: stat every candidate spec
//! object through a bounded worker pool, keep the successes, and group them
//! into the inventory document.

pub mod enrich;
pub mod error;
pub mod grouping;
pub mod pool;
pub mod store;

pub use crate::enrich::{enrich_entry, Enricher, Enrichment, LookupFailure};
pub use crate::error::LookupError;
pub use crate::grouping::{build_inventory, group_and_sort};
pub use crate::pool::{LookupJob, LookupPool, LookupResult};
pub use crate::store::{MetadataStore, ObjectMetadata, StoreConnector};
