//! Event sources.
//!
//! Defines the `EventSource` trait every provider integration implements,
//! and provides:
//! - `StaticSource`: fixed in-memory records
//! - `SnapshotSource`: a JSON snapshot file captured from a provider

pub mod memory;
pub mod snapshot;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{EventRecord, Sport};

pub use memory::StaticSource;
pub use snapshot::SnapshotSource;

/// Abstraction over one provider's event listings.
///
/// Implementors only fetch and extract; normalization, matching and merging
/// happen downstream. An empty result is valid and not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch this provider's listings for one sport, tagged with `name()`.
    async fn fetch(&self, sport: Sport) -> Result<Vec<EventRecord>>;

    /// Provider name for logging and merge bookkeeping.
    fn name(&self) -> &str;
}

/// Tag records with the provider name where the source left it empty.
pub(crate) fn tag_provider(records: &mut [EventRecord], provider: &str) {
    for record in records.iter_mut().filter(|r| r.provider.is_empty()) {
        record.provider = provider.to_string();
    }
}
