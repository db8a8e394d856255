//! Secondary Store Trait
//!
//! Capability boundary for the durable tier. The engine moves whole entries
//! across this interface and never assumes a particular backend.

use async_trait::async_trait;

use crate::cache::Entry;
use crate::error::Result;

// == Secondary Store ==
/// Durable single-entry persistence, keyed by the cache key.
///
/// Implementations must be safe to call concurrently; the engine performs
/// batch I/O with its tier lock released, so calls for different keys can
/// overlap. All operations are whole-record: there is no partial update.
#[async_trait]
pub trait SecondaryStore: Send + Sync + 'static {
    /// Backend label for logs.
    ///
    /// # Example
    /// - "file"
    /// - "memory"
    fn name(&self) -> &'static str;

    /// Rejects keys unsafe for this backend's naming scheme.
    ///
    /// Called by the engine before a key enters either tier, so a key the
    /// backend cannot persist is refused up front rather than discovered at
    /// demotion time. The default accepts everything.
    fn validate_key(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    /// Persists the full entry under `key`, replacing any previous record.
    ///
    /// Must be atomic from the caller's point of view: a concurrent read
    /// sees either the old record or the new one, never a partial write.
    async fn write(&self, key: &str, entry: &Entry) -> Result<()>;

    /// Loads the record for `key`; `Ok(None)` when no record exists.
    ///
    /// A record that exists but cannot be read or decoded is an error, not
    /// an absence.
    async fn read(&self, key: &str) -> Result<Option<Entry>>;

    /// Removes the record for `key`; `Ok(false)` when none existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Cheap existence probe, used for diagnostics.
    async fn contains(&self, key: &str) -> bool;
}
