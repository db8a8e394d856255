//! Primary Tier Module
//!
//! In-memory storage for hot entries. Plain data structure with no interior
//! locking; the engine guards it with its reader-writer lock.

use std::collections::HashMap;

use crate::cache::Entry;

// == Primary Tier ==
/// Fast in-memory tier holding complete entries.
///
/// Every entry in the map is authoritative: a key present here is absent from
/// the shadow index and from durable storage (stale durable copies are
/// unlinked on overwrite). Lifecycle decisions are made by the engine and the
/// janitor; this type only stores and reports.
#[derive(Debug, Default)]
pub struct PrimaryTier {
    /// Key-value storage
    entries: HashMap<String, Entry>,
}

impl PrimaryTier {
    // == Constructor ==
    /// Creates an empty primary tier.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    // == Insert ==
    /// Stores an entry, returning the displaced entry on overwrite.
    pub fn insert(&mut self, key: String, entry: Entry) -> Option<Entry> {
        self.entries.insert(key, entry)
    }

    // == Get ==
    /// Returns a reference to the entry for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    // == Remove ==
    /// Removes and returns the entry for `key`, if present.
    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.entries.remove(key)
    }

    // == Contains ==
    /// Returns true if `key` is resident in this tier.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Demotion Due ==
    /// Returns cloned (key, entry) pairs whose demotion timestamp has been
    /// reached and that are not simultaneously expired.
    ///
    /// Expired entries are excluded so the sweep never writes a record to
    /// durable storage only to delete it in the same pass. The clones let the
    /// janitor perform writes with no lock held and re-validate afterwards.
    ///
    /// # Arguments
    /// * `now` - The sweep's single observation of the clock, in Unix ms
    pub fn demotion_due(&self, now: u64) -> Vec<(String, Entry)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_demote_due_at(now) && !entry.is_expired_at(now))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    // == Expired ==
    /// Returns the keys of all entries expired as of `now`.
    pub fn expired(&self, now: u64) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Length ==
    /// Returns the current number of resident entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if no entries are resident.
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
