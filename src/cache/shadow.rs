//! Shadow Index Module
//!
//! In-memory index over entries resident in the secondary tier. Keeps just
//! enough metadata (the expiration timestamp) to answer existence checks and
//! expire entries without reading durable records back.

use std::collections::HashMap;

// == Shadow Index ==
/// Map of secondary-resident keys to their expiration timestamps.
///
/// An absent key means the entry is not in the secondary tier; a present key
/// with `None` means it is durable and never expires. The index is the sole
/// authority on secondary membership: lookups never touch the store for keys
/// missing here, so a durable file without a slot is unreachable.
#[derive(Debug, Default)]
pub struct ShadowIndex {
    /// Key to expiration timestamp (Unix ms); None = never expires
    slots: HashMap<String, Option<u64>>,
}

impl ShadowIndex {
    // == Constructor ==
    /// Creates an empty shadow index.
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    // == Insert ==
    /// Records that `key` is resident in the secondary tier.
    pub fn insert(&mut self, key: String, expires_at: Option<u64>) {
        self.slots.insert(key, expires_at);
    }

    // == Remove ==
    /// Forgets `key`, returning true if a slot existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.slots.remove(key).is_some()
    }

    // == Contains ==
    /// Returns true if `key` has a shadow slot.
    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    // == Expires At ==
    /// Returns the expiration timestamp recorded for `key`.
    ///
    /// Outer `None` means the key has no slot at all; inner `None` means the
    /// slot exists and never expires.
    pub fn expires_at(&self, key: &str) -> Option<Option<u64>> {
        self.slots.get(key).copied()
    }

    // == Is Expired At ==
    /// Returns true if `key` has a slot whose timestamp has been reached.
    /// Absent keys and immortal slots are never expired.
    pub fn is_expired_at(&self, key: &str, now: u64) -> bool {
        matches!(self.slots.get(key), Some(Some(expires)) if now >= *expires)
    }

    // == Expired ==
    /// Returns the keys of all slots expired as of `now`.
    pub fn expired(&self, now: u64) -> Vec<String> {
        self.slots
            .iter()
            .filter(|(_, expires_at)| matches!(expires_at, Some(expires) if now >= *expires))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Length ==
    /// Returns the number of secondary-resident keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    // == Is Empty ==
    /// Returns true if no keys are secondary-resident.
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
