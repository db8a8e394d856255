//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with expiration and
//! demotion timers.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A single cache entry: an opaque payload plus its lifecycle timestamps.
///
/// Exactly one tier holds an entry at any instant. The engine moves whole
/// entries between tiers; the payload itself is never inspected. The struct
/// is also the durable record format for the secondary tier, so it derives
/// serde both ways.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The stored value; arbitrary JSON, treated as opaque
    pub value: Value,
    /// Creation or last-overwrite timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = never expires
    pub expires_at: Option<u64>,
    /// Demotion-eligibility timestamp (Unix milliseconds), None = stays in
    /// the primary tier until expired or deleted
    pub demote_at: Option<u64>,
}

impl Entry {
    // == Constructor ==
    /// Creates a new entry, converting the caller's relative TTLs into
    /// absolute timestamps at this instant.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `expire_ttl` - Time until permanent deletion; None = never
    /// * `transfer_ttl` - Time until demotion eligibility; None = never
    pub fn new(value: Value, expire_ttl: Option<Duration>, transfer_ttl: Option<Duration>) -> Self {
        let now = current_timestamp_ms();

        Self {
            value,
            created_at: now,
            expires_at: expire_ttl.map(|ttl| now + ttl.as_millis() as u64),
            demote_at: transfer_ttl.map(|ttl| now + ttl.as_millis() as u64),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired at the given instant.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so
    /// the moment the TTL has fully elapsed the entry is gone. Entries
    /// without an expiration timestamp never expire.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Checks whether the entry has expired as of the current clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Is Demotion Due ==
    /// Checks whether the entry is eligible for transfer to the secondary
    /// tier at the given instant. Same boundary rule as expiration; entries
    /// without a demotion timestamp are never demoted automatically.
    pub fn is_demote_due_at(&self, now: u64) -> bool {
        match self.demote_at {
            Some(due) => now >= due,
            None => false,
        }
    }

    /// Checks whether demotion is due as of the current clock.
    pub fn is_demote_due(&self) -> bool {
        self.is_demote_due_at(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation_no_timers() {
        let entry = Entry::new(json!("test_value"), None, None);

        assert_eq!(entry.value, json!("test_value"));
        assert!(entry.expires_at.is_none());
        assert!(entry.demote_at.is_none());
        assert!(!entry.is_expired());
        assert!(!entry.is_demote_due());
    }

    #[test]
    fn test_entry_creation_with_timers() {
        let entry = Entry::new(
            json!({"nested": [1, 2, 3]}),
            Some(Duration::from_secs(60)),
            Some(Duration::from_secs(30)),
        );

        assert!(entry.expires_at.is_some());
        assert!(entry.demote_at.is_some());
        assert!(!entry.is_expired());
        assert!(!entry.is_demote_due());
        // Demotion fires before expiration when its TTL is shorter
        assert!(entry.demote_at.unwrap() < entry.expires_at.unwrap());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let entry = Entry {
            value: json!("test"),
            created_at: now,
            expires_at: Some(now),
            demote_at: None,
        };

        // Expired when now >= expires_at
        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
        assert!(!entry.is_expired_at(now - 1));
    }

    #[test]
    fn test_demotion_boundary_condition() {
        let now = current_timestamp_ms();
        let entry = Entry {
            value: json!("test"),
            created_at: now,
            expires_at: None,
            demote_at: Some(now + 500),
        };

        assert!(!entry.is_demote_due_at(now));
        assert!(entry.is_demote_due_at(now + 500));
        assert!(entry.is_demote_due_at(now + 501));
    }

    #[test]
    fn test_immortal_entry_never_expires() {
        let entry = Entry::new(json!(42), None, Some(Duration::from_millis(1)));

        // Demotion-only entries survive arbitrarily far into the future
        assert!(!entry.is_expired_at(u64::MAX));
        assert!(entry.is_demote_due_at(u64::MAX));
    }

    #[test]
    fn test_durable_record_round_trip() {
        let entry = Entry::new(
            json!({"a": 1, "b": "two"}),
            Some(Duration::from_secs(10)),
            Some(Duration::from_secs(5)),
        );

        let bytes = serde_json::to_vec(&entry).unwrap();
        let restored: Entry = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(restored, entry);
    }

    #[test]
    fn test_record_field_names_are_stable() {
        // The serialized entry is the on-disk record format; guard the names.
        let entry = Entry::new(json!("v"), Some(Duration::from_secs(1)), None);
        let json = serde_json::to_value(&entry).unwrap();

        assert!(json.get("value").is_some());
        assert!(json.get("created_at").is_some());
        assert!(json.get("expires_at").is_some());
        assert!(json.get("demote_at").is_some());
    }
}
