//! Cache Engine Module
//!
//! The tiered cache facade: composes the primary tier, shadow index,
//! secondary store, and janitor behind Set/Get/Delete/Status.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{EngineStats, Entry, PrimaryTier, ShadowIndex, StatusSnapshot};
use crate::error::{CacheError, Result};
use crate::storage::SecondaryStore;
use crate::tasks::spawn_janitor;

// == Tier ==
/// Which tier currently holds a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Resident in memory
    Primary,
    /// Resident in durable storage, tracked by the shadow index
    Secondary,
}

// == Sweep Summary ==
/// What a single sweep accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Entries transferred to the secondary tier
    pub demoted: usize,
    /// Expired entries removed from the primary tier
    pub expired_primary: usize,
    /// Expired entries removed from the secondary tier
    pub expired_secondary: usize,
    /// Per-key storage failures left for the next tick
    pub failures: usize,
}

impl SweepSummary {
    /// Returns true if the sweep changed nothing and hit no failures.
    pub fn is_quiet(&self) -> bool {
        self.demoted == 0
            && self.expired_primary == 0
            && self.expired_secondary == 0
            && self.failures == 0
    }
}

// == Tier State ==
/// Both in-memory tier structures, guarded together by one lock so every
/// cross-tier transition is a single atomic step to observers.
#[derive(Debug)]
struct TierState {
    primary: PrimaryTier,
    shadow: ShadowIndex,
}

// == Cache Inner ==
/// Shared engine state behind the facade's `Arc`.
pub(crate) struct CacheInner {
    /// Primary tier and shadow index under the single reader-writer lock
    tiers: RwLock<TierState>,
    /// Durable backend for demoted entries
    secondary: Arc<dyn SecondaryStore>,
    /// Activity counters, outside the lock
    stats: EngineStats,
    /// Fallback expiration TTL applied when Set passes None
    default_expire_ttl: Option<Duration>,
    /// Fallback demotion TTL applied when Set passes None
    default_transfer_ttl: Option<Duration>,
    /// Serializes sweeps so two can never interleave
    sweep_lock: Mutex<()>,
    /// Handle of the background janitor, if one was spawned
    janitor: StdMutex<Option<JoinHandle<()>>>,
}

impl CacheInner {
    // == Run Sweep ==
    /// One full janitor tick: transfer pass, then expiration pass.
    ///
    /// The tier lock is never held across a batch of durable I/O. Each pass
    /// snapshots its candidates, works with the lock released, then
    /// reacquires it exclusively and re-validates before committing, so an
    /// entry overwritten or deleted mid-flight is left exactly as the caller
    /// put it. One key's failure is counted and logged, never propagated.
    pub(crate) async fn run_sweep(&self) -> SweepSummary {
        let _sweep = self.sweep_lock.lock().await;
        let now = current_timestamp_ms();
        let mut summary = SweepSummary::default();

        // == Transfer pass ==
        let candidates = {
            let tiers = self.tiers.read().await;
            tiers.primary.demotion_due(now)
        };

        for (key, snapshot) in candidates {
            match self.secondary.write(&key, &snapshot).await {
                Ok(()) => {
                    let mut tiers = self.tiers.write().await;
                    // The entry may have been overwritten or deleted while
                    // the write ran unlocked; only an unchanged entry moves.
                    let unchanged = tiers.primary.get(&key) == Some(&snapshot);
                    if unchanged {
                        tiers.primary.remove(&key);
                        tiers.shadow.insert(key.clone(), snapshot.expires_at);
                        drop(tiers);
                        self.stats.record_demotion();
                        summary.demoted += 1;
                        debug!(key = %key, "Demoted entry to secondary tier");
                    } else {
                        drop(tiers);
                        // The record just written belongs to a superseded
                        // entry; unlink it before it can shadow the new one.
                        if let Err(e) = self.secondary.delete(&key).await {
                            self.stats.record_storage_failure();
                            summary.failures += 1;
                            warn!(
                                key = %key,
                                error = %e,
                                "Failed to unlink stale record after aborted demotion"
                            );
                        }
                    }
                }
                Err(e) => {
                    self.stats.record_storage_failure();
                    summary.failures += 1;
                    warn!(
                        key = %key,
                        error = %e,
                        "Demotion write failed; entry stays in primary tier"
                    );
                }
            }
        }

        // == Expiration pass: primary tier ==
        {
            let mut tiers = self.tiers.write().await;
            for key in tiers.primary.expired(now) {
                tiers.primary.remove(&key);
                self.stats.record_expiration();
                summary.expired_primary += 1;
                debug!(key = %key, "Expired entry removed from primary tier");
            }
        }

        // == Expiration pass: secondary tier ==
        let expired = {
            let tiers = self.tiers.read().await;
            tiers.shadow.expired(now)
        };

        for key in expired {
            match self.secondary.delete(&key).await {
                Ok(_) => {
                    let mut tiers = self.tiers.write().await;
                    // The slot falls only while it still marks the expired
                    // record; a concurrent Set or lazy expiration may have
                    // already claimed the key.
                    if tiers.shadow.is_expired_at(&key, now) {
                        tiers.shadow.remove(&key);
                        self.stats.record_expiration();
                        summary.expired_secondary += 1;
                        debug!(key = %key, "Expired entry removed from secondary tier");
                    }
                }
                Err(e) => {
                    // Slot retained; the next tick retries the delete
                    self.stats.record_storage_failure();
                    summary.failures += 1;
                    warn!(
                        key = %key,
                        error = %e,
                        "Expired record delete failed; slot retained for retry"
                    );
                }
            }
        }

        summary
    }
}

impl Drop for CacheInner {
    fn drop(&mut self) {
        // The janitor also exits on its own once its weak upgrade fails;
        // aborting here just ends it without waiting for the next tick.
        if let Ok(mut guard) = self.janitor.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}

// == Tiered Cache ==
/// Two-tier cache facade; cheap to clone and share.
///
/// Entries live in the in-memory primary tier until their demotion timer
/// elapses, then move whole into the secondary store until they are read
/// again (promotion) or expire. A background janitor drives the moves; all
/// tier state sits behind one reader-writer lock.
#[derive(Clone)]
pub struct TieredCache {
    inner: Arc<CacheInner>,
}

impl TieredCache {
    // == Constructor ==
    /// Creates a cache over the given secondary store and starts the
    /// janitor when a sweep interval is supplied.
    ///
    /// A `None` or zero duration disables the corresponding behavior: no
    /// default demotion, no janitor, no default expiration.
    ///
    /// # Arguments
    /// * `default_transfer_ttl` - Demotion TTL applied when Set passes None
    /// * `sweep_interval` - Time between janitor ticks; None = no janitor
    /// * `default_expire_ttl` - Expiration TTL applied when Set passes None
    /// * `secondary` - Durable backend for demoted entries
    pub fn new(
        default_transfer_ttl: Option<Duration>,
        sweep_interval: Option<Duration>,
        default_expire_ttl: Option<Duration>,
        secondary: Arc<dyn SecondaryStore>,
    ) -> Self {
        let inner = Arc::new(CacheInner {
            tiers: RwLock::new(TierState {
                primary: PrimaryTier::new(),
                shadow: ShadowIndex::new(),
            }),
            secondary,
            stats: EngineStats::new(),
            default_expire_ttl: default_expire_ttl.filter(|ttl| !ttl.is_zero()),
            default_transfer_ttl: default_transfer_ttl.filter(|ttl| !ttl.is_zero()),
            sweep_lock: Mutex::new(()),
            janitor: StdMutex::new(None),
        });

        if let Some(interval) = sweep_interval.filter(|i| !i.is_zero()) {
            let handle = spawn_janitor(Arc::downgrade(&inner), interval);
            if let Ok(mut guard) = inner.janitor.lock() {
                *guard = Some(handle);
            }
        }

        Self { inner }
    }

    // == Set ==
    /// Stores a value, resetting the key into the primary tier.
    ///
    /// The key is checked against the backend's naming scheme before any
    /// tier is touched. Both timers are recomputed from this call; any copy
    /// a previous demotion left in the secondary tier is invalidated under
    /// the same lock hold, so no moment exists where both tiers hold the
    /// key.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - Arbitrary JSON payload
    /// * `expire_ttl` - Time until permanent deletion; None = instance
    ///   default, zero = never
    /// * `transfer_ttl` - Time until demotion eligibility; None = instance
    ///   default, zero = never
    pub async fn set(
        &self,
        key: &str,
        value: Value,
        expire_ttl: Option<Duration>,
        transfer_ttl: Option<Duration>,
    ) -> Result<()> {
        self.inner.secondary.validate_key(key)?;

        let entry = Entry::new(
            value,
            resolve_ttl(expire_ttl, self.inner.default_expire_ttl),
            resolve_ttl(transfer_ttl, self.inner.default_transfer_ttl),
        );

        let mut tiers = self.inner.tiers.write().await;
        tiers.primary.insert(key.to_string(), entry);
        if tiers.shadow.remove(key) {
            // The stale durable copy must be gone before the lock releases,
            // or a later sweep failure could resurrect the old value.
            if let Err(e) = self.inner.secondary.delete(key).await {
                self.inner.stats.record_storage_failure();
                warn!(
                    key = %key,
                    error = %e,
                    "Failed to unlink stale secondary copy on overwrite"
                );
            }
        }
        debug!(key = %key, "Stored entry in primary tier");

        Ok(())
    }

    // == Get ==
    /// Retrieves a value from whichever tier holds it.
    ///
    /// A primary hit stays entirely under the shared lock. Lazy expiration
    /// and promotion-on-read upgrade to the exclusive lock and re-check the
    /// key, since the world may change between lock modes. Returns `None`
    /// for absent and expired keys alike.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let now = current_timestamp_ms();

        {
            let tiers = self.inner.tiers.read().await;
            match tiers.primary.get(key) {
                Some(entry) if !entry.is_expired_at(now) => {
                    let value = entry.value.clone();
                    self.inner.stats.record_hit();
                    return Some(value);
                }
                Some(_) => {} // expired in place; handled below
                None => {
                    if !tiers.shadow.contains(key) {
                        self.inner.stats.record_miss();
                        return None;
                    }
                }
            }
        }

        self.get_slow(key).await
    }

    /// Exclusive-lock half of Get: lazy expiration and promotion.
    async fn get_slow(&self, key: &str) -> Option<Value> {
        let now = current_timestamp_ms();
        let mut tiers = self.inner.tiers.write().await;

        // Re-check the primary tier under the exclusive lock
        if let Some(entry) = tiers.primary.get(key) {
            if entry.is_expired_at(now) {
                tiers.primary.remove(key);
                self.inner.stats.record_expiration();
                self.inner.stats.record_miss();
                debug!(key = %key, "Lazily expired entry from primary tier");
                return None;
            }
            let value = entry.value.clone();
            self.inner.stats.record_hit();
            return Some(value);
        }

        let Some(expires_at) = tiers.shadow.expires_at(key) else {
            self.inner.stats.record_miss();
            return None;
        };

        if matches!(expires_at, Some(expires) if now >= expires) {
            // Lazy expiration of a demoted entry: the durable record goes
            // first, and the slot falls only once the delete succeeded.
            match self.inner.secondary.delete(key).await {
                Ok(_) => {
                    tiers.shadow.remove(key);
                    self.inner.stats.record_expiration();
                    debug!(key = %key, "Lazily expired entry from secondary tier");
                }
                Err(e) => {
                    self.inner.stats.record_storage_failure();
                    warn!(
                        key = %key,
                        error = %e,
                        "Expired record delete failed; slot retained for retry"
                    );
                }
            }
            self.inner.stats.record_miss();
            return None;
        }

        // Promotion: pull the whole entry back into the primary tier,
        // timers unchanged.
        match self.inner.secondary.read(key).await {
            Ok(Some(entry)) => {
                let value = entry.value.clone();
                tiers.primary.insert(key.to_string(), entry);
                tiers.shadow.remove(key);
                if let Err(e) = self.inner.secondary.delete(key).await {
                    // The orphaned record is unreachable (lookups consult
                    // the shadow index first) and any later demotion of this
                    // key overwrites it.
                    self.inner.stats.record_storage_failure();
                    warn!(
                        key = %key,
                        error = %e,
                        "Failed to unlink record after promotion"
                    );
                }
                self.inner.stats.record_hit();
                self.inner.stats.record_promotion();
                debug!(key = %key, "Promoted entry to primary tier");
                Some(value)
            }
            Ok(None) => {
                // Slot without a record: heal the index and report a miss
                tiers.shadow.remove(key);
                self.inner.stats.record_miss();
                warn!(key = %key, "Shadow slot had no durable record; slot dropped");
                None
            }
            Err(e) => {
                // Slot retained; the record may become readable again
                self.inner.stats.record_storage_failure();
                self.inner.stats.record_miss();
                warn!(key = %key, error = %e, "Promotion read failed");
                None
            }
        }
    }

    // == Delete ==
    /// Removes a key from whichever tier holds it.
    ///
    /// Returns `NotFound` when neither tier has the key. A durable delete
    /// failure surfaces as `Storage` and keeps the shadow slot, so the entry
    /// stays deletable.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.inner.secondary.validate_key(key)?;

        let mut tiers = self.inner.tiers.write().await;

        if tiers.primary.remove(key).is_some() {
            debug!(key = %key, "Deleted entry from primary tier");
            return Ok(());
        }

        if !tiers.shadow.contains(key) {
            return Err(CacheError::NotFound(key.to_string()));
        }

        match self.inner.secondary.delete(key).await {
            Ok(_) => {
                tiers.shadow.remove(key);
                debug!(key = %key, "Deleted entry from secondary tier");
                Ok(())
            }
            Err(e) => {
                self.inner.stats.record_storage_failure();
                Err(e)
            }
        }
    }

    // == Status ==
    /// Returns a point-in-time snapshot of tier sizes and counters.
    pub async fn status(&self) -> StatusSnapshot {
        let tiers = self.inner.tiers.read().await;
        self.inner
            .stats
            .snapshot(tiers.primary.len(), tiers.shadow.len())
    }

    // == Locate ==
    /// Reports which tier holds `key`, without touching timers or stats.
    pub async fn locate(&self, key: &str) -> Option<Tier> {
        let tiers = self.inner.tiers.read().await;
        if tiers.primary.contains(key) {
            Some(Tier::Primary)
        } else if tiers.shadow.contains(key) {
            Some(Tier::Secondary)
        } else {
            None
        }
    }

    // == Sweep ==
    /// Runs one janitor tick on demand.
    ///
    /// Identical to what the background task does every interval; exposed
    /// so callers can drive demotion and expiration deterministically.
    pub async fn sweep(&self) -> SweepSummary {
        self.inner.run_sweep().await
    }

    // == Shutdown ==
    /// Stops the janitor and waits for it to finish.
    ///
    /// No sweep starts after this returns. Safe to call more than once and
    /// with no janitor running.
    pub async fn shutdown(&self) {
        let handle = match self.inner.janitor.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };

        if let Some(handle) = handle {
            handle.abort();
            // Cancellation is the expected outcome here
            let _ = handle.await;
            info!("Janitor stopped");
        }
    }
}

// == Utility Functions ==
/// Applies the instance default, then maps a zero duration to "never".
fn resolve_ttl(requested: Option<Duration>, default: Option<Duration>) -> Option<Duration> {
    requested.or(default).filter(|ttl| !ttl.is_zero())
}
