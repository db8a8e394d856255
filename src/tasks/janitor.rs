//! Janitor Task
//!
//! Background task that periodically demotes due entries to the secondary
//! tier and removes expired entries from both tiers.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheInner;

/// Spawns the background janitor for an engine.
///
/// The task sleeps for the sweep interval, then runs one sweep: a transfer
/// pass moving demotion-due entries to the secondary tier, followed by an
/// expiration pass removing dead entries from both tiers. It keeps running
/// through empty sweeps and per-key failures alike.
///
/// The task holds only a weak reference to the engine, so dropping the last
/// cache handle ends it on its own; `shutdown` ends it deterministically by
/// aborting through the returned handle.
///
/// # Arguments
/// * `engine` - Weak reference to the shared engine state
/// * `interval` - Time between sweep starts
///
/// # Returns
/// A JoinHandle for the spawned task, used to abort it during shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_janitor(Arc::downgrade(&inner), Duration::from_secs(1));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_janitor(engine: Weak<CacheInner>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting janitor with sweep interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            // A failed upgrade means the engine is gone
            let Some(engine) = engine.upgrade() else {
                debug!("Engine dropped; janitor exiting");
                break;
            };

            let summary = engine.run_sweep().await;

            if summary.is_quiet() {
                debug!("Sweep found nothing to do");
            } else {
                info!(
                    demoted = summary.demoted,
                    expired_primary = summary.expired_primary,
                    expired_secondary = summary.expired_secondary,
                    failures = summary.failures,
                    "Sweep completed"
                );
            }
        }
    })
}
