//! Cache Module
//!
//! Two-tier caching engine: an in-memory primary tier with timed demotion
//! to a durable secondary tier and promotion back to memory on read.

mod engine;
mod entry;
mod primary;
mod shadow;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use engine::{SweepSummary, Tier, TieredCache};
pub use entry::Entry;
pub use primary::PrimaryTier;
pub use shadow::ShadowIndex;
pub use stats::{EngineStats, StatusSnapshot};

// The janitor task drives sweeps through the shared engine state
pub(crate) use engine::CacheInner;
