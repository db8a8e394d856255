//! Tiercache - A two-tier key/value cache server
//!
//! Keeps hot entries in a fast in-memory tier, demotes cooling entries to
//! durable per-key storage on a timer, and promotes them back on read.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::TieredCache;
pub use config::Config;
pub use storage::{FileStore, SecondaryStore};
