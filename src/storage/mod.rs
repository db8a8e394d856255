//! Storage Module
//!
//! Durable persistence for the secondary tier: the backend trait and the
//! default file-per-key implementation.

mod file;
mod secondary;

// Re-export public types
pub use file::FileStore;
pub use secondary::SecondaryStore;

// == Public Constants ==
/// Maximum allowed key length in bytes (common file-name limit)
pub const MAX_KEY_LENGTH: usize = 255;
