//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Janitor: Demotes and expires cache entries at configured intervals

mod janitor;

pub use janitor::spawn_janitor;
