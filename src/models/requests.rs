//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store; arbitrary JSON
/// - `expire_ttl`: Optional seconds until permanent deletion (0 = never)
/// - `transfer_ttl`: Optional seconds until demotion eligibility (0 = never)
///
/// Omitted TTLs fall back to the server's configured defaults. Key validity
/// is the engine's concern; the DTO carries the fields verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional expiration TTL in seconds
    #[serde(default)]
    pub expire_ttl: Option<u64>,
    /// Optional demotion TTL in seconds
    #[serde(default)]
    pub transfer_ttl: Option<u64>,
}
