//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::TieredCache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse, StatusResponse,
};
use crate::storage::FileStore;

/// Application state shared across all handlers.
///
/// The engine handle is itself cheap to clone, so the state is just a thin
/// wrapper around it.
#[derive(Clone)]
pub struct AppState {
    /// The tiered cache engine
    pub cache: TieredCache,
}

impl AppState {
    /// Creates a new AppState over an existing engine.
    pub fn new(cache: TieredCache) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the file-backed secondary store under the configured data
    /// directory and the engine on top of it; the janitor starts here when
    /// the sweep interval is non-zero.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(FileStore::new(&config.data_dir)?);
        let cache = TieredCache::new(
            config.default_transfer_ttl(),
            config.sweep_interval(),
            config.default_expire_ttl(),
            store,
        );
        Ok(Self::new(cache))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair; invalid keys are rejected before any tier is
/// touched. TTLs arrive in seconds and may be omitted to use the server
/// defaults.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    state
        .cache
        .set(
            &req.key,
            req.value,
            req.expire_ttl.map(Duration::from_secs),
            req.transfer_ttl.map(Duration::from_secs),
        )
        .await?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from whichever tier holds it. Absent and expired keys
/// are both a plain 404; callers cannot tell them apart.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from whichever tier holds it.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.delete(&key).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /status
///
/// Returns tier sizes and engine counters.
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.cache.status().await;

    Json(StatusResponse::new(snapshot))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
