//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. The TTL and interval values use zero to mean "disabled".
#[derive(Debug, Clone)]
pub struct Config {
    /// Default expiration TTL in seconds for Set calls without one (0 = never)
    pub default_expire_ttl: u64,
    /// Default demotion TTL in seconds for Set calls without one (0 = never)
    pub default_transfer_ttl: u64,
    /// Seconds between janitor sweeps (0 = janitor disabled)
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Root directory for the secondary tier's record files
    pub data_dir: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_EXPIRE_TTL` - Default expiration TTL in seconds (default: 300)
    /// - `DEFAULT_TRANSFER_TTL` - Default demotion TTL in seconds (default: 60)
    /// - `SWEEP_INTERVAL` - Janitor sweep frequency in seconds (default: 1)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DATA_DIR` - Secondary tier directory (default: cache-data)
    pub fn from_env() -> Self {
        Self {
            default_expire_ttl: env::var("DEFAULT_EXPIRE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            default_transfer_ttl: env::var("DEFAULT_TRANSFER_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "cache-data".to_string()),
        }
    }

    // == Engine Accessors ==
    /// Default expiration TTL as the engine expects it; zero becomes None.
    pub fn default_expire_ttl(&self) -> Option<Duration> {
        duration_or_none(self.default_expire_ttl)
    }

    /// Default demotion TTL as the engine expects it; zero becomes None.
    pub fn default_transfer_ttl(&self) -> Option<Duration> {
        duration_or_none(self.default_transfer_ttl)
    }

    /// Sweep interval as the engine expects it; zero becomes None.
    pub fn sweep_interval(&self) -> Option<Duration> {
        duration_or_none(self.sweep_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_expire_ttl: 300,
            default_transfer_ttl: 60,
            sweep_interval: 1,
            server_port: 3000,
            data_dir: "cache-data".to_string(),
        }
    }
}

/// Maps the zero-means-disabled convention onto Option.
fn duration_or_none(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}
