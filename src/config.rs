//! Configuration Module
//!
//! Loads server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cacher::{CacherConfig, DEFAULT_PREFIX};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Key prefix for every cacher the server builds
    pub cache_prefix: String,
    /// TTL in seconds for cached results; 0 keeps them until invalidated
    pub cache_ttl: u64,
    /// Maximum number of entries the in-memory store can hold
    pub max_entries: usize,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// JSON file with `{ "Entity": [records] }` to load into the data source
    pub fixtures_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PREFIX` - Key prefix (default: cacher)
    /// - `CACHE_TTL` - Result TTL in seconds (default: 300)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 10000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `FIXTURES_PATH` - Data source fixtures (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_prefix: env::var("CACHE_PREFIX")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.cache_prefix),
            cache_ttl: parse_var("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            fixtures_path: env::var_os("FIXTURES_PATH").map(PathBuf::from),
        }
    }

    /// Cacher settings derived from this configuration.
    pub fn cacher_config(&self) -> CacherConfig {
        CacherConfig::new()
            .with_prefix(self.cache_prefix.clone())
            .with_ttl(self.cache_ttl)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_prefix: DEFAULT_PREFIX.to_string(),
            cache_ttl: 300,
            max_entries: 10_000,
            cleanup_interval: 1,
            server_port: 3000,
            fixtures_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_prefix, "cacher");
        assert_eq!(config.cache_ttl, 300);
        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.server_port, 3000);
        assert!(config.fixtures_path.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        for name in [
            "CACHE_PREFIX",
            "CACHE_TTL",
            "MAX_ENTRIES",
            "CLEANUP_INTERVAL",
            "SERVER_PORT",
            "FIXTURES_PATH",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.cache_prefix, "cacher");
        assert_eq!(config.cache_ttl, 300);
        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_cacher_config() {
        let config = Config {
            cache_prefix: "app".to_string(),
            cache_ttl: 60,
            ..Config::default()
        };
        assert_eq!(
            config.cacher_config(),
            CacherConfig::new().with_prefix("app").with_ttl(60)
        );
    }
}
