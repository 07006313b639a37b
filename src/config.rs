//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Semantic version tag of the current cache generation
    pub cache_version: String,
    /// Base URL of the origin server fronted by the gateway
    pub origin_url: String,
    /// HTTP server port
    pub server_port: u16,
    /// Optional on-disk cache directory; in-memory store when unset
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_VERSION` - Version tag for the current generation (default: 1.0.0)
    /// - `ORIGIN_URL` - Origin server base URL (default: http://localhost:8080)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_DIR` - Persistent cache directory (default: unset, in-memory)
    pub fn from_env() -> Self {
        Self {
            cache_version: env::var("CACHE_VERSION").unwrap_or_else(|_| "1.0.0".to_string()),
            origin_url: env::var("ORIGIN_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cache_dir: env::var("CACHE_DIR").ok().map(PathBuf::from),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_version: "1.0.0".to_string(),
            origin_url: "http://localhost:8080".to_string(),
            server_port: 3000,
            cache_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_version, "1.0.0");
        assert_eq!(config.origin_url, "http://localhost:8080");
        assert_eq!(config.server_port, 3000);
        assert!(config.cache_dir.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_VERSION");
        env::remove_var("ORIGIN_URL");
        env::remove_var("SERVER_PORT");
        env::remove_var("CACHE_DIR");

        let config = Config::from_env();
        assert_eq!(config.cache_version, "1.0.0");
        assert_eq!(config.origin_url, "http://localhost:8080");
        assert_eq!(config.server_port, 3000);
        assert!(config.cache_dir.is_none());
    }
}
