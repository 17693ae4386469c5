//! Cache configuration module

use serde::{Deserialize, Serialize};

/// Redis configuration for the shared token revocation set
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    pub connection_timeout: u64,

    /// Response timeout in milliseconds
    pub response_timeout_ms: u64,

    /// Prefix applied to every key written by this service
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            connection_timeout: 5,
            response_timeout_ms: 2000,
            key_prefix: default_key_prefix(),
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            connection_timeout: super::env_or("REDIS_CONNECT_TIMEOUT", defaults.connection_timeout),
            response_timeout_ms: super::env_or("REDIS_RESPONSE_TIMEOUT_MS", defaults.response_timeout_ms),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or(defaults.key_prefix),
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Build a namespaced key
    pub fn key(&self, parts: &[&str]) -> String {
        let mut key = self.key_prefix.clone();
        for part in parts {
            key.push(':');
            key.push_str(part);
        }
        key
    }
}

fn default_key_prefix() -> String {
    String::from("ecommerce")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_namespacing() {
        let config = CacheConfig::default().with_key_prefix("shop");
        assert_eq!(config.key(&["revoked", "abc"]), "shop:revoked:abc");
    }
}
