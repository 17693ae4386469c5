//! Cache module for Redis
//!
//! Holds the shared revocation set when `REVOCATION_BACKEND=redis`.

pub mod redis_client;
pub mod revocation_cache;

#[cfg(test)]
mod tests;

pub use redis_client::RedisClient;
pub use revocation_cache::RedisRevocationStore;

pub use ec_shared::config::CacheConfig;

use ec_core::errors::DomainError;

/// Map a Redis error to a domain error. Connection trouble is retryable.
pub fn map_redis_error(context: &str, err: redis::RedisError) -> DomainError {
    if err.is_io_error()
        || err.is_timeout()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
    {
        tracing::warn!(context, error = %err, "Redis unavailable");
        DomainError::unavailable(format!("{}: {}", context, err))
    } else {
        tracing::error!(context, error = %err, "Redis error");
        DomainError::internal(format!("{}: {}", context, err))
    }
}
