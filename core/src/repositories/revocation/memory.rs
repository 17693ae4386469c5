//! Process-local revocation set.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clock::{Clock, SystemClock};
use crate::errors::DomainError;

use super::trait_::RevocationStore;

/// Revocation set held in memory.
///
/// Only correct for a single instance; used in development and tests.
#[derive(Clone)]
pub struct InMemoryRevocationStore {
    entries: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Number of entries currently held, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for InMemoryRevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, expiry| *expiry > now);
        if expires_at > now {
            entries
                .entry(jti.to_string())
                .and_modify(|expiry| *expiry = (*expiry).max(expires_at))
                .or_insert(expires_at);
        }
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError> {
        let now = self.clock.now();
        Ok(self
            .entries
            .read()
            .await
            .get(jti)
            .is_some_and(|expiry| *expiry > now))
    }

    async fn purge_expired(&self) -> Result<u64, DomainError> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expiry| *expiry > now);
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Duration;

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let store = InMemoryRevocationStore::new();
        let expiry = Utc::now() + Duration::minutes(5);

        store.revoke("jti-1", expiry).await.unwrap();
        store.revoke("jti-1", expiry).await.unwrap();

        assert!(store.is_revoked("jti-1").await.unwrap());
        assert!(!store.is_revoked("jti-2").await.unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_entries_expire_with_token() {
        let clock = ManualClock::starting_now();
        let store = InMemoryRevocationStore::with_clock(Arc::new(clock.clone()));
        store.revoke("jti-1", clock.now() + Duration::seconds(30)).await.unwrap();

        clock.advance(Duration::seconds(31));

        assert!(!store.is_revoked("jti-1").await.unwrap());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_already_expired_token_not_stored() {
        let store = InMemoryRevocationStore::new();
        store.revoke("old", Utc::now() - Duration::seconds(1)).await.unwrap();
        assert_eq!(store.len().await, 0);
    }
}
