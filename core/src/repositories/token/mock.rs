//! In-memory implementation of TokenRepository for tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// Mock token repository for testing, keyed by token hash
#[derive(Clone, Default)]
pub struct MockTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
    transient_failures: Arc<AtomicU32>,
}

impl MockTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls fail with `StoreUnavailable`
    pub fn fail_next(&self, count: u32) {
        self.transient_failures.store(count, Ordering::SeqCst);
    }

    /// Every stored record, for assertions
    pub async fn all(&self) -> Vec<RefreshToken> {
        self.tokens.read().await.values().cloned().collect()
    }

    fn take_failure(&self) -> Result<(), DomainError> {
        match self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        {
            Ok(_) => Err(DomainError::unavailable("simulated token store outage")),
            Err(_) => Ok(()),
        }
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        self.take_failure()?;
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Conflict {
                message: "Token already exists".to_string(),
            });
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        self.take_failure()?;
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn revoke_token(&self, token_hash: &str) -> Result<bool, DomainError> {
        self.take_failure()?;
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(token_hash) {
            Some(token) if !token.is_revoked => {
                token.revoke();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_token_family(&self, family_id: Uuid) -> Result<u64, DomainError> {
        self.take_failure()?;
        let mut tokens = self.tokens.write().await;
        let mut count = 0;
        for token in tokens
            .values_mut()
            .filter(|t| t.family_id == family_id && !t.is_revoked)
        {
            token.revoke();
            count += 1;
        }
        Ok(count)
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<u64, DomainError> {
        self.take_failure()?;
        let mut tokens = self.tokens.write().await;
        let mut count = 0;
        for token in tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && !t.is_revoked)
        {
            token.revoke();
            count += 1;
        }
        Ok(count)
    }

    async fn count_active_tokens(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<u64, DomainError> {
        self.take_failure()?;
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_valid_at(now))
            .count() as u64)
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        self.take_failure()?;
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired_at(now));
        Ok((before - tokens.len()) as u64)
    }
}
