//! In-memory implementation of VerificationCodeRepository for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::verification_code::EmailVerification;
use crate::errors::DomainError;

use super::trait_::VerificationCodeRepository;

#[derive(Clone, Default)]
pub struct MockVerificationCodeRepository {
    codes: Arc<RwLock<HashMap<Uuid, EmailVerification>>>,
}

impl MockVerificationCodeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationCodeRepository for MockVerificationCodeRepository {
    async fn upsert(&self, verification: EmailVerification) -> Result<(), DomainError> {
        self.codes
            .write()
            .await
            .insert(verification.user_id, verification);
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<EmailVerification>, DomainError> {
        Ok(self.codes.read().await.get(&user_id).cloned())
    }

    async fn claim_attempt(&self, user_id: Uuid, max_attempts: u32) -> Result<Option<u32>, DomainError> {
        let mut codes = self.codes.write().await;
        match codes.get_mut(&user_id) {
            Some(verification) if verification.attempts < max_attempts => {
                verification.attempts += 1;
                Ok(Some(verification.attempts))
            }
            _ => Ok(None),
        }
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<(), DomainError> {
        self.codes.write().await.remove(&user_id);
        Ok(())
    }
}
