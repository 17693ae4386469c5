//! Recording email service for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::EmailServiceTrait;

/// Keeps the last code sent to each address
#[derive(Clone, Default)]
pub struct MockEmailService {
    sent: Arc<RwLock<HashMap<String, String>>>,
    should_fail: Arc<AtomicBool>,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail
    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }

    pub async fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent.read().await.get(email).cloned()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.read().await.len()
    }
}

#[async_trait]
impl EmailServiceTrait for MockEmailService {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<(), String> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err("email service error".to_string());
        }
        self.sent
            .write()
            .await
            .insert(email.to_string(), code.to_string());
        Ok(())
    }
}
