//! bcrypt password hashing.
//!
//! Hashing and verification run on tokio's blocking pool.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::warn;

use ec_shared::config::{PasswordConfig, MIN_BCRYPT_COST};

use crate::errors::{DomainError, DomainResult};

/// Highest cost bcrypt accepts
const MAX_BCRYPT_COST: u32 = 31;

/// Plaintext hashed once per process to back `dummy_verify`
const DUMMY_PASSWORD: &str = "dummy-password-for-timing";

/// Hashes and verifies passwords with bcrypt
#[derive(Debug, Clone)]
pub struct PasswordService {
    cost: u32,
    dummy_hash: Arc<OnceCell<String>>,
}

impl PasswordService {
    /// Creates the service, rejecting a cost below 12 or above 31
    pub fn new(cost: u32) -> DomainResult<Self> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(DomainError::Config {
                message: format!(
                    "bcrypt cost must be between {} and {}, got {}",
                    MIN_BCRYPT_COST, MAX_BCRYPT_COST, cost
                ),
            });
        }
        Ok(Self::with_cost_unchecked(cost))
    }

    pub fn from_config(config: &PasswordConfig) -> DomainResult<Self> {
        Self::new(config.bcrypt_cost)
    }

    /// Minimum bcrypt cost. Only for tests.
    #[cfg(any(test, feature = "test-util"))]
    pub fn fast_for_tests() -> Self {
        // bcrypt minimum cost; bcrypt::MIN_COST is private.
        Self::with_cost_unchecked(4)
    }

    fn with_cost_unchecked(cost: u32) -> Self {
        Self {
            cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes `password` into a `$2b$<cost>$...` string
    pub async fn hash(&self, password: &str) -> DomainResult<String> {
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::internal(format!("password hashing task failed: {e}")))?
            .map_err(|e| DomainError::internal(format!("password hashing failed: {e}")))
    }

    /// Checks `password` against a stored hash. A malformed hash is a
    /// mismatch, not an error.
    pub async fn verify(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("password verify task failed: {e}")))?;

        match outcome {
            Ok(matches) => Ok(matches),
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be parsed");
                Ok(false)
            }
        }
    }

    /// Computes the hash behind `dummy_verify`. Call once at startup so no
    /// login pays for it.
    pub async fn warm_up(&self) -> DomainResult<()> {
        self.dummy_hash().await.map(|_| ())
    }

    /// Burns the same bcrypt work as a real verify. Used when the account
    /// does not exist.
    pub async fn dummy_verify(&self, password: &str) -> DomainResult<()> {
        let dummy_hash = self.dummy_hash().await?;
        self.verify(password, dummy_hash).await.map(|_| ())
    }

    async fn dummy_hash(&self) -> DomainResult<&String> {
        self.dummy_hash
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_cost_rejected() {
        assert!(matches!(
            PasswordService::new(11),
            Err(DomainError::Config { .. })
        ));
        assert!(matches!(
            PasswordService::new(32),
            Err(DomainError::Config { .. })
        ));
        assert_eq!(PasswordService::new(12).unwrap().cost(), 12);
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let service = PasswordService::fast_for_tests();
        let hash = service.hash("Secur3!Pass").await.unwrap();

        assert!(hash.starts_with("$2b$04$"));
        assert!(service.verify("Secur3!Pass", &hash).await.unwrap());
        assert!(!service.verify("secur3!pass", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_password_hashes_differently() {
        let service = PasswordService::fast_for_tests();
        let first = service.hash("Secur3!Pass").await.unwrap();
        let second = service.hash("Secur3!Pass").await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_mismatch() {
        let service = PasswordService::fast_for_tests();

        assert!(!service.verify("anything", "not-a-bcrypt-hash").await.unwrap());
        assert!(!service.verify("anything", "").await.unwrap());
    }

    #[tokio::test]
    async fn test_dummy_verify_succeeds_repeatedly() {
        let service = PasswordService::fast_for_tests();

        service.dummy_verify("whatever").await.unwrap();
        service.dummy_verify("whatever").await.unwrap();
        assert!(service.dummy_hash.initialized());
    }

    #[tokio::test]
    async fn test_warm_up_prepares_dummy_hash() {
        let service = PasswordService::fast_for_tests();
        assert!(!service.dummy_hash.initialized());

        service.warm_up().await.unwrap();
        let prepared = service.dummy_hash.get().cloned();
        assert!(prepared.is_some());

        // Clones share the prepared hash and nothing is recomputed
        let clone = service.clone();
        clone.dummy_verify("whatever").await.unwrap();
        assert_eq!(clone.dummy_hash.get().cloned(), prepared);
    }
}
