//! In-memory implementation of UserRepository for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::domain::entities::user::{NewUser, User, UserUpdate};
use crate::errors::{AuthError, DomainError};

use super::trait_::UserRepository;

/// Mock user repository for testing
///
/// Uniqueness is checked and the insert performed under one write lock, so
/// concurrent creates behave like a storage constraint.
#[derive(Clone)]
pub struct MockUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    clock: Arc<dyn Clock>,
    transient_failures: Arc<AtomicU32>,
}

impl MockUserRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a mock repository stamping times from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            clock,
            transient_failures: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Make the next `count` calls fail with `StoreUnavailable`
    pub fn fail_next(&self, count: u32) {
        self.transient_failures.store(count, Ordering::SeqCst);
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    fn take_failure(&self) -> Result<(), DomainError> {
        match self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        {
            Ok(_) => Err(DomainError::unavailable("simulated user store outage")),
            Err(_) => Ok(()),
        }
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        self.take_failure()?;
        let mut users = self.users.write().await;

        if users.values().any(|u| same_email(&u.email, &user.email)) {
            return Err(AuthError::EmailAlreadyExists.into());
        }

        let user = User::from_new(Uuid::new_v4(), user, self.clock.now());
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.take_failure()?;
        let users = self.users.read().await;
        Ok(users.values().find(|u| same_email(&u.email, email)).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.take_failure()?;
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, changes: UserUpdate) -> Result<User, DomainError> {
        self.take_failure()?;
        let mut users = self.users.write().await;

        if let Some(email) = &changes.email {
            if users
                .values()
                .any(|u| u.id != id && same_email(&u.email, email))
            {
                return Err(AuthError::EmailAlreadyExists.into());
            }
        }

        let now = self.clock.now();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("User"))?;
        changes.apply_to(user, now);
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.take_failure()?;
        let mut users = self.users.write().await;
        users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("User"))
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<User>, DomainError> {
        self.take_failure()?;
        let users = self.users.read().await;
        let mut ordered: Vec<User> = users.values().cloned().collect();
        ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(ordered
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        self.take_failure()?;
        Ok(self.users.read().await.len() as u64)
    }
}
