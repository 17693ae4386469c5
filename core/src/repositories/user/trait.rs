//! User repository trait defining the interface for user data persistence.
//!
//! The trait is async-first and uses Result types for error handling. Store
//! outages surface as `DomainError::StoreUnavailable` so callers can retry.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::{NewUser, User, UserUpdate};
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// # Example Implementation
/// ```no_run
/// use async_trait::async_trait;
/// use uuid::Uuid;
/// use ec_core::repositories::UserRepository;
/// use ec_core::domain::entities::user::{NewUser, User, UserUpdate};
/// use ec_core::errors::DomainError;
///
/// struct PostgresUserRepository {
///     // database connection pool
/// }
///
/// #[async_trait]
/// impl UserRepository for PostgresUserRepository {
///     async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
///         // Implementation here
///         Ok(None)
///     }
///
///     // ... other methods
/// #   async fn create(&self, user: NewUser) -> Result<User, DomainError> { unimplemented!() }
/// #   async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> { unimplemented!() }
/// #   async fn update(&self, id: Uuid, changes: UserUpdate) -> Result<User, DomainError> { unimplemented!() }
/// #   async fn delete(&self, id: Uuid) -> Result<(), DomainError> { unimplemented!() }
/// #   async fn list(&self, limit: u32, offset: u32) -> Result<Vec<User>, DomainError> { unimplemented!() }
/// #   async fn count(&self) -> Result<u64, DomainError> { unimplemented!() }
/// }
/// ```
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. The store assigns `id` and `created_at` in the same
    /// atomic insert that enforces email uniqueness.
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(DomainError::Auth(AuthError::EmailAlreadyExists))` - Email taken (case-insensitive)
    /// * `Err(DomainError)` - Database or other error occurred
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Find a user by email, compared case-insensitively
    ///
    /// # Example
    /// ```no_run
    /// # use ec_core::repositories::UserRepository;
    /// # async fn example(repo: &impl UserRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// match repo.find_by_email("ann@example.com").await? {
    ///     Some(user) => println!("User found: {:?}", user.id),
    ///     None => println!("User not found"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by their unique identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Apply a partial update and refresh `updated_at`
    ///
    /// # Returns
    /// * `Ok(User)` - The updated user
    /// * `Err(DomainError::NotFound)` - No user with that id
    /// * `Err(DomainError::Auth(AuthError::EmailAlreadyExists))` - New email belongs to another user
    async fn update(&self, id: Uuid, changes: UserUpdate) -> Result<User, DomainError>;

    /// Delete a user along with their tokens and pending verification
    ///
    /// # Returns
    /// * `Err(DomainError::NotFound)` - No user with that id
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;

    /// Users ordered by creation time, oldest first
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<User>, DomainError>;

    /// Total number of users
    async fn count(&self) -> Result<u64, DomainError>;
}
