//! Repository tests against a private in-memory SQLite database


use ec_core::domain::entities::user::{NewUser, User};
use ec_core::repositories::UserRepository;

use super::{DatabasePool, SqliteUserRepository};

pub(super) async fn test_pool() -> DatabasePool {
    DatabasePool::in_memory().await.unwrap()
}

pub(super) async fn insert_user(pool: &DatabasePool, email: &str) -> User {
    SqliteUserRepository::new(pool.pool().clone())
        .create(NewUser::customer(email, "$2b$04$hash", "Ann", "Lee"))
        .await
        .unwrap()
}
