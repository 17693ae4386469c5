//! Unit tests for token service

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use uuid::Uuid;

use crate::clock::{Clock, ManualClock};
use crate::domain::entities::token::TokenType;
use crate::domain::entities::user::{NewUser, User, UserRole};
use crate::errors::{DomainError, TokenError};
use crate::repositories::{InMemoryRevocationStore, MockTokenRepository};
use crate::services::retry::RetryPolicy;
use crate::services::token::{hash_token, TokenService, TokenServiceConfig};

const SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

struct Fixture {
    service: TokenService<MockTokenRepository, InMemoryRevocationStore>,
    repository: MockTokenRepository,
    revocations: InMemoryRevocationStore,
    clock: ManualClock,
}

fn instant_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        operation_timeout: StdDuration::from_secs(1),
        initial_backoff: StdDuration::ZERO,
        max_backoff: StdDuration::ZERO,
        jitter: false,
    }
}

fn fixture_with(config: TokenServiceConfig) -> Fixture {
    let clock = ManualClock::starting_now();
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());
    let repository = MockTokenRepository::new();
    let revocations = InMemoryRevocationStore::with_clock(shared.clone());

    let service = TokenService::new(repository.clone(), revocations.clone(), config)
        .expect("valid config")
        .with_clock(shared)
        .with_retry_policy(instant_retry(3));

    Fixture {
        service,
        repository,
        revocations,
        clock,
    }
}

fn fixture() -> Fixture {
    fixture_with(TokenServiceConfig::new(SECRET))
}

fn test_user(clock: &ManualClock) -> User {
    User::from_new(
        Uuid::new_v4(),
        NewUser::customer("shopper@example.com", "hash", "Ada", "Lovelace"),
        clock.now(),
    )
}

fn token_error(result: Result<impl std::fmt::Debug, DomainError>) -> TokenError {
    match result {
        Err(DomainError::Token(err)) => err,
        other => panic!("expected token error, got {other:?}"),
    }
}

#[test]
fn test_empty_secret_rejected() {
    let result = TokenService::new(
        MockTokenRepository::new(),
        InMemoryRevocationStore::new(),
        TokenServiceConfig::new(""),
    );
    assert!(matches!(result, Err(DomainError::Config { .. })));
}

#[test]
fn test_non_positive_lifetime_rejected() {
    let result = TokenService::new(
        MockTokenRepository::new(),
        InMemoryRevocationStore::new(),
        TokenServiceConfig::new(SECRET).with_access_ttl_seconds(0),
    );
    assert!(matches!(result, Err(DomainError::Config { .. })));
}

#[tokio::test]
async fn test_access_token_round_trip() {
    let f = fixture();
    let user = test_user(&f.clock);

    let (token, issued) = f.service.issue_access_token(user.id, &user.email, user.role).unwrap();
    let claims = f.service.verify_access_token(&token).await.unwrap();

    assert_eq!(claims, issued);
    assert_eq!(claims.user_id().unwrap(), user.id);
    assert_eq!(claims.email, user.email);
    assert_eq!(claims.role, UserRole::Customer);
    assert_eq!(claims.token_type, TokenType::Access);
    assert_eq!(claims.exp - claims.iat, 3600);
    assert_eq!(claims.iss, "ecommerce-auth");
    assert_eq!(claims.aud, "ecommerce-api");
}

#[tokio::test]
async fn test_each_access_token_has_unique_jti() {
    let f = fixture();
    let user = test_user(&f.clock);

    let (_, first) = f.service.issue_access_token(user.id, &user.email, user.role).unwrap();
    let (_, second) = f.service.issue_access_token(user.id, &user.email, user.role).unwrap();

    assert_ne!(first.jti, second.jti);
}

#[tokio::test]
async fn test_access_token_expires_with_clock() {
    let f = fixture();
    let user = test_user(&f.clock);
    let (token, _) = f.service.issue_access_token(user.id, &user.email, user.role).unwrap();

    f.clock.advance(Duration::seconds(3599));
    assert!(f.service.verify_access_token(&token).await.is_ok());

    f.clock.advance(Duration::seconds(1));
    assert_eq!(
        token_error(f.service.verify_access_token(&token).await),
        TokenError::Expired
    );
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_invalid() {
    let f = fixture();
    let other = fixture_with(TokenServiceConfig::new(
        "another-secret-that-is-also-32-bytes-long",
    ));
    let user = test_user(&f.clock);

    let (token, _) = other.service.issue_access_token(user.id, &user.email, user.role).unwrap();

    assert_eq!(
        token_error(f.service.verify_access_token(&token).await),
        TokenError::Invalid
    );
}

#[tokio::test]
async fn test_wrong_issuer_is_invalid() {
    let f = fixture();
    let mut config = TokenServiceConfig::new(SECRET);
    config.issuer = "someone-else".to_string();
    let other = fixture_with(config);
    let user = test_user(&f.clock);

    let (token, _) = other.service.issue_access_token(user.id, &user.email, user.role).unwrap();

    assert_eq!(
        token_error(f.service.verify_access_token(&token).await),
        TokenError::Invalid
    );
}

#[tokio::test]
async fn test_garbage_is_invalid() {
    let f = fixture();

    for token in ["", "not-a-token", "a.b.c"] {
        assert_eq!(
            token_error(f.service.verify_access_token(token).await),
            TokenError::Invalid
        );
    }
}

#[tokio::test]
async fn test_refresh_typed_jwt_rejected_as_access_token() {
    let f = fixture();
    let user = test_user(&f.clock);
    let (_, mut claims) = f.service.issue_access_token(user.id, &user.email, user.role).unwrap();
    claims.token_type = TokenType::Refresh;
    let token = f.service.encode_jwt(&claims).unwrap();

    assert_eq!(
        token_error(f.service.verify_access_token(&token).await),
        TokenError::WrongType
    );
}

#[tokio::test]
async fn test_revoked_access_token_rejected() {
    let f = fixture();
    let user = test_user(&f.clock);
    let (token, _) = f.service.issue_access_token(user.id, &user.email, user.role).unwrap();

    f.service.revoke(&token).await.unwrap();

    assert_eq!(
        token_error(f.service.verify_access_token(&token).await),
        TokenError::Revoked
    );
    assert_eq!(f.revocations.len().await, 1);
}

#[tokio::test]
async fn test_revoking_expired_access_token_is_noop() {
    let f = fixture();
    let user = test_user(&f.clock);
    let (token, _) = f.service.issue_access_token(user.id, &user.email, user.role).unwrap();

    f.clock.advance(Duration::hours(2));
    f.service.revoke_access_token(&token).await.unwrap();

    assert_eq!(f.revocations.len().await, 0);
}

#[tokio::test]
async fn test_refresh_token_is_opaque_and_stored_hashed() {
    let f = fixture();
    let user = test_user(&f.clock);

    let (token, record) = f.service.issue_refresh_token(user.id).await.unwrap();

    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(record.token_hash, hash_token(&token));
    assert_ne!(record.token_hash, token);
    assert_eq!(f.service.verify_refresh_token(&token).await.unwrap(), user.id);

    let stored = f.repository.all().await;
    assert_eq!(stored.len(), 1);
    assert!(stored.iter().all(|t| t.token_hash != token));
}

#[tokio::test]
async fn test_unknown_refresh_token_is_invalid() {
    let f = fixture();

    assert_eq!(
        token_error(f.service.verify_refresh_token("deadbeef").await),
        TokenError::Invalid
    );
}

#[tokio::test]
async fn test_refresh_token_expires_with_clock() {
    let f = fixture_with(TokenServiceConfig::new(SECRET).with_refresh_ttl_seconds(60));
    let user = test_user(&f.clock);
    let (token, _) = f.service.issue_refresh_token(user.id).await.unwrap();

    f.clock.advance(Duration::seconds(60));

    assert_eq!(
        token_error(f.service.verify_refresh_token(&token).await),
        TokenError::Expired
    );
    assert_eq!(
        token_error(f.service.rotate_refresh_token(&token).await),
        TokenError::Expired
    );
}

#[tokio::test]
async fn test_rotation_consumes_old_token() {
    let f = fixture();
    let user = test_user(&f.clock);
    let (first, first_record) = f.service.issue_refresh_token(user.id).await.unwrap();

    let rotated = f.service.rotate_refresh_token(&first).await.unwrap();

    assert_eq!(rotated.user_id, user.id);
    assert_ne!(rotated.token, first);
    assert_eq!(rotated.record.family_id, first_record.family_id);
    assert_eq!(
        token_error(f.service.verify_refresh_token(&first).await),
        TokenError::Revoked
    );
    assert_eq!(
        f.service.verify_refresh_token(&rotated.token).await.unwrap(),
        user.id
    );
}

#[tokio::test]
async fn test_reuse_of_rotated_token_revokes_family() {
    let f = fixture();
    let user = test_user(&f.clock);
    let (first, _) = f.service.issue_refresh_token(user.id).await.unwrap();
    let rotated = f.service.rotate_refresh_token(&first).await.unwrap();

    assert_eq!(
        token_error(f.service.rotate_refresh_token(&first).await),
        TokenError::Revoked
    );
    assert_eq!(
        token_error(f.service.verify_refresh_token(&rotated.token).await),
        TokenError::Revoked
    );
    assert_eq!(f.service.count_active_refresh_tokens(user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_rotation_has_one_winner() {
    let f = fixture();
    let user = test_user(&f.clock);
    let (token, _) = f.service.issue_refresh_token(user.id).await.unwrap();

    let (a, b) = tokio::join!(
        f.service.rotate_refresh_token(&token),
        f.service.rotate_refresh_token(&token)
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(DomainError::Token(TokenError::Revoked)))));
}

#[tokio::test]
async fn test_revoke_dispatches_refresh_tokens() {
    let f = fixture();
    let user = test_user(&f.clock);
    let (token, _) = f.service.issue_refresh_token(user.id).await.unwrap();

    f.service.revoke(&token).await.unwrap();

    assert_eq!(
        token_error(f.service.verify_refresh_token(&token).await),
        TokenError::Revoked
    );
    assert_eq!(f.revocations.len().await, 0);
}

#[tokio::test]
async fn test_revoke_unknown_refresh_token_is_noop() {
    let f = fixture();

    f.service.revoke("0123abcd").await.unwrap();
    assert!(!f.service.revoke_refresh_token("0123abcd").await.unwrap());
}

#[tokio::test]
async fn test_revoke_all_user_tokens() {
    let f = fixture();
    let user = test_user(&f.clock);
    let other = test_user(&f.clock);
    for _ in 0..3 {
        f.service.issue_refresh_token(user.id).await.unwrap();
    }
    let (other_token, _) = f.service.issue_refresh_token(other.id).await.unwrap();

    assert_eq!(f.service.revoke_all_user_tokens(user.id).await.unwrap(), 3);
    assert_eq!(f.service.count_active_refresh_tokens(user.id).await.unwrap(), 0);
    assert!(f.service.verify_refresh_token(&other_token).await.is_ok());
}

#[tokio::test]
async fn test_cleanup_removes_expired_tokens_and_revocations() {
    let f = fixture_with(TokenServiceConfig::new(SECRET).with_refresh_ttl_seconds(7200));
    let user = test_user(&f.clock);
    let (access, _) = f.service.issue_access_token(user.id, &user.email, user.role).unwrap();
    f.service.revoke_access_token(&access).await.unwrap();
    f.service.issue_refresh_token(user.id).await.unwrap();

    f.clock.advance(Duration::hours(3));
    let report = f.service.cleanup_expired().await.unwrap();

    assert_eq!(report.refresh_tokens, 1);
    assert_eq!(report.revocations, 1);
    assert!(f.repository.all().await.is_empty());
}

#[tokio::test]
async fn test_transient_store_failure_is_retried() {
    let f = fixture();
    let user = test_user(&f.clock);

    f.repository.fail_next(2);
    let (token, _) = f.service.issue_refresh_token(user.id).await.unwrap();

    assert_eq!(f.service.verify_refresh_token(&token).await.unwrap(), user.id);
}

#[tokio::test]
async fn test_persistent_store_failure_surfaces_as_unavailable() {
    let f = fixture();
    let user = test_user(&f.clock);

    f.repository.fail_next(10);
    let result = f.service.issue_refresh_token(user.id).await;

    assert!(matches!(result, Err(DomainError::StoreUnavailable { .. })));
}
