//! Shared setup for authentication service tests

use std::sync::Arc;
use std::time::Duration as StdDuration;

use crate::clock::{Clock, ManualClock};
use crate::repositories::{
    InMemoryRevocationStore, MockTokenRepository, MockUserRepository,
    MockVerificationCodeRepository,
};
use crate::services::auth::{AuthService, AuthServiceConfig};
use crate::services::password::PasswordService;
use crate::services::retry::RetryPolicy;
use crate::services::token::{TokenService, TokenServiceConfig};
use crate::services::verification::{
    MockEmailService, VerificationService, VerificationServiceConfig,
};

pub const EMAIL: &str = "shopper@example.com";
pub const PASSWORD: &str = "Secur3!Pass";

pub type TestAuthService = AuthService<
    MockUserRepository,
    MockTokenRepository,
    InMemoryRevocationStore,
    MockVerificationCodeRepository,
    MockEmailService,
>;

pub struct Fixture {
    pub service: TestAuthService,
    pub users: MockUserRepository,
    pub tokens: MockTokenRepository,
    pub email: MockEmailService,
    pub clock: ManualClock,
}

fn instant_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        operation_timeout: StdDuration::from_secs(2),
        initial_backoff: StdDuration::ZERO,
        max_backoff: StdDuration::ZERO,
        jitter: false,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(AuthServiceConfig::default())
}

pub fn fixture_with(config: AuthServiceConfig) -> Fixture {
    let clock = ManualClock::starting_now();
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());

    let users = MockUserRepository::with_clock(shared.clone());
    let tokens = MockTokenRepository::new();
    let revocations = InMemoryRevocationStore::with_clock(shared.clone());
    let codes = MockVerificationCodeRepository::new();
    let email = MockEmailService::new();

    let token_service = TokenService::new(
        tokens.clone(),
        revocations,
        TokenServiceConfig::new("auth-service-test-secret-32-bytes-long!"),
    )
    .expect("valid token config")
    .with_clock(shared.clone())
    .with_retry_policy(instant_retry());

    let verification_service = VerificationService::new(
        Arc::new(codes),
        Arc::new(email.clone()),
        VerificationServiceConfig::default(),
    )
    .with_clock(shared.clone())
    .with_retry_policy(instant_retry());

    let service = AuthService::new(
        Arc::new(users.clone()),
        Arc::new(token_service),
        Arc::new(verification_service),
        PasswordService::fast_for_tests(),
        config,
    )
    .with_clock(shared)
    .with_retry_policy(instant_retry());

    Fixture {
        service,
        users,
        tokens,
        email,
        clock,
    }
}
