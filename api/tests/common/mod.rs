//! Shared setup for the HTTP tests: the real routes over in-memory
//! repositories, a manual clock and a recording email service.

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{http::header, test::TestRequest, web};
use serde_json::{json, Value};

use ec_api::AppState;
use ec_core::clock::{Clock, ManualClock};
use ec_core::domain::entities::user::{NewUser, User, UserRole, UserStatus};
use ec_core::repositories::{
    InMemoryRevocationStore, MockTokenRepository, MockUserRepository,
    MockVerificationCodeRepository, UserRepository,
};
use ec_core::services::{
    AuthService, AuthServiceConfig, MockEmailService, PasswordService, RetryPolicy,
    TokenService, TokenServiceConfig, VerificationService, VerificationServiceConfig,
};
use ec_shared::config::ServerConfig;

pub const EMAIL: &str = "a@x.com";
pub const PASSWORD: &str = "Secur3!pass";
pub const ADMIN_EMAIL: &str = "admin@x.com";

pub type TestState = AppState<
    MockUserRepository,
    MockTokenRepository,
    InMemoryRevocationStore,
    MockVerificationCodeRepository,
    MockEmailService,
>;

pub struct TestApp {
    pub state: web::Data<TestState>,
    pub users: MockUserRepository,
    pub tokens: MockTokenRepository,
    pub email: MockEmailService,
    pub clock: ManualClock,
    pub server: ServerConfig,
}

impl TestApp {
    pub fn new() -> Self {
        let clock = ManualClock::starting_now();
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());

        let users = MockUserRepository::with_clock(shared.clone());
        let tokens = MockTokenRepository::new();
        let email = MockEmailService::new();

        let token_service = TokenService::new(
            tokens.clone(),
            InMemoryRevocationStore::with_clock(shared.clone()),
            TokenServiceConfig::new("http-test-secret-that-is-32-bytes!!"),
        )
        .expect("valid token config")
        .with_clock(shared.clone())
        .with_retry_policy(RetryPolicy::no_retry());

        let verification_service = VerificationService::new(
            Arc::new(MockVerificationCodeRepository::new()),
            Arc::new(email.clone()),
            VerificationServiceConfig::default(),
        )
        .with_clock(shared.clone())
        .with_retry_policy(RetryPolicy::no_retry());

        let auth_service = AuthService::new(
            Arc::new(users.clone()),
            Arc::new(token_service),
            Arc::new(verification_service),
            PasswordService::fast_for_tests(),
            AuthServiceConfig::default(),
        )
        .with_clock(shared)
        .with_retry_policy(RetryPolicy::no_retry());

        Self {
            state: web::Data::new(AppState::new(Arc::new(auth_service))),
            users,
            tokens,
            email,
            clock,
            server: ServerConfig::default(),
        }
    }

    /// Stores an active admin directly, bypassing registration
    pub async fn create_admin(&self) -> User {
        let hash = PasswordService::fast_for_tests()
            .hash(PASSWORD)
            .await
            .expect("hash");
        let admin = NewUser::customer(ADMIN_EMAIL, hash, "Ada", "Admin")
            .with_role(UserRole::Admin)
            .with_status(UserStatus::Active);
        self.users.create(admin).await.expect("admin stored")
    }
}

pub fn post_json(uri: &str, body: Value) -> TestRequest {
    TestRequest::post().uri(uri).set_json(body)
}

pub fn with_bearer(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

pub fn register_body(email: &str, password: &str) -> Value {
    json!({
        "email": email,
        "password": password,
        "firstName": "Ann",
        "lastName": "Lee",
    })
}

pub fn login_body(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

/// Runs a request and returns the status with the JSON body (`Null` when empty)
#[macro_export]
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let bytes = actix_web::test::read_body(resp).await;
        let body: serde_json::Value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, body)
    }};
}

/// Registers `EMAIL` and logs in, returning the login body
#[macro_export]
macro_rules! register_and_login {
    ($app:expr) => {{
        let (status, _) = send!(
            $app,
            common::post_json("/auth/register", common::register_body(common::EMAIL, common::PASSWORD))
        );
        assert_eq!(status, actix_web::http::StatusCode::CREATED);

        let (status, body) = send!(
            $app,
            common::post_json("/auth/login", common::login_body(common::EMAIL, common::PASSWORD))
        );
        assert_eq!(status, actix_web::http::StatusCode::OK);
        body
    }};
}
