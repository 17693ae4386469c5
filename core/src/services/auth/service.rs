//! Main authentication service implementation

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use ec_shared::types::Pagination;
use ec_shared::validation::{mask_email, normalize_email};

use crate::clock::{Clock, SystemClock};
use crate::domain::entities::token::{Claims, TokenPair};
use crate::domain::entities::user::{NewUser, User, UserStatus, UserUpdate};
use crate::domain::value_objects::{check_password_strength, AuthResponse, Email, PersonName};
use crate::errors::{AuthError, DomainError, DomainResult, FieldErrors, TokenError};
use crate::repositories::{
    RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository,
};
use crate::services::password::PasswordService;
use crate::services::retry::RetryPolicy;
use crate::services::token::{CleanupReport, TokenService};
use crate::services::verification::{EmailServiceTrait, SendCodeResult, VerificationService};

use super::config::AuthServiceConfig;

/// Authentication service for managing the complete authentication flow
pub struct AuthService<U, T, R, V, E>
where
    U: UserRepository,
    T: TokenRepository,
    R: RevocationStore,
    V: VerificationCodeRepository,
    E: EmailServiceTrait,
{
    /// User repository for database operations
    user_repository: Arc<U>,
    /// Token service for JWT and refresh token management
    token_service: Arc<TokenService<T, R>>,
    /// Verification service for email codes
    verification_service: Arc<VerificationService<V, E>>,
    password_service: PasswordService,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<U, T, R, V, E> AuthService<U, T, R, V, E>
where
    U: UserRepository,
    T: TokenRepository,
    R: RevocationStore,
    V: VerificationCodeRepository,
    E: EmailServiceTrait,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `user_repository` - Repository for user data persistence
    /// * `token_service` - Service for token issuance, verification and revocation
    /// * `verification_service` - Service for email verification codes
    /// * `password_service` - bcrypt hashing at the configured cost
    /// * `config` - Service configuration
    pub fn new(
        user_repository: Arc<U>,
        token_service: Arc<TokenService<T, R>>,
        verification_service: Arc<VerificationService<V, E>>,
        password_service: PasswordService,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            user_repository,
            token_service,
            verification_service,
            password_service,
            clock: Arc::new(SystemClock),
            retry: RetryPolicy::default(),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn token_service(&self) -> &TokenService<T, R> {
        &self.token_service
    }

    /// Register a new customer account
    ///
    /// Checks run in order: email format, password strength, then names.
    /// The account starts as `pending_verification` and a verification code
    /// is emailed. Failing to send that code does not fail registration.
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - The stored user
    /// * `Err(DomainError)` - `InvalidEmail`, `WeakPassword`, `InvalidInput`
    ///   for names, or `EmailAlreadyExists`
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> DomainResult<User> {
        if !self.config.allow_registration {
            return Err(DomainError::Forbidden {
                message: "Registration is disabled".to_string(),
            });
        }

        let email = Email::parse(email)?;
        check_password_strength(password)?;
        let (first_name, last_name) = parse_names(first_name, last_name)?;

        let password_hash = self.password_service.hash(password).await?;
        let new_user = NewUser::customer(email.into_inner(), password_hash, first_name, last_name);

        let user = self
            .retry
            .run("create_user", || self.user_repository.create(new_user.clone()))
            .await?;

        info!(user_id = %user.id, email = %mask_email(&user.email), "User registered");

        if self.config.send_verification_on_register {
            if let Err(e) = self.verification_service.send_code(user.id, &user.email).await {
                warn!(user_id = %user.id, error = %e, "Could not issue verification code at registration");
            }
        }

        Ok(user)
    }

    /// Authenticate with email and password
    ///
    /// Unknown emails and wrong passwords fail identically, and an unknown
    /// email still costs one bcrypt verification. Account status is only
    /// looked at once the password has matched.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResponse> {
        let email = normalize_email(email);

        let user = self
            .retry
            .run("find_user_by_email", || self.user_repository.find_by_email(&email))
            .await?;

        let user = match user {
            Some(user) => user,
            None => {
                self.password_service.dummy_verify(password).await?;
                info!(email = %mask_email(&email), "Login failed: unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.password_service.verify(password, &user.password_hash).await? {
            info!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        ensure_can_authenticate(&user)?;

        let now = self.clock.now();
        let user = self
            .retry
            .run("record_login", || {
                self.user_repository
                    .update(user.id, UserUpdate::new().last_login_at(now))
            })
            .await?;

        let tokens = self.token_service.issue_token_pair(&user).await?;

        info!(user_id = %user.id, "User logged in");
        Ok(AuthResponse::new(tokens, user))
    }

    /// Exchange a refresh token for a new token pair
    ///
    /// The presented refresh token is consumed. If its owner no longer exists
    /// or may not authenticate, the new family member is revoked again and
    /// the request fails as an invalid token.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let rotated = self.token_service.rotate_refresh_token(refresh_token).await?;

        let user = self
            .retry
            .run("find_user_by_id", || self.user_repository.find_by_id(rotated.user_id))
            .await?;

        let user = match user {
            Some(user) if user.can_authenticate() => user,
            _ => {
                self.token_service
                    .revoke_family(rotated.record.family_id)
                    .await?;
                warn!(user_id = %rotated.user_id, "Refresh rejected: user missing or not allowed");
                return Err(TokenError::Invalid.into());
            }
        };

        let (access_token, _) =
            self.token_service
                .issue_access_token(user.id, &user.email, user.role)?;

        Ok(TokenPair::new(
            access_token,
            rotated.token,
            self.token_service.access_token_ttl(),
            self.token_service.refresh_token_ttl(),
        ))
    }

    /// Revoke the access token and, if given, the refresh token
    ///
    /// An expired but correctly signed access token is accepted. Unknown
    /// refresh tokens are ignored.
    pub async fn logout(&self, access_token: &str, refresh_token: Option<&str>) -> DomainResult<()> {
        self.token_service.revoke_access_token(access_token).await?;

        if let Some(refresh_token) = refresh_token {
            self.token_service.revoke_refresh_token(refresh_token).await?;
        }

        Ok(())
    }

    /// Verify an access token presented on a request
    pub async fn authenticate(&self, access_token: &str) -> DomainResult<Claims> {
        self.token_service.verify_access_token(access_token).await
    }

    /// Change the password after re-checking the current one
    ///
    /// Every refresh token of the user is revoked on success.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        let user = self.load_user(user_id).await?;

        if !self
            .password_service
            .verify(current_password, &user.password_hash)
            .await?
        {
            return Err(AuthError::WrongCurrentPassword.into());
        }
        check_password_strength(new_password)?;

        let password_hash = self.password_service.hash(new_password).await?;
        self.retry
            .run("update_password", || {
                self.user_repository
                    .update(user_id, UserUpdate::new().password_hash(password_hash.clone()))
            })
            .await?;

        let revoked = self.token_service.revoke_all_user_tokens(user_id).await?;
        info!(user_id = %user_id, revoked_sessions = revoked, "Password changed");
        Ok(())
    }

    /// Confirm the email address with the emailed code
    ///
    /// A `pending_verification` account becomes `active`; any other status
    /// is kept.
    pub async fn verify_email(&self, user_id: Uuid, code: &str) -> DomainResult<User> {
        let user = self.load_user(user_id).await?;
        if user.is_email_verified {
            return Err(AuthError::EmailAlreadyVerified.into());
        }

        self.verification_service.verify_code(user_id, code).await?;

        let mut changes = UserUpdate::new().email_verified(true);
        if user.status == UserStatus::PendingVerification {
            changes = changes.status(UserStatus::Active);
        }

        let user = self
            .retry
            .run("mark_email_verified", || {
                self.user_repository.update(user_id, changes.clone())
            })
            .await?;

        info!(user_id = %user_id, "Email verified");
        Ok(user)
    }

    /// Issue and send a new verification code, replacing the pending one
    pub async fn resend_verification(&self, user_id: Uuid) -> DomainResult<SendCodeResult> {
        let user = self.load_user(user_id).await?;
        if user.is_email_verified {
            return Err(AuthError::EmailAlreadyVerified.into());
        }

        self.verification_service.send_code(user.id, &user.email).await
    }

    pub async fn get_profile(&self, user_id: Uuid) -> DomainResult<User> {
        self.load_user(user_id).await
    }

    /// Profile of the subject of a verified access token. A user deleted
    /// after the token was issued reads as an invalid token.
    pub async fn current_user(&self, user_id: Uuid) -> DomainResult<User> {
        match self.load_user(user_id).await {
            Err(DomainError::NotFound { .. }) => Err(TokenError::Invalid.into()),
            other => other,
        }
    }

    /// One page of users, oldest first, with the total count
    pub async fn list_users(&self, pagination: Pagination) -> DomainResult<(Vec<User>, u64)> {
        let pagination = pagination.validate();

        let users = self
            .retry
            .run("list_users", || {
                self.user_repository
                    .list(pagination.limit(), pagination.offset())
            })
            .await?;
        let total = self
            .retry
            .run("count_users", || self.user_repository.count())
            .await?;

        Ok((users, total))
    }

    /// Delete a user together with their sessions and pending verification
    pub async fn delete_user(&self, user_id: Uuid) -> DomainResult<()> {
        self.load_user(user_id).await?;

        self.token_service.revoke_all_user_tokens(user_id).await?;
        self.verification_service.discard(user_id).await?;
        self.retry
            .run("delete_user", || self.user_repository.delete(user_id))
            .await?;

        info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    /// Remove expired refresh tokens and revocation entries
    pub async fn cleanup_expired_tokens(&self) -> DomainResult<CleanupReport> {
        self.token_service.cleanup_expired().await
    }

    async fn load_user(&self, user_id: Uuid) -> DomainResult<User> {
        self.retry
            .run("find_user_by_id", || self.user_repository.find_by_id(user_id))
            .await?
            .ok_or_else(|| DomainError::not_found("User"))
    }
}

fn ensure_can_authenticate(user: &User) -> Result<(), AuthError> {
    match user.status {
        UserStatus::Suspended => Err(AuthError::AccountSuspended),
        UserStatus::Inactive => Err(AuthError::AccountInactive),
        UserStatus::Active | UserStatus::PendingVerification => Ok(()),
    }
}

fn parse_names(first_name: &str, last_name: &str) -> DomainResult<(String, String)> {
    let mut fields = FieldErrors::new();

    let first = PersonName::parse(first_name)
        .map_err(|msg| fields.entry("firstName".to_string()).or_default().push(msg))
        .ok();
    let last = PersonName::parse(last_name)
        .map_err(|msg| fields.entry("lastName".to_string()).or_default().push(msg))
        .ok();

    match (first, last) {
        (Some(first), Some(last)) => Ok((first.into_inner(), last.into_inner())),
        _ => Err(DomainError::InvalidInput { fields }),
    }
}
