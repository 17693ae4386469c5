//! Main token service implementation

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::domain::entities::token::{Claims, RefreshToken, TokenPair, TokenType};
use crate::domain::entities::user::{User, UserRole};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::{RevocationStore, TokenRepository};
use crate::services::retry::RetryPolicy;

use super::config::TokenServiceConfig;

/// Random bytes behind each refresh token
const REFRESH_TOKEN_BYTES: usize = 32;

/// SHA-256 of a refresh token, hex encoded. This is what gets stored.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Outcome of a successful refresh token rotation
#[derive(Debug, Clone)]
pub struct RotatedRefreshToken {
    /// Owner of the rotated chain
    pub user_id: Uuid,
    /// New opaque token handed to the client
    pub token: String,
    /// Stored record of the new token
    pub record: RefreshToken,
}

/// Rows removed by a cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub refresh_tokens: u64,
    pub revocations: u64,
}

/// Service for managing JWT access tokens and opaque refresh tokens
pub struct TokenService<T: TokenRepository, R: RevocationStore> {
    repository: T,
    revocation_store: R,
    config: TokenServiceConfig,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl<T: TokenRepository, R: RevocationStore> TokenService<T, R> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Refresh token persistence
    /// * `revocation_store` - Revoked access token identifiers
    /// * `config` - Secret, lifetimes, issuer and audience
    ///
    /// # Returns
    ///
    /// The service, or `DomainError::Config` for an empty secret or a
    /// non-positive lifetime
    pub fn new(
        repository: T,
        revocation_store: R,
        config: TokenServiceConfig,
    ) -> Result<Self, DomainError> {
        if config.jwt_secret.is_empty() {
            return Err(DomainError::Config {
                message: "JWT secret must not be empty".to_string(),
            });
        }
        if config.access_token_ttl_seconds <= 0 || config.refresh_token_ttl_seconds <= 0 {
            return Err(DomainError::Config {
                message: "token lifetimes must be positive".to_string(),
            });
        }

        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        // Expiry is checked against the injected clock after decoding.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Ok(Self {
            repository,
            revocation_store,
            config,
            clock: Arc::new(SystemClock),
            retry: RetryPolicy::default(),
            encoding_key,
            decoding_key,
            validation,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn access_token_ttl(&self) -> i64 {
        self.config.access_token_ttl_seconds
    }

    pub fn refresh_token_ttl(&self) -> i64 {
        self.config.refresh_token_ttl_seconds
    }

    /// Signs a new access token
    pub fn issue_access_token(
        &self,
        user_id: Uuid,
        email: &str,
        role: UserRole,
    ) -> DomainResult<(String, Claims)> {
        let claims = Claims::new_access_token(
            user_id,
            email,
            role,
            self.clock.now(),
            self.config.access_token_ttl_seconds,
            self.config.issuer.clone(),
            self.config.audience.clone(),
        );
        let token = self.encode_jwt(&claims)?;

        debug!(user_id = %user_id, jti = %claims.jti, "Issued access token");
        Ok((token, claims))
    }

    /// Issues a refresh token that starts a new family
    pub async fn issue_refresh_token(&self, user_id: Uuid) -> DomainResult<(String, RefreshToken)> {
        self.issue_refresh_token_in_family(user_id, Uuid::new_v4()).await
    }

    async fn issue_refresh_token_in_family(
        &self,
        user_id: Uuid,
        family_id: Uuid,
    ) -> DomainResult<(String, RefreshToken)> {
        let token = generate_opaque_token();
        let record = RefreshToken::new(
            user_id,
            hash_token(&token),
            family_id,
            self.clock.now(),
            self.config.refresh_token_ttl_seconds,
        );

        let saved = self
            .retry
            .run("save_refresh_token", || {
                self.repository.save_refresh_token(record.clone())
            })
            .await?;

        debug!(user_id = %user_id, family_id = %family_id, "Issued refresh token");
        Ok((token, saved))
    }

    /// Issues an access token and a refresh token starting a new family
    pub async fn issue_token_pair(&self, user: &User) -> DomainResult<TokenPair> {
        let (access_token, _) = self.issue_access_token(user.id, &user.email, user.role)?;
        let (refresh_token, _) = self.issue_refresh_token(user.id).await?;

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_ttl_seconds,
            self.config.refresh_token_ttl_seconds,
        ))
    }

    /// Encodes claims into a JWT
    pub(crate) fn encode_jwt(&self, claims: &Claims) -> Result<String, DomainError> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::GenerationFailed))
    }

    /// Checks signature, algorithm, issuer and audience only
    fn decode_signed(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    /// Verifies an access token and returns its claims
    ///
    /// Checks run in order: signature and registered claims, token type,
    /// expiry against the service clock, then the revocation set. A store
    /// failure during the revocation lookup is returned as-is, never treated
    /// as "not revoked".
    pub async fn verify_access_token(&self, token: &str) -> DomainResult<Claims> {
        let claims = self.decode_signed(token)?;

        if claims.token_type != TokenType::Access {
            return Err(TokenError::WrongType.into());
        }
        if claims.user_id().is_err() {
            return Err(TokenError::Invalid.into());
        }
        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired.into());
        }

        let revoked = self
            .retry
            .run("is_revoked", || self.revocation_store.is_revoked(&claims.jti))
            .await?;
        if revoked {
            return Err(TokenError::Revoked.into());
        }

        Ok(claims)
    }

    async fn find_refresh_record(&self, token: &str) -> DomainResult<RefreshToken> {
        let token_hash = hash_token(token);
        let record = self
            .retry
            .run("find_refresh_token", || {
                self.repository.find_refresh_token(&token_hash)
            })
            .await?
            .ok_or(TokenError::Invalid)?;
        Ok(record)
    }

    /// Looks up a refresh token by value and checks it is usable
    async fn find_usable_refresh_token(&self, token: &str) -> DomainResult<RefreshToken> {
        let record = self.find_refresh_record(token).await?;

        if record.is_revoked {
            return Err(TokenError::Revoked.into());
        }
        if record.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired.into());
        }

        Ok(record)
    }

    /// Verifies a refresh token and returns its owner
    pub async fn verify_refresh_token(&self, token: &str) -> DomainResult<Uuid> {
        self.find_usable_refresh_token(token)
            .await
            .map(|record| record.user_id)
    }

    /// Consumes a refresh token and issues its successor in the same family
    ///
    /// Presenting a token that was already rotated, or losing the race to
    /// rotate it, revokes the whole family.
    pub async fn rotate_refresh_token(&self, token: &str) -> DomainResult<RotatedRefreshToken> {
        let record = self.find_refresh_record(token).await?;

        if record.is_revoked {
            self.revoke_family_after_reuse(&record).await?;
            return Err(TokenError::Revoked.into());
        }
        if record.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired.into());
        }

        let consumed = self
            .retry
            .run("revoke_token", || self.repository.revoke_token(&record.token_hash))
            .await?;
        if !consumed {
            self.revoke_family_after_reuse(&record).await?;
            return Err(TokenError::Revoked.into());
        }

        let (new_token, new_record) = self
            .issue_refresh_token_in_family(record.user_id, record.family_id)
            .await?;

        info!(user_id = %record.user_id, family_id = %record.family_id, "Rotated refresh token");
        Ok(RotatedRefreshToken {
            user_id: record.user_id,
            token: new_token,
            record: new_record,
        })
    }

    async fn revoke_family_after_reuse(&self, record: &RefreshToken) -> DomainResult<()> {
        let revoked = self
            .retry
            .run("revoke_token_family", || {
                self.repository.revoke_token_family(record.family_id)
            })
            .await?;
        warn!(
            user_id = %record.user_id,
            family_id = %record.family_id,
            revoked,
            "Refresh token reuse detected, family revoked"
        );
        Ok(())
    }

    /// Revokes a whole refresh token family
    pub async fn revoke_family(&self, family_id: Uuid) -> DomainResult<u64> {
        self.retry
            .run("revoke_token_family", || {
                self.repository.revoke_token_family(family_id)
            })
            .await
    }

    /// Revokes either kind of token
    ///
    /// Anything shaped like a JWT is handled as an access token, everything
    /// else as an opaque refresh token.
    pub async fn revoke(&self, token: &str) -> DomainResult<()> {
        if looks_like_jwt(token) {
            self.revoke_access_token(token).await
        } else {
            self.revoke_refresh_token(token).await.map(|_| ())
        }
    }

    /// Adds an access token to the revocation set until it would expire anyway
    ///
    /// Revoking an already expired token is a no-op.
    pub async fn revoke_access_token(&self, token: &str) -> DomainResult<()> {
        let claims = self.decode_signed(token)?;
        let expires_at = claims.expires_at();

        if expires_at <= self.clock.now() {
            debug!(jti = %claims.jti, "Access token already expired, nothing to revoke");
            return Ok(());
        }

        self.retry
            .run("revoke_access_token", || {
                self.revocation_store.revoke(&claims.jti, expires_at)
            })
            .await?;

        info!(sub = %claims.sub, jti = %claims.jti, "Access token revoked");
        Ok(())
    }

    /// Marks a refresh token revoked. Returns `false` if it was unknown or
    /// already revoked.
    pub async fn revoke_refresh_token(&self, token: &str) -> DomainResult<bool> {
        let token_hash = hash_token(token);
        self.retry
            .run("revoke_token", || self.repository.revoke_token(&token_hash))
            .await
    }

    /// Revokes every refresh token the user holds
    pub async fn revoke_all_user_tokens(&self, user_id: Uuid) -> DomainResult<u64> {
        let revoked = self
            .retry
            .run("revoke_all_user_tokens", || {
                self.repository.revoke_all_user_tokens(user_id)
            })
            .await?;

        info!(user_id = %user_id, revoked, "Revoked all refresh tokens for user");
        Ok(revoked)
    }

    /// Number of refresh tokens that could still be used
    pub async fn count_active_refresh_tokens(&self, user_id: Uuid) -> DomainResult<u64> {
        let now = self.clock.now();
        self.retry
            .run("count_active_tokens", || {
                self.repository.count_active_tokens(user_id, now)
            })
            .await
    }

    /// Deletes expired refresh tokens and expired revocation entries
    pub async fn cleanup_expired(&self) -> DomainResult<CleanupReport> {
        let now = self.clock.now();
        let refresh_tokens = self
            .retry
            .run("delete_expired_tokens", || {
                self.repository.delete_expired_tokens(now)
            })
            .await?;
        let revocations = self
            .retry
            .run("purge_expired_revocations", || {
                self.revocation_store.purge_expired()
            })
            .await?;

        info!(refresh_tokens, revocations, "Expired token cleanup finished");
        Ok(CleanupReport {
            refresh_tokens,
            revocations,
        })
    }
}

fn generate_opaque_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn looks_like_jwt(token: &str) -> bool {
    token.split('.').count() == 3
}
