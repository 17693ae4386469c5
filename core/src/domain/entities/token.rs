//! Token entities for JWT access tokens and opaque refresh tokens.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserRole;

/// Default access token lifetime (1 hour)
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

/// Default refresh token lifetime (30 days)
pub const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Token-type discriminator carried in the `type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    pub email: String,

    pub role: UserRole,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// JWT ID, the key used in the revocation set
    pub jti: String,

    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,
}

impl Claims {
    /// Creates claims for an access token issued at `now`
    pub fn new_access_token(
        user_id: Uuid,
        email: impl Into<String>,
        role: UserRole,
        now: DateTime<Utc>,
        ttl_seconds: i64,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        let iat = now.timestamp();
        Self {
            sub: user_id.to_string(),
            email: email.into(),
            role,
            iat,
            exp: iat + ttl_seconds,
            jti: Uuid::new_v4().to_string(),
            token_type: TokenType::Access,
            iss: issuer.into(),
            aud: audience.into(),
        }
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Expired once `now` reaches `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Refresh token record. Only the SHA-256 of the token value is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: Uuid,

    /// User ID this token belongs to
    pub user_id: Uuid,

    /// Hex SHA-256 of the token value
    pub token_hash: String,

    /// Shared by every token rotated from the same login
    pub family_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
}

impl RefreshToken {
    /// Creates a refresh token record starting at `now`
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        family_id: Uuid,
        now: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            family_id,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_seconds),
            is_revoked: false,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Not expired and not revoked
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now) && !self.is_revoked
    }

    pub fn revoke(&mut self) {
        self.is_revoked = true;
    }

    /// Remaining lifetime, zero once expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// Opaque refresh token
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in,
            refresh_expires_in,
        }
    }
}
