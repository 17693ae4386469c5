//! Authentication and authorization configuration

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{ConfigError, Environment};

/// Lowest bcrypt cost accepted anywhere in the service
pub const MIN_BCRYPT_COST: u32 = 12;

/// Minimum signing secret length in bytes outside development
pub const MIN_SECRET_LENGTH: usize = 32;

/// JWT authentication configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Symmetric secret for HS256 signing
    pub secret: String,

    /// Access token lifetime in seconds
    pub access_token_expiry: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: generate_ephemeral_secret(),
            access_token_expiry: 3600,      // 1 hour
            refresh_token_expiry: 2592000,  // 30 days
            issuer: String::from("ecommerce-auth"),
            audience: String::from("ecommerce-api"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Load from the environment.
    ///
    /// `JWT_SECRET` is mandatory outside development. In development a random
    /// per-process secret is used, so tokens do not survive restarts.
    pub fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment.is_development() => {
                tracing::warn!("JWT_SECRET not set, using an ephemeral development secret");
                defaults.secret
            }
            _ => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        Ok(Self {
            secret,
            access_token_expiry: super::env_or("JWT_ACCESS_TOKEN_TTL", defaults.access_token_expiry),
            refresh_token_expiry: super::env_or("JWT_REFRESH_TOKEN_TTL", defaults.refresh_token_expiry),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
        })
    }

    /// Set access token expiry in seconds
    pub fn with_access_expiry_seconds(mut self, seconds: i64) -> Self {
        self.access_token_expiry = seconds;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check the configuration for the given environment
    pub fn validate(&self, environment: Environment) -> Result<(), ConfigError> {
        if self.access_token_expiry <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_ACCESS_TOKEN_TTL",
                reason: "must be positive".into(),
            });
        }
        if self.refresh_token_expiry <= self.access_token_expiry {
            return Err(ConfigError::Invalid {
                key: "JWT_REFRESH_TOKEN_TTL",
                reason: "must be longer than the access token lifetime".into(),
            });
        }
        if !environment.is_development() && self.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                reason: format!("must be at least {} bytes", MIN_SECRET_LENGTH),
            });
        }
        Ok(())
    }
}

/// Password hashing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordConfig {
    /// bcrypt cost factor
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: MIN_BCRYPT_COST,
        }
    }
}

impl PasswordConfig {
    pub fn from_env() -> Self {
        Self {
            bcrypt_cost: super::env_or("BCRYPT_COST", MIN_BCRYPT_COST),
        }
    }
}

/// Email verification code configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Code lifetime in minutes
    pub code_ttl_minutes: i64,

    /// Failed attempts allowed before the code is discarded
    pub max_attempts: u32,

    /// From address on verification emails
    pub sender: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: 24 * 60,
            max_attempts: 5,
            sender: String::from("no-reply@localhost"),
        }
    }
}

impl VerificationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            code_ttl_minutes: super::env_or("VERIFICATION_CODE_TTL_MINUTES", defaults.code_ttl_minutes),
            max_attempts: super::env_or("VERIFICATION_MAX_ATTEMPTS", defaults.max_attempts),
            sender: std::env::var("EMAIL_FROM").unwrap_or(defaults.sender),
        }
    }
}

/// Where revoked access-token identifiers are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RevocationBackend {
    /// `revoked_tokens` table in the primary database
    #[default]
    Database,
    /// Redis keys with a TTL
    Redis,
    /// Process-local map, single instance only
    Memory,
}

impl std::str::FromStr for RevocationBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "database" | "db" | "sqlite" => Ok(RevocationBackend::Database),
            "redis" => Ok(RevocationBackend::Redis),
            "memory" => Ok(RevocationBackend::Memory),
            _ => Err(format!("Invalid revocation backend: {}", s)),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Password hashing configuration
    #[serde(default)]
    pub password: PasswordConfig,

    /// Email verification configuration
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Revocation set backend
    #[serde(default)]
    pub revocation_backend: RevocationBackend,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        let revocation_backend = match std::env::var("REVOCATION_BACKEND") {
            Ok(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                key: "REVOCATION_BACKEND",
                reason,
            })?,
            Err(_) => RevocationBackend::default(),
        };

        Ok(Self {
            jwt: JwtConfig::from_env(environment)?,
            password: PasswordConfig::from_env(),
            verification: VerificationConfig::from_env(),
            revocation_backend,
        })
    }

    /// Check every section for the given environment
    pub fn validate(&self, environment: Environment) -> Result<(), ConfigError> {
        self.jwt.validate(environment)?;

        if self.password.bcrypt_cost < MIN_BCRYPT_COST {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                reason: format!("must be at least {}", MIN_BCRYPT_COST),
            });
        }
        if self.verification.code_ttl_minutes <= 0 || self.verification.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "VERIFICATION_CODE_TTL_MINUTES",
                reason: "code lifetime and attempt limit must be positive".into(),
            });
        }
        let sender = self.verification.sender.trim();
        if sender.is_empty() || !sender.contains('@') {
            return Err(ConfigError::Invalid {
                key: "EMAIL_FROM",
                reason: format!("not an email address: {:?}", self.verification.sender),
            });
        }
        if environment.is_production() && self.revocation_backend == RevocationBackend::Memory {
            return Err(ConfigError::Invalid {
                key: "REVOCATION_BACKEND",
                reason: "memory backend is not shared between instances".into(),
            });
        }
        Ok(())
    }
}

fn generate_ephemeral_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
