//! Email verification code entity.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Pending email verification for one user. Only the code hash is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailVerification {
    pub id: Uuid,

    pub user_id: Uuid,

    /// Hex SHA-256 of the 6-digit code
    pub code_hash: String,

    /// Failed attempts so far
    pub attempts: u32,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl EmailVerification {
    /// Creates a verification for `user_id` and returns it with the plaintext code.
    ///
    /// The plaintext leaves this function only to be delivered to the user.
    pub fn issue(user_id: Uuid, now: DateTime<Utc>, ttl_minutes: i64) -> (Self, String) {
        let code = Self::generate_code();
        let verification = Self {
            id: Uuid::new_v4(),
            user_id,
            code_hash: Self::hash_code(&code),
            attempts: 0,
            created_at: now,
            expires_at: now + Duration::minutes(ttl_minutes),
        };
        (verification, code)
    }

    /// Uniform random 6-digit code from the thread-local CSPRNG
    fn generate_code() -> String {
        let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
        format!("{:0width$}", code, width = CODE_LENGTH)
    }

    pub fn hash_code(code: &str) -> String {
        format!("{:x}", Sha256::digest(code.trim().as_bytes()))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Constant-time comparison against the stored hash
    pub fn matches(&self, input_code: &str) -> bool {
        let candidate = Self::hash_code(input_code);
        constant_time_eq(candidate.as_bytes(), self.code_hash.as_bytes())
    }
}
