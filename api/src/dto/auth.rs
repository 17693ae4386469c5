//! Request and response bodies for the `/auth` endpoints.
//!
//! Bodies use camelCase field names. Request structs only enforce shape and
//! size here; email format and password strength are checked by the
//! authentication service so they map to their own error codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use ec_core::domain::entities::token::TokenPair;
use ec_core::domain::entities::user::{User, UserRole, UserStatus};
use ec_core::domain::value_objects::AuthResponse;
use ec_core::services::SendCodeResult;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 254, message = "email is required"))]
    pub email: String,

    #[validate(length(min = 1, max = 256, message = "password is required"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254, message = "email is required"))]
    pub email: String,

    #[validate(length(min = 1, max = 256, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "refresh token is required"))]
    pub refresh_token: String,
}

/// Optional body of `POST /auth/logout`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, max = 256, message = "current password is required"))]
    pub current_password: String,

    #[validate(length(min = 1, max = 256, message = "new password is required"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    /// 6-digit code from the verification email
    #[validate(length(equal = 6, message = "code must be 6 digits"))]
    pub code: String,
}

/// User as shown to clients. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            status: user.status,
            is_email_verified: user.is_email_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Token pair returned by login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

impl From<TokenPair> for TokenResponse {
    fn from(tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: String::from("Bearer"),
            expires_in: tokens.access_expires_in,
            refresh_expires_in: tokens.refresh_expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenResponse,
    pub user: UserResponse,
}

impl From<AuthResponse> for LoginResponse {
    fn from(response: AuthResponse) -> Self {
        Self {
            tokens: response.tokens.into(),
            user: response.user.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendVerificationResponse {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl From<SendCodeResult> for ResendVerificationResponse {
    fn from(result: SendCodeResult) -> Self {
        let message = if result.delivered {
            "Verification code sent"
        } else {
            "Verification code issued but the email could not be sent, try again shortly"
        };
        Self {
            message: message.to_string(),
            expires_at: result.expires_at,
        }
    }
}
