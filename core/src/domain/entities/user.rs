//! User entity representing a registered shopper, vendor or staff member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role granted to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    /// Default role for self-registered accounts
    #[default]
    Customer,
    Moderator,
    Vendor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Customer => "customer",
            UserRole::Moderator => "moderator",
            UserRole::Vendor => "vendor",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "customer" => Ok(UserRole::Customer),
            "moderator" => Ok(UserRole::Moderator),
            "vendor" => Ok(UserRole::Vendor),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Registered, email not verified yet
    #[default]
    PendingVerification,
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::PendingVerification => "pending_verification",
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
        }
    }

    /// Whether an account in this status may log in and refresh tokens
    pub fn can_authenticate(&self) -> bool {
        matches!(self, UserStatus::Active | UserStatus::PendingVerification)
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_verification" => Ok(UserStatus::PendingVerification),
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "suspended" => Ok(UserStatus::Suspended),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// User entity representing a registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, assigned by the store on insert
    pub id: Uuid,

    /// Normalized (trimmed, lowercased) email address
    pub email: String,

    /// bcrypt hash, never the plaintext
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub status: UserStatus,

    /// Flips to true only through email verification
    pub is_email_verified: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Builds the stored representation of a new account
    pub fn from_new(id: Uuid, new_user: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: new_user.email,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            role: new_user.role,
            status: new_user.status,
            is_email_verified: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Whether the account may log in and refresh tokens
    pub fn can_authenticate(&self) -> bool {
        self.status.can_authenticate()
    }
}

/// Fields required to create a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub status: UserStatus,
}

impl NewUser {
    /// A self-registered customer awaiting email verification
    pub fn customer(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role: UserRole::Customer,
            status: UserStatus::PendingVerification,
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }
}

/// Partial update. `None` leaves the field untouched; `updated_at` always moves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub is_email_verified: Option<bool>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    pub fn first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    pub fn last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    pub fn role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn email_verified(mut self, verified: bool) -> Self {
        self.is_email_verified = Some(verified);
        self
    }

    pub fn last_login_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_login_at = Some(at);
        self
    }

    /// Applies the set fields to `user` and stamps `updated_at`
    pub fn apply_to(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(hash) = &self.password_hash {
            user.password_hash = hash.clone();
        }
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
        if let Some(verified) = self.is_email_verified {
            user.is_email_verified = verified;
        }
        if let Some(at) = self.last_login_at {
            user.last_login_at = Some(at);
        }
        user.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_user() -> User {
        User::from_new(
            Uuid::new_v4(),
            NewUser::customer("ann@example.com", "$2b$12$hash", "Ann", "Lee"),
            Utc::now(),
        )
    }

    #[test]
    fn test_new_user_starts_pending_customer() {
        let user = sample_user();

        assert_eq!(user.role, UserRole::Customer);
        assert_eq!(user.status, UserStatus::PendingVerification);
        assert!(!user.is_email_verified);
        assert!(user.last_login_at.is_none());
        assert_eq!(user.created_at, user.updated_at);
        assert_eq!(user.full_name(), "Ann Lee");
    }

    #[test]
    fn test_status_authentication_rules() {
        assert!(UserStatus::Active.can_authenticate());
        assert!(UserStatus::PendingVerification.can_authenticate());
        assert!(!UserStatus::Suspended.can_authenticate());
        assert!(!UserStatus::Inactive.can_authenticate());
    }

    #[test]
    fn test_update_touches_only_set_fields() {
        let mut user = sample_user();
        let later = user.updated_at + Duration::minutes(5);

        UserUpdate::new()
            .status(UserStatus::Active)
            .email_verified(true)
            .apply_to(&mut user, later);

        assert_eq!(user.status, UserStatus::Active);
        assert!(user.is_email_verified);
        assert_eq!(user.first_name, "Ann");
        assert_eq!(user.updated_at, later);
    }

    #[test]
    fn test_empty_update_still_bumps_updated_at() {
        let mut user = sample_user();
        let later = user.updated_at + Duration::seconds(1);

        UserUpdate::new().apply_to(&mut user, later);

        assert_eq!(user.updated_at, later);
    }

    #[test]
    fn test_enum_string_round_trip() {
        for role in [UserRole::Admin, UserRole::Customer, UserRole::Moderator, UserRole::Vendor] {
            assert_eq!(role.as_str().parse::<UserRole>(), Ok(role));
        }
        assert_eq!(
            serde_json::to_string(&UserStatus::PendingVerification).unwrap(),
            "\"pending_verification\""
        );
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ann@example.com");
    }
}
