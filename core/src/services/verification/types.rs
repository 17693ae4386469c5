//! Types for verification service results

use chrono::{DateTime, Utc};

/// Result of issuing a verification code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendCodeResult {
    /// When the new code stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Whether the email service accepted the message
    pub delivered: bool,
}
