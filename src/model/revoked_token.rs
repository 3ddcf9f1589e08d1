use chrono::{DateTime, Utc};

/// Logged-out credential, kept until the credential itself would have expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedToken {
    pub jti: String,
    pub user_id: u64,
    pub revoked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
