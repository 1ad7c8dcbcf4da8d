//! Refresh token records

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Persisted refresh token row. Immutable apart from `revoked_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RefreshToken {
    pub token: String,
    #[sqlx(rename = "user_id")]
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Usable iff not revoked and `now < expires_at`
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired_at(now)
    }
}

/// Insert payload for the refresh token repository
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub token: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<NewRefreshToken> for RefreshToken {
    fn from(new: NewRefreshToken) -> Self {
        Self {
            token: new.token,
            owner_id: new.owner_id,
            created_at: new.created_at,
            expires_at: new.expires_at,
            revoked_at: None,
        }
    }
}
