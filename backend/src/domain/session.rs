//! Typed session payload and the authentication state derived from it.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Session key the payload is stored under.
pub const SESSION_PAYLOAD_KEY: &str = "auth";

/// Absolute session lifetime measured from `issued_at`.
pub const SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// Everything the server keeps in a client session.
///
/// ## Invariants
/// - `session_id` is fresh for every established session and is what logout
///   revokes.
/// - `issued_at` is Unix seconds and never moves forward for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    session_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    issued_at: i64,
}

impl SessionPayload {
    /// New session bound to `user_id`, issued at `now`.
    pub fn authenticated(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id: Some(user_id),
            issued_at: now.timestamp(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Instant the session stops being valid.
    pub fn expires_at(&self) -> DateTime<Utc> {
        let ttl = TimeDelta::seconds(i64::try_from(SESSION_TTL.as_secs()).unwrap_or(i64::MAX));
        DateTime::from_timestamp(self.issued_at, 0)
            .and_then(|issued| issued.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the absolute window has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// Authentication state of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(UserId),
}

impl AuthState {
    pub fn user_id(self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(id),
        }
    }

    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}
