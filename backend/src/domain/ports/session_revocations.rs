//! Port for the registry of sessions ended by logout.
//!
//! Client-held sessions cannot be destroyed server-side, so logout records
//! the session id here until the session would have expired anyway.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Registry of revoked session identifiers.
#[cfg_attr(test, mockall::automock)]
pub trait SessionRevocations: Send + Sync {
    /// Treat `session_id` as revoked until `until`.
    fn revoke(&self, session_id: Uuid, until: DateTime<Utc>);

    /// Whether `session_id` has been revoked and the revocation is live.
    fn is_revoked(&self, session_id: Uuid) -> bool;
}
