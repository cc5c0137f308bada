//! Revoked session ids kept until they would have expired.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::SessionRevocations;

/// In-memory revocation registry.
///
/// Entries are pruned lazily on every write once their expiry passes, so the
/// map stays bounded by the number of sessions logged out within one session
/// lifetime.
pub struct InMemorySessionRevocations {
    clock: Arc<dyn Clock>,
    revoked: Mutex<HashMap<Uuid, DateTime<Utc>>>,
}

impl InMemorySessionRevocations {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            revoked: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live revocations.
    pub fn live(&self) -> usize {
        let now = self.clock.utc();
        match self.revoked.lock() {
            Ok(revoked) => revoked.values().filter(|until| **until > now).count(),
            Err(_) => 0,
        }
    }
}

impl SessionRevocations for InMemorySessionRevocations {
    fn revoke(&self, session_id: Uuid, until: DateTime<Utc>) {
        let now = self.clock.utc();
        let Ok(mut revoked) = self.revoked.lock() else {
            warn!(%session_id, "revocation registry poisoned; session not revoked");
            return;
        };
        revoked.retain(|_, expiry| *expiry > now);
        if until > now {
            revoked.insert(session_id, until);
        }
    }

    fn is_revoked(&self, session_id: Uuid) -> bool {
        let now = self.clock.utc();
        match self.revoked.lock() {
            Ok(revoked) => revoked.get(&session_id).is_some_and(|until| *until > now),
            // Fail closed: a poisoned registry cannot vouch for any session.
            Err(_) => true,
        }
    }
}
