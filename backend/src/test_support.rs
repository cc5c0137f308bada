//! Deterministic doubles shared by unit and integration tests.
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature.

use std::cell::{Cell, RefCell};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{SessionHandle, SessionStoreError};
use crate::domain::{CredentialCodec, CredentialHasher, SessionPayload};

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}"),
        };
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Session handle backed by a cell, standing in for a cookie session.
#[derive(Debug, Default)]
pub struct MemorySession {
    payload: RefCell<Option<SessionPayload>>,
    purged: Cell<bool>,
    renewals: Cell<usize>,
}

impl MemorySession {
    /// Session that already carries `payload`, as a replayed cookie would.
    pub fn with_payload(payload: SessionPayload) -> Self {
        Self {
            payload: RefCell::new(Some(payload)),
            ..Self::default()
        }
    }

    pub fn payload(&self) -> Option<SessionPayload> {
        self.payload.borrow().clone()
    }

    pub fn is_purged(&self) -> bool {
        self.purged.get()
    }

    pub fn renewals(&self) -> usize {
        self.renewals.get()
    }
}

impl SessionHandle for MemorySession {
    fn load(&self) -> Result<Option<SessionPayload>, SessionStoreError> {
        Ok(self.payload())
    }

    fn store(&self, payload: &SessionPayload) -> Result<(), SessionStoreError> {
        self.purged.set(false);
        *self.payload.borrow_mut() = Some(payload.clone());
        Ok(())
    }

    fn renew(&self) {
        self.renewals.set(self.renewals.get() + 1);
    }

    fn purge(&self) {
        self.purged.set(true);
        self.payload.borrow_mut().take();
    }
}

/// Hasher using the cheapest Argon2id cost so tests stay fast.
pub fn low_cost_hasher() -> CredentialHasher {
    CredentialHasher::new(CredentialCodec::low_cost(), 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    #[test]
    fn clock_advances_on_request() {
        let start = DateTime::from_timestamp(0, 0).expect("epoch");
        let clock = MutableClock::new(start);
        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.utc().timestamp(), 90);
    }

    #[test]
    fn purge_clears_the_payload() {
        let now = DateTime::from_timestamp(0, 0).expect("epoch");
        let session = MemorySession::with_payload(SessionPayload::authenticated(UserId::new(1), now));
        session.purge();
        assert!(session.is_purged());
        assert_eq!(session.load(), Ok(None));
    }
}
