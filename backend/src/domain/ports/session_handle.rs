//! Port for the per-request session handle.
//!
//! The handle wraps whatever carries session state for the current request
//! (a signed cookie in production). Writes are flushed by the adapter when
//! the response is produced.

use crate::domain::SessionPayload;

use super::define_port_error;

define_port_error! {
    /// Errors raised by session store adapters.
    pub enum SessionStoreError {
        /// The stored payload could not be read or decoded.
        Read { message: String } => "session read failed: {message}",
        /// The payload could not be written.
        Write { message: String } => "session write failed: {message}",
    }
}

/// Request-scoped access to the session store.
#[cfg_attr(test, mockall::automock)]
pub trait SessionHandle {
    /// Read the stored payload, if any.
    fn load(&self) -> Result<Option<SessionPayload>, SessionStoreError>;

    /// Replace the stored payload.
    fn store(&self, payload: &SessionPayload) -> Result<(), SessionStoreError>;

    /// Rotate the session key while keeping its state.
    fn renew(&self);

    /// Drop all state and expire the client's cookie.
    fn purge(&self);
}
