//! Driving port for credential checks.
//!
//! HTTP handlers depend on this trait rather than on the directory and codec
//! so their tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{AuthError, LoginCredentials, UserId};

/// Verify login credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Return the id of the user the credentials belong to.
    ///
    /// Unknown usernames, malformed usernames, and wrong passwords all fail
    /// with [`AuthError::InvalidCredentials`].
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, AuthError>;
}
