//! Login, logout, and the per-request authentication state machine.
//!
//! [`CredentialAuthenticator`] checks credentials against the directory.
//! [`AuthenticationController`] binds the outcome to a session and answers
//! gating checks from the session alone.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use super::credential::EncodedCredential;
use super::deadline;
use super::hashing::CredentialHasher;
use super::ports::{
    LoginService, SessionHandle, SessionRevocations, UserDirectory, UserDirectoryError,
};
use super::{AuthError, AuthState, LoginCredentials, Password, SessionPayload, UserId, Username};

/// Directory-backed credential check.
///
/// Every failed attempt costs one key derivation, whether or not the
/// username exists.
pub struct CredentialAuthenticator {
    directory: Arc<dyn UserDirectory>,
    hasher: CredentialHasher,
    directory_timeout: Duration,
}

impl CredentialAuthenticator {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        hasher: CredentialHasher,
        directory_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            hasher,
            directory_timeout,
        }
    }

    async fn deny(&self, password: &Password) -> Result<UserId, AuthError> {
        self.hasher
            .verify(password, &EncodedCredential::decoy())
            .await?;
        Err(AuthError::InvalidCredentials)
    }
}

#[async_trait]
impl LoginService for CredentialAuthenticator {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, AuthError> {
        let password = credentials.password();
        let Ok(username) = Username::parse(credentials.username()) else {
            debug!("login rejected: username fails format policy");
            return self.deny(password).await;
        };

        let lookup = deadline::within(
            self.directory_timeout,
            "find_by_username",
            self.directory.find_by_username(&username),
        )
        .await?;

        let user = match lookup {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(%username, "login rejected");
                return self.deny(password).await;
            }
            Err(UserDirectoryError::Connection { message }) => {
                return Err(AuthError::DependencyUnavailable {
                    dependency: super::auth_error::USER_DIRECTORY,
                    message,
                });
            }
            Err(error) => {
                warn!(%username, %error, "user lookup failed during login");
                return self.deny(password).await;
            }
        };

        if self.hasher.verify(password, user.credential()).await? {
            Ok(user.id())
        } else {
            debug!(%username, "login rejected");
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Session-bound authentication state machine.
///
/// States are [`AuthState::Anonymous`] and [`AuthState::Authenticated`].
/// Reads never mutate the session; only `login` and `logout` do.
#[derive(Clone)]
pub struct AuthenticationController {
    login: Arc<dyn LoginService>,
    revocations: Arc<dyn SessionRevocations>,
    clock: Arc<dyn Clock>,
}

impl AuthenticationController {
    pub fn new(
        login: Arc<dyn LoginService>,
        revocations: Arc<dyn SessionRevocations>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            login,
            revocations,
            clock,
        }
    }

    /// Current state of `session`.
    ///
    /// Expired, revoked, unreadable, and identity-less sessions all read as
    /// anonymous.
    pub fn state(&self, session: &dyn SessionHandle) -> AuthState {
        let payload = match session.load() {
            Ok(Some(payload)) => payload,
            Ok(None) => return AuthState::Anonymous,
            Err(error) => {
                warn!(%error, "discarding unreadable session payload");
                return AuthState::Anonymous;
            }
        };

        let Some(user_id) = payload.user_id() else {
            return AuthState::Anonymous;
        };
        if payload.is_expired(self.clock.utc()) {
            debug!(%user_id, "session expired");
            return AuthState::Anonymous;
        }
        if self.revocations.is_revoked(payload.session_id()) {
            debug!(%user_id, "session revoked");
            return AuthState::Anonymous;
        }
        AuthState::Authenticated(user_id)
    }

    /// Gate a protected operation on an authenticated session.
    pub fn require_authenticated(&self, session: &dyn SessionHandle) -> Result<UserId, AuthError> {
        self.state(session)
            .user_id()
            .ok_or(AuthError::Unauthorized)
    }

    /// Verify credentials and bind the user to a fresh session.
    ///
    /// An existing session is revoked first, so a failed attempt from an
    /// authenticated session leaves it anonymous.
    pub async fn login(
        &self,
        session: &dyn SessionHandle,
        credentials: &LoginCredentials,
    ) -> Result<UserId, AuthError> {
        self.revoke_existing(session);

        let user_id = self.login.authenticate(credentials).await?;

        let payload = SessionPayload::authenticated(user_id, self.clock.utc());
        session.renew();
        session.store(&payload).map_err(|error| {
            warn!(%user_id, %error, "failed to persist session after login");
            AuthError::SessionPersist(error)
        })?;

        info!(%user_id, "login succeeded");
        Ok(user_id)
    }

    /// End the session. Succeeds whether or not one existed.
    pub fn logout(&self, session: &dyn SessionHandle) {
        if let Some(user_id) = self.revoke_existing(session) {
            info!(%user_id, "logged out");
        }
        session.purge();
    }

    fn revoke_existing(&self, session: &dyn SessionHandle) -> Option<UserId> {
        let payload = session.load().ok().flatten()?;
        self.revocations
            .revoke(payload.session_id(), payload.expires_at());
        payload.user_id()
    }
}
