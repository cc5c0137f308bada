//! Failure taxonomy for authentication and account operations.

use std::time::Duration;

use serde_json::json;

use super::credential::CredentialCodecError;
use super::credential_policy::CredentialFormatError;
use super::ports::{SessionStoreError, UserDirectoryError};
use super::{Error, ErrorCode};

/// Errors returned by the authentication controller and account service.
///
/// Credential failures are deliberately coarse: callers cannot tell an
/// unknown username from a wrong password.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// A username or password failed the format policy.
    #[error(transparent)]
    Format(#[from] CredentialFormatError),
    #[error("invalid username or password")]
    InvalidCredentials,
    /// The request carries no valid authenticated session.
    #[error("Unauthorized")]
    Unauthorized,
    #[error("user with this username already exists")]
    UsernameTaken,
    #[error("at least one of username or password must be provided")]
    NoFieldsProvided,
    #[error("user not found")]
    UserNotFound,
    /// The session store rejected a write.
    #[error("session could not be saved: {0}")]
    SessionPersist(SessionStoreError),
    #[error("{dependency} timed out after {timeout:?}")]
    DependencyTimeout {
        dependency: &'static str,
        timeout: Duration,
    },
    #[error("{dependency} unavailable: {message}")]
    DependencyUnavailable {
        dependency: &'static str,
        message: String,
    },
    /// The directory failed in a way retrying will not fix.
    #[error("user directory failure: {0}")]
    Directory(UserDirectoryError),
    /// Secure randomness or key derivation failed.
    #[error("credential derivation failed: {0}")]
    Crypto(CredentialCodecError),
    /// The hashing worker could not run or panicked.
    #[error("credential hashing failed: {message}")]
    Hashing { message: String },
}

pub(crate) const USER_DIRECTORY: &str = "user directory";

impl AuthError {
    /// Whether the failure is transient infrastructure trouble.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SessionPersist(_) | Self::DependencyTimeout { .. } | Self::DependencyUnavailable { .. }
        )
    }

    pub(crate) fn directory_timeout(timeout: Duration) -> Self {
        Self::DependencyTimeout {
            dependency: USER_DIRECTORY,
            timeout,
        }
    }
}

impl From<UserDirectoryError> for AuthError {
    fn from(value: UserDirectoryError) -> Self {
        match value {
            UserDirectoryError::Connection { message } => Self::DependencyUnavailable {
                dependency: USER_DIRECTORY,
                message,
            },
            UserDirectoryError::UsernameTaken { .. } => Self::UsernameTaken,
            UserDirectoryError::NotFound { .. } => Self::UserNotFound,
            UserDirectoryError::NoFieldsProvided => Self::NoFieldsProvided,
            other @ UserDirectoryError::Query { .. } => Self::Directory(other),
        }
    }
}

impl From<CredentialCodecError> for AuthError {
    fn from(value: CredentialCodecError) -> Self {
        Self::Crypto(value)
    }
}

impl From<AuthError> for Error {
    fn from(value: AuthError) -> Self {
        match &value {
            AuthError::Format(format) => Error::invalid_request(format.to_string()).with_details(
                json!({ "field": format.field().as_str(), "code": format.code() }),
            ),
            AuthError::InvalidCredentials | AuthError::Unauthorized => {
                Error::unauthorized(value.to_string())
            }
            AuthError::UsernameTaken => Error::conflict(value.to_string()),
            AuthError::NoFieldsProvided => Error::invalid_request(value.to_string()),
            AuthError::UserNotFound => Error::not_found(value.to_string()),
            AuthError::SessionPersist(_)
            | AuthError::DependencyTimeout { .. }
            | AuthError::DependencyUnavailable { .. } => {
                Error::new(ErrorCode::ServiceUnavailable, value.to_string())
                    .with_details(json!({ "retryable": true }))
            }
            AuthError::Directory(_) | AuthError::Crypto(_) | AuthError::Hashing { .. } => {
                Error::internal(value.to_string())
            }
        }
    }
}
