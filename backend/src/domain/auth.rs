//! Login payload primitives.
//!
//! Inbound adapters build these before calling the authentication service so
//! blank input is rejected without touching the directory.

use std::fmt;

use zeroize::Zeroizing;

/// Plaintext password held only for the duration of a request.
///
/// The buffer is zeroed on drop and `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Rejection raised when a login payload field is blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Login credentials with both fields present.
///
/// The username is kept exactly as given; format checks happen in the
/// authentication service.
///
/// # Examples
/// ```
/// use authgate::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("alice", "P@ssw0rd").unwrap();
/// assert_eq!(creds.username(), "alice");
/// assert_eq!(creds.password().expose(), "P@ssw0rd");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Password,
}

impl LoginCredentials {
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        if username.trim().is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: username.to_owned(),
            password: Password::new(password),
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}
