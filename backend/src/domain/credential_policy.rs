//! Username and password format policy.
//!
//! Both checks are pure and run before any hashing or directory access.

use std::sync::OnceLock;

use regex::Regex;

/// Minimum username length in characters.
pub const USERNAME_MIN: usize = 4;
/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 24;
/// Minimum password length in bytes.
pub const PASSWORD_MIN: usize = 8;
/// Characters that satisfy the special-character requirement.
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Credential field a format error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    Username,
    Password,
}

impl CredentialField {
    /// Field name as sent by clients.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
        }
    }
}

/// Reason a username or password was rejected.
///
/// The `Display` output is the caller-visible message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialFormatError {
    #[error("username must be between 4 and 24 characters long")]
    UsernameLength,
    #[error(
        "username must start with a letter and can only contain lowercase letters, digits, and underscores"
    )]
    UsernameCharacters,
    #[error("password must be at least 8 characters long")]
    PasswordTooShort,
    #[error("password must contain at least one uppercase letter")]
    PasswordMissingUppercase,
    #[error("password must contain at least one lowercase letter")]
    PasswordMissingLowercase,
    #[error("password must contain at least one digit")]
    PasswordMissingDigit,
    #[error("password must contain at least one special character")]
    PasswordMissingSpecial,
}

impl CredentialFormatError {
    /// Which field failed.
    pub fn field(&self) -> CredentialField {
        match self {
            Self::UsernameLength | Self::UsernameCharacters => CredentialField::Username,
            _ => CredentialField::Password,
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UsernameLength => "username_length",
            Self::UsernameCharacters => "username_characters",
            Self::PasswordTooShort => "password_too_short",
            Self::PasswordMissingUppercase => "password_missing_uppercase",
            Self::PasswordMissingLowercase => "password_missing_lowercase",
            Self::PasswordMissingDigit => "password_missing_digit",
            Self::PasswordMissingSpecial => "password_missing_special",
        }
    }
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is checked separately.
        Regex::new("^[a-z][a-z0-9_]*$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Check a username against the format policy.
///
/// # Examples
/// ```
/// use authgate::domain::{CredentialFormatError, validate_username};
///
/// assert!(validate_username("user_name_").is_ok());
/// assert_eq!(
///     validate_username("1user"),
///     Err(CredentialFormatError::UsernameCharacters)
/// );
/// ```
pub fn validate_username(username: &str) -> Result<(), CredentialFormatError> {
    let length = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
        return Err(CredentialFormatError::UsernameLength);
    }
    if !username_regex().is_match(username) {
        return Err(CredentialFormatError::UsernameCharacters);
    }
    Ok(())
}

/// Check a password against the strength policy.
///
/// Character classes are checked in the order uppercase, lowercase, digit,
/// special; the first missing class is reported.
pub fn validate_password(password: &str) -> Result<(), CredentialFormatError> {
    if password.len() < PASSWORD_MIN {
        return Err(CredentialFormatError::PasswordTooShort);
    }

    let checks: [(fn(char) -> bool, CredentialFormatError); 4] = [
        (
            |c| c.is_ascii_uppercase(),
            CredentialFormatError::PasswordMissingUppercase,
        ),
        (
            |c| c.is_ascii_lowercase(),
            CredentialFormatError::PasswordMissingLowercase,
        ),
        (
            |c| c.is_ascii_digit(),
            CredentialFormatError::PasswordMissingDigit,
        ),
        (
            |c| PASSWORD_SPECIALS.contains(c),
            CredentialFormatError::PasswordMissingSpecial,
        ),
    ];

    for (matches, missing) in checks {
        if !password.chars().any(matches) {
            return Err(missing);
        }
    }
    Ok(())
}
