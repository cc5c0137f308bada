//! Framework-free authentication core.
//!
//! Purpose: credential derivation and verification, credential format
//! policy, the session-bound authentication state machine, and account
//! pass-throughs into the user directory. Adapters live in `inbound` and
//! `outbound` and talk to this module through the traits in [`ports`].
//!
//! Public surface:
//! - CredentialCodec / EncodedCredential — Argon2id credential encoding.
//! - validate_username / validate_password — format policy.
//! - AuthenticationController — login, logout, and gating.
//! - AccountService — registration, update, deletion, lookup.
//! - Error / ErrorCode — transport-agnostic error payload.

pub mod accounts;
pub mod auth;
mod auth_error;
pub mod authentication;
pub mod credential;
pub mod credential_policy;
mod deadline;
pub mod error;
pub mod hashing;
pub mod ports;
pub mod session;
pub mod trace_id;
pub mod user;

pub use self::accounts::{AccountService, EnsureOutcome};
pub use self::auth::{LoginCredentials, LoginValidationError, Password};
pub use self::auth_error::AuthError;
pub use self::authentication::{AuthenticationController, CredentialAuthenticator};
pub use self::credential::{
    CredentialCodec, CredentialCodecError, EncodedCredential, KEY_LEN, ParsedCredential, SALT_LEN,
};
pub use self::credential_policy::{
    CredentialField, CredentialFormatError, validate_password, validate_username,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::hashing::CredentialHasher;
pub use self::session::{AuthState, SESSION_PAYLOAD_KEY, SESSION_TTL, SessionPayload};
pub use self::trace_id::TraceId;
pub use self::user::{User, UserChanges, UserId, UserProfile, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use authgate::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
