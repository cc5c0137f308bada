//! Password credential derivation and verification.
//!
//! Stored credentials are Argon2id keys encoded as
//! `base64(salt)$base64(key)` using the unpadded standard alphabet. The cost
//! parameters are fixed for production so every stored credential costs the
//! same to attack.

use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Decoded salt length in bytes.
pub const SALT_LEN: usize = 16;
/// Decoded derived-key length in bytes.
pub const KEY_LEN: usize = 32;

const SEPARATOR: char = '$';

/// Failures raised while deriving a credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialCodecError {
    /// The operating system random source could not produce a salt.
    #[error("secure random source unavailable: {message}")]
    Randomness { message: String },
    /// The key derivation function rejected its inputs.
    #[error("key derivation failed: {message}")]
    Derivation { message: String },
}

/// Opaque stored credential.
///
/// `Debug` never prints the encoded value.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedCredential(String);

impl EncodedCredential {
    /// Wrap a stored credential string without validating it.
    ///
    /// Malformed values are accepted here and rejected by
    /// [`CredentialCodec::verify`].
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the encoded text for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Split and decode the stored value.
    ///
    /// # Examples
    /// ```
    /// use authgate::domain::{EncodedCredential, ParsedCredential};
    ///
    /// let parsed = EncodedCredential::new("a$b$c").parse();
    /// assert!(matches!(parsed, ParsedCredential::Malformed));
    /// ```
    pub fn parse(&self) -> ParsedCredential {
        let mut parts = self.0.split(SEPARATOR);
        let (Some(salt), Some(key), None) = (parts.next(), parts.next(), parts.next()) else {
            return ParsedCredential::Malformed;
        };

        match (decode_exact::<SALT_LEN>(salt), decode_exact::<KEY_LEN>(key)) {
            (Some(salt), Some(key)) => ParsedCredential::Valid { salt, key },
            _ => ParsedCredential::Malformed,
        }
    }

    /// Credential of the correct shape that no password is expected to match.
    ///
    /// Verified against when a username is unknown so both outcomes cost one
    /// derivation.
    pub(crate) fn decoy() -> Self {
        Self::from_parts(&[0_u8; SALT_LEN], &[0_u8; KEY_LEN])
    }

    fn from_parts(salt: &[u8], key: &[u8]) -> Self {
        Self(format!(
            "{}{SEPARATOR}{}",
            STANDARD_NO_PAD.encode(salt),
            STANDARD_NO_PAD.encode(key)
        ))
    }
}

impl fmt::Debug for EncodedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncodedCredential(<redacted>)")
    }
}

impl From<EncodedCredential> for String {
    fn from(value: EncodedCredential) -> Self {
        value.0
    }
}

fn decode_exact<const N: usize>(segment: &str) -> Option<[u8; N]> {
    let bytes = STANDARD_NO_PAD.decode(segment).ok()?;
    bytes.try_into().ok()
}

/// Structured view of a stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCredential {
    /// Wrong separator count, undecodable base64, or wrong decoded lengths.
    Malformed,
    /// Salt and key of the expected sizes.
    Valid {
        salt: [u8; SALT_LEN],
        key: [u8; KEY_LEN],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CostParams {
    memory_kib: u32,
    iterations: u32,
    lanes: u32,
}

impl CostParams {
    // 64 MiB, one pass, four lanes.
    const PRODUCTION: Self = Self {
        memory_kib: 64 * 1024,
        iterations: 1,
        lanes: 4,
    };
}

/// Argon2id credential codec.
///
/// # Examples
/// ```no_run
/// use authgate::domain::CredentialCodec;
///
/// let codec = CredentialCodec::default();
/// let stored = codec.derive("P@ssw0rd").expect("random source available");
/// assert!(codec.verify("P@ssw0rd", &stored));
/// assert!(!codec.verify("p@ssw0rd", &stored));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialCodec {
    cost: CostParams,
}

impl Default for CredentialCodec {
    fn default() -> Self {
        Self {
            cost: CostParams::PRODUCTION,
        }
    }
}

impl CredentialCodec {
    /// Codec using the fixed production parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec with the smallest Argon2id cost, for fast tests.
    ///
    /// Credentials derived here do not verify under the production codec.
    #[cfg(any(test, feature = "test-support"))]
    pub fn low_cost() -> Self {
        Self {
            cost: CostParams {
                memory_kib: 8,
                iterations: 1,
                lanes: 1,
            },
        }
    }

    /// Derive a storable credential using a fresh random salt.
    pub fn derive(&self, password: &str) -> Result<EncodedCredential, CredentialCodecError> {
        let mut salt = [0_u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|err| CredentialCodecError::Randomness {
                message: err.to_string(),
            })?;

        let key = self.derive_key(password.as_bytes(), &salt)?;
        Ok(EncodedCredential::from_parts(&salt, key.as_slice()))
    }

    /// Check `password` against a stored credential.
    ///
    /// Malformed records and derivation failures deny rather than error.
    pub fn verify(&self, password: &str, encoded: &EncodedCredential) -> bool {
        let ParsedCredential::Valid { salt, key } = encoded.parse() else {
            return false;
        };

        match self.derive_key(password.as_bytes(), &salt) {
            Ok(derived) => derived.as_slice().ct_eq(key.as_slice()).into(),
            Err(_) => false,
        }
    }

    fn derive_key(
        &self,
        password: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<[u8; KEY_LEN]>, CredentialCodecError> {
        let derivation = |err: argon2::Error| CredentialCodecError::Derivation {
            message: err.to_string(),
        };
        let params = Params::new(
            self.cost.memory_kib,
            self.cost.iterations,
            self.cost.lanes,
            Some(KEY_LEN),
        )
        .map_err(derivation)?;

        let mut key = Zeroizing::new([0_u8; KEY_LEN]);
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password_into(password, salt, key.as_mut_slice())
            .map_err(derivation)?;
        Ok(key)
    }
}
