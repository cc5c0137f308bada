//! User identity and credential record.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::credential::EncodedCredential;
use super::credential_policy::{CredentialFormatError, validate_username};

/// Directory-assigned user identifier. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = i64, example = 42)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier for storage.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Username that satisfies the format policy.
///
/// # Examples
/// ```
/// use authgate::domain::Username;
///
/// let name = Username::parse("alice").expect("valid username");
/// assert_eq!(name.as_ref(), "alice");
/// assert!(Username::parse("Alice").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "alice")]
pub struct Username(String);

impl Username {
    /// Validate and wrap a username.
    pub fn parse(raw: impl Into<String>) -> Result<Self, CredentialFormatError> {
        let raw = raw.into();
        validate_username(&raw)?;
        Ok(Self(raw))
    }

    /// Wrap a username read back from storage without revalidating it.
    pub(crate) fn from_trusted(raw: String) -> Self {
        Self(raw)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = CredentialFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Stored user record.
///
/// ## Invariants
/// - `credential` is only ever produced by the credential codec and is never
///   serialised or logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    credential: EncodedCredential,
}

impl User {
    pub fn new(id: UserId, username: Username, credential: EncodedCredential) -> Self {
        Self {
            id,
            username,
            credential,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn credential(&self) -> &EncodedCredential {
        &self.credential
    }
}

/// Fields to change on an existing user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<Username>,
    pub credential: Option<EncodedCredential>,
}

impl UserChanges {
    /// `true` when neither field is set.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.credential.is_none()
    }
}

/// Public view of a user returned by account endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: Username,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            username: user.username().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn user_id_serialises_as_a_number() {
        let value = serde_json::to_value(UserId::new(7)).expect("serialise id");
        assert_eq!(value, json!(7));
    }

    #[rstest]
    #[case(json!("alice"), true)]
    #[case(json!("Alice"), false)]
    #[case(json!("al"), false)]
    fn username_deserialisation_validates(#[case] raw: serde_json::Value, #[case] ok: bool) {
        assert_eq!(serde_json::from_value::<Username>(raw).is_ok(), ok);
    }

    #[rstest]
    fn changes_report_emptiness() {
        assert!(UserChanges::default().is_empty());
        let changes = UserChanges {
            username: Some(Username::parse("alice").expect("valid")),
            credential: None,
        };
        assert!(!changes.is_empty());
    }

    #[rstest]
    fn profile_omits_the_credential() {
        let user = User::new(
            UserId::new(3),
            Username::parse("alice").expect("valid"),
            EncodedCredential::new("c2FsdA$a2V5"),
        );
        let value = serde_json::to_value(UserProfile::from(&user)).expect("serialise");
        assert_eq!(value, json!({ "id": 3, "username": "alice" }));
    }
}
