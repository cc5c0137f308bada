//! Port for the user directory: persisted `{id, username, credential}`
//! records with a unique username.

use async_trait::async_trait;

use crate::domain::{EncodedCredential, User, UserChanges, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UserDirectoryError {
        /// The backing store could not be reached.
        Connection { message: String } => "user directory connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } => "user directory query failed: {message}",
        /// The unique username constraint rejected a write.
        UsernameTaken { username: String } => "username {username} is already taken",
        /// No record exists for the given identifier.
        NotFound { id: i64 } => "user {id} not found",
        /// An update carried no fields.
        NoFieldsProvided => "at least one of username or password must be provided",
    }
}

/// Directory of user records.
///
/// Implementations must enforce username uniqueness atomically: `create`
/// returns [`UserDirectoryError::UsernameTaken`] even when a preceding
/// `exists` call returned `false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Whether a record with this username exists.
    async fn exists(&self, username: &Username) -> Result<bool, UserDirectoryError>;

    /// Insert a record and return its new identifier.
    async fn create(
        &self,
        username: &Username,
        credential: &EncodedCredential,
    ) -> Result<UserId, UserDirectoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserDirectoryError>;

    async fn find_by_username(&self, username: &Username)
    -> Result<Option<User>, UserDirectoryError>;

    /// Apply `changes` to an existing record.
    ///
    /// Fails with `NoFieldsProvided` when `changes` is empty and `NotFound`
    /// when no record has `id`.
    async fn update(&self, id: UserId, changes: &UserChanges) -> Result<(), UserDirectoryError>;

    /// Remove a record. Fails with `NotFound` when no record has `id`.
    async fn delete(&self, id: UserId) -> Result<(), UserDirectoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn messages_name_the_conflicting_username() {
        let err = UserDirectoryError::username_taken("alice");
        assert_eq!(err.to_string(), "username alice is already taken");
    }

    #[rstest]
    fn empty_update_message_is_stable() {
        assert_eq!(
            UserDirectoryError::no_fields_provided().to_string(),
            "at least one of username or password must be provided"
        );
    }
}
