//! Account management pass-throughs into the user directory.
//!
//! Each operation validates its inputs before touching the directory or the
//! hasher. Directory failures keep their meaning here; only login erases them.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::credential_policy::validate_password;
use super::deadline;
use super::hashing::CredentialHasher;
use super::ports::UserDirectory;
use super::{AuthError, Password, UserChanges, UserId, UserProfile, Username};

/// Outcome of [`AccountService::ensure_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created(UserId),
    AlreadyPresent,
}

/// Registration, profile, credential change, and removal.
pub struct AccountService {
    directory: Arc<dyn UserDirectory>,
    hasher: CredentialHasher,
    directory_timeout: Duration,
}

impl AccountService {
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

    /// Create an account.
    ///
    /// The `exists` pre-check only saves a derivation; the directory's
    /// unique constraint decides concurrent races.
    pub async fn register(
        &self,
        username: &str,
        password: &Password,
    ) -> Result<UserProfile, AuthError> {
        let username = Username::parse(username)?;
        validate_password(password.expose())?;

        if deadline::within(
            self.directory_timeout,
            "exists",
            self.directory.exists(&username),
        )
        .await??
        {
            return Err(AuthError::UsernameTaken);
        }

        let credential = self.hasher.derive(password).await?;
        let id = deadline::within(
            self.directory_timeout,
            "create",
            self.directory.create(&username, &credential),
        )
        .await??;

        info!(user_id = %id, %username, "user registered");
        Ok(UserProfile { id, username })
    }

    /// Change the username, the password, or both.
    ///
    /// Empty strings count as absent. A new password always gets a fresh
    /// salt.
    pub async fn update(
        &self,
        id: UserId,
        username: Option<&str>,
        password: Option<&Password>,
    ) -> Result<(), AuthError> {
        let username = username.filter(|name| !name.is_empty());
        let password = password.filter(|secret| !secret.is_empty());
        if username.is_none() && password.is_none() {
            return Err(AuthError::NoFieldsProvided);
        }

        let username = username.map(Username::parse).transpose()?;
        if let Some(secret) = password {
            validate_password(secret.expose())?;
        }

        let credential = match password {
            Some(secret) => Some(self.hasher.derive(secret).await?),
            None => None,
        };
        let changes = UserChanges {
            username,
            credential,
        };

        deadline::within(
            self.directory_timeout,
            "update",
            self.directory.update(id, &changes),
        )
        .await??;

        info!(
            user_id = %id,
            username_changed = changes.username.is_some(),
            password_changed = changes.credential.is_some(),
            "user updated"
        );
        Ok(())
    }

    pub async fn delete(&self, id: UserId) -> Result<(), AuthError> {
        deadline::within(self.directory_timeout, "delete", self.directory.delete(id)).await??;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    pub async fn find(&self, id: UserId) -> Result<UserProfile, AuthError> {
        let user = deadline::within(
            self.directory_timeout,
            "find_by_id",
            self.directory.find_by_id(id),
        )
        .await??
        .ok_or(AuthError::UserNotFound)?;
        Ok(UserProfile::from(&user))
    }

    /// Create the account unless the username is already registered.
    pub async fn ensure_user(
        &self,
        username: &str,
        password: &Password,
    ) -> Result<EnsureOutcome, AuthError> {
        match self.register(username, password).await {
            Ok(profile) => Ok(EnsureOutcome::Created(profile.id)),
            Err(AuthError::UsernameTaken) => Ok(EnsureOutcome::AlreadyPresent),
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::CredentialFormatError;
    use crate::domain::ports::{MockUserDirectory, UserDirectoryError};
    use crate::test_support::low_cost_hasher;
    use rstest::rstest;

    fn service(directory: MockUserDirectory) -> AccountService {
        AccountService::new(Arc::new(directory), low_cost_hasher(), Duration::from_secs(1))
    }

    fn password(raw: &str) -> Password {
        Password::new(raw)
    }

    #[rstest]
    #[tokio::test]
    async fn register_derives_and_creates() {
        let mut directory = MockUserDirectory::new();
        directory.expect_exists().returning(|_| Ok(false));
        directory
            .expect_create()
            .withf(|username, credential| {
                username.as_ref() == "alice" && credential.as_str().contains('$')
            })
            .times(1)
            .returning(|_, _| Ok(UserId::new(11)));

        let profile = service(directory)
            .register("alice", &password("ValidP@ssw0rd"))
            .await
            .expect("register");
        assert_eq!(profile.id, UserId::new(11));
        assert_eq!(profile.username.as_ref(), "alice");
    }

    #[rstest]
    #[case("al", "ValidP@ssw0rd", CredentialFormatError::UsernameLength)]
    #[case("alice", "password", CredentialFormatError::PasswordMissingUppercase)]
    #[tokio::test]
    async fn register_validates_before_touching_the_directory(
        #[case] username: &str,
        #[case] secret: &str,
        #[case] expected: CredentialFormatError,
    ) {
        let mut directory = MockUserDirectory::new();
        directory.expect_exists().never();
        directory.expect_create().never();
        let err = service(directory)
            .register(username, &password(secret))
            .await
            .expect_err("invalid input");
        assert_eq!(err, AuthError::Format(expected));
    }

    #[rstest]
    #[tokio::test]
    async fn register_short_circuits_on_existing_username() {
        let mut directory = MockUserDirectory::new();
        directory.expect_exists().returning(|_| Ok(true));
        directory.expect_create().never();
        let err = service(directory)
            .register("alice", &password("ValidP@ssw0rd"))
            .await
            .expect_err("taken");
        assert_eq!(err, AuthError::UsernameTaken);
    }

    #[rstest]
    #[tokio::test]
    async fn register_reports_races_lost_at_create() {
        let mut directory = MockUserDirectory::new();
        directory.expect_exists().returning(|_| Ok(false));
        directory
            .expect_create()
            .returning(|username, _| Err(UserDirectoryError::username_taken(username.as_ref())));
        let err = service(directory)
            .register("alice", &password("ValidP@ssw0rd"))
            .await
            .expect_err("taken");
        assert_eq!(err, AuthError::UsernameTaken);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some(""), Some(""))]
    #[tokio::test]
    async fn update_requires_a_field(#[case] username: Option<&str>, #[case] secret: Option<&str>) {
        let mut directory = MockUserDirectory::new();
        directory.expect_update().never();
        let secret = secret.map(password);
        let err = service(directory)
            .update(UserId::new(1), username, secret.as_ref())
            .await
            .expect_err("no fields");
        assert_eq!(err, AuthError::NoFieldsProvided);
    }

    #[rstest]
    #[tokio::test]
    async fn update_rehashes_new_passwords() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_update()
            .withf(|id, changes| {
                *id == UserId::new(3) && changes.username.is_none() && changes.credential.is_some()
            })
            .times(1)
            .returning(|_, _| Ok(()));
        service(directory)
            .update(UserId::new(3), None, Some(&password("N3w!Passw0rd")))
            .await
            .expect("update");
    }

    #[rstest]
    #[tokio::test]
    async fn update_validates_the_new_password() {
        let mut directory = MockUserDirectory::new();
        directory.expect_update().never();
        let err = service(directory)
            .update(UserId::new(3), Some("alice"), Some(&password("Passw0rd")))
            .await
            .expect_err("weak password");
        assert_eq!(err, AuthError::Format(CredentialFormatError::PasswordMissingSpecial));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_users_stay_distinguishable() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_delete()
            .returning(|id| Err(UserDirectoryError::not_found(id.as_i64())));
        directory.expect_find_by_id().returning(|_| Ok(None));
        let service = service(directory);

        assert_eq!(service.delete(UserId::new(5)).await, Err(AuthError::UserNotFound));
        assert_eq!(service.find(UserId::new(5)).await, Err(AuthError::UserNotFound));
    }

    #[rstest]
    #[tokio::test]
    async fn ensure_user_tolerates_existing_accounts() {
        let mut directory = MockUserDirectory::new();
        directory.expect_exists().returning(|_| Ok(true));
        let outcome = service(directory)
            .ensure_user("test", &password("Test@1234"))
            .await
            .expect("ensure");
        assert_eq!(outcome, EnsureOutcome::AlreadyPresent);
    }
}
