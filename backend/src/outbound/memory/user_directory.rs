//! Mutex-guarded user directory.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::{EncodedCredential, User, UserChanges, UserId, Username};

#[derive(Default)]
struct Records {
    next_id: i64,
    users: BTreeMap<UserId, User>,
}

impl Records {
    fn username_holder(&self, username: &Username) -> Option<UserId> {
        self.users
            .values()
            .find(|user| user.username() == username)
            .map(User::id)
    }
}

/// User directory held in memory.
///
/// Every operation runs under one lock, so the uniqueness check and the
/// insert in `create` cannot interleave with another writer.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    records: Mutex<Records>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, UserDirectoryError> {
        Ok(self.lock()?.users.len())
    }

    pub fn is_empty(&self) -> Result<bool, UserDirectoryError> {
        Ok(self.lock()?.users.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Records>, UserDirectoryError> {
        self.records
            .lock()
            .map_err(|_| UserDirectoryError::connection("user directory lock poisoned"))
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn exists(&self, username: &Username) -> Result<bool, UserDirectoryError> {
        Ok(self.lock()?.username_holder(username).is_some())
    }

    async fn create(
        &self,
        username: &Username,
        credential: &EncodedCredential,
    ) -> Result<UserId, UserDirectoryError> {
        let mut records = self.lock()?;
        if records.username_holder(username).is_some() {
            return Err(UserDirectoryError::username_taken(username.as_ref()));
        }
        records.next_id += 1;
        let id = UserId::new(records.next_id);
        records
            .users
            .insert(id, User::new(id, username.clone(), credential.clone()));
        Ok(id)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserDirectoryError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserDirectoryError> {
        let records = self.lock()?;
        Ok(records
            .username_holder(username)
            .and_then(|id| records.users.get(&id).cloned()))
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> Result<(), UserDirectoryError> {
        if changes.is_empty() {
            return Err(UserDirectoryError::no_fields_provided());
        }
        let mut records = self.lock()?;
        if let Some(username) = &changes.username {
            if records
                .username_holder(username)
                .is_some_and(|holder| holder != id)
            {
                return Err(UserDirectoryError::username_taken(username.as_ref()));
            }
        }
        let current = records
            .users
            .get_mut(&id)
            .ok_or_else(|| UserDirectoryError::not_found(id.as_i64()))?;
        let username = changes
            .username
            .clone()
            .unwrap_or_else(|| current.username().clone());
        let credential = changes
            .credential
            .clone()
            .unwrap_or_else(|| current.credential().clone());
        *current = User::new(id, username, credential);
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserDirectoryError> {
        self.lock()?
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| UserDirectoryError::not_found(id.as_i64()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    fn name(raw: &str) -> Username {
        Username::parse(raw).expect("valid username")
    }

    fn credential(tag: &str) -> EncodedCredential {
        EncodedCredential::new(format!("{tag}${tag}"))
    }

    #[fixture]
    fn directory() -> InMemoryUserDirectory {
        InMemoryUserDirectory::new()
    }

    #[rstest]
    #[tokio::test]
    async fn create_assigns_increasing_ids(directory: InMemoryUserDirectory) {
        let first = directory
            .create(&name("alice"), &credential("a"))
            .await
            .expect("create alice");
        let second = directory
            .create(&name("bobby"), &credential("b"))
            .await
            .expect("create bobby");
        assert!(second > first);
        assert!(directory.exists(&name("alice")).await.expect("exists"));
        assert_eq!(directory.len().expect("len"), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_duplicate_usernames(directory: InMemoryUserDirectory) {
        directory
            .create(&name("alice"), &credential("a"))
            .await
            .expect("first create");
        let err = directory
            .create(&name("alice"), &credential("b"))
            .await
            .expect_err("duplicate");
        assert_eq!(err, UserDirectoryError::username_taken("alice"));
    }

    #[tokio::test]
    async fn concurrent_creates_admit_exactly_one() {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let attempts = (0..8).map(|i| {
            let directory = Arc::clone(&directory);
            tokio::spawn(async move {
                directory
                    .create(&name("racer"), &credential(&i.to_string()))
                    .await
            })
        });
        let mut created = 0;
        for attempt in attempts.collect::<Vec<_>>() {
            if attempt.await.expect("join").is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(directory.len().expect("len"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn update_keeps_unchanged_fields(directory: InMemoryUserDirectory) {
        let id = directory
            .create(&name("alice"), &credential("a"))
            .await
            .expect("create");
        let changes = UserChanges {
            username: Some(name("alice2")),
            credential: None,
        };
        directory.update(id, &changes).await.expect("update");

        let user = directory
            .find_by_id(id)
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(user.username(), &name("alice2"));
        assert_eq!(user.credential(), &credential("a"));
        assert!(directory
            .find_by_username(&name("alice"))
            .await
            .expect("lookup")
            .is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn update_rejects_taken_username(directory: InMemoryUserDirectory) {
        let alice = directory
            .create(&name("alice"), &credential("a"))
            .await
            .expect("create alice");
        directory
            .create(&name("bobby"), &credential("b"))
            .await
            .expect("create bobby");
        let changes = UserChanges {
            username: Some(name("bobby")),
            credential: None,
        };
        let err = directory.update(alice, &changes).await.expect_err("taken");
        assert_eq!(err, UserDirectoryError::username_taken("bobby"));
    }

    #[rstest]
    #[tokio::test]
    async fn renaming_to_own_username_is_allowed(directory: InMemoryUserDirectory) {
        let id = directory
            .create(&name("alice"), &credential("a"))
            .await
            .expect("create");
        let changes = UserChanges {
            username: Some(name("alice")),
            credential: Some(credential("z")),
        };
        directory.update(id, &changes).await.expect("update");
    }

    #[rstest]
    #[tokio::test]
    async fn update_and_delete_report_missing_records(directory: InMemoryUserDirectory) {
        let changes = UserChanges {
            username: None,
            credential: Some(credential("a")),
        };
        assert_eq!(
            directory.update(UserId::new(9), &changes).await,
            Err(UserDirectoryError::not_found(9))
        );
        assert_eq!(
            directory.delete(UserId::new(9)).await,
            Err(UserDirectoryError::not_found(9))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn empty_update_is_rejected(directory: InMemoryUserDirectory) {
        assert_eq!(
            directory.update(UserId::new(1), &UserChanges::default()).await,
            Err(UserDirectoryError::no_fields_provided())
        );
    }

    #[rstest]
    #[tokio::test]
    async fn delete_removes_the_record(directory: InMemoryUserDirectory) {
        let id = directory
            .create(&name("alice"), &credential("a"))
            .await
            .expect("create");
        directory.delete(id).await.expect("delete");
        assert!(directory.is_empty().expect("is_empty"));
        assert!(!directory.exists(&name("alice")).await.expect("exists"));
    }
}
