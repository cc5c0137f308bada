//! Diesel user directory against a real PostgreSQL database.
//!
//! Skipped unless `AUTH_TEST_DATABASE_URL` points at a disposable database.

use std::sync::Arc;

use authgate::domain::ports::{UserDirectory, UserDirectoryError};
use authgate::domain::{EncodedCredential, UserChanges, UserId, Username};
use authgate::outbound::persistence::{
    DbPool, DieselUserDirectory, PoolConfig, run_pending_migrations,
};
use uuid::Uuid;

const DATABASE_URL_ENV: &str = "AUTH_TEST_DATABASE_URL";

async fn directory() -> Option<DieselUserDirectory> {
    let Ok(url) = std::env::var(DATABASE_URL_ENV) else {
        eprintln!("{DATABASE_URL_ENV} not set; skipping");
        return None;
    };
    run_pending_migrations(&url).await.expect("apply migrations");
    let pool = DbPool::new(PoolConfig::new(url).with_min_idle(None))
        .await
        .expect("build pool");
    Some(DieselUserDirectory::new(pool))
}

fn unique_username() -> Username {
    let suffix = Uuid::new_v4().simple().to_string();
    Username::parse(format!("u{}", &suffix[..12])).expect("valid username")
}

fn credential() -> EncodedCredential {
    EncodedCredential::new("AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA")
}

#[tokio::test]
async fn create_lookup_update_delete() {
    let Some(directory) = directory().await else {
        return;
    };
    let username = unique_username();

    let id = directory
        .create(&username, &credential())
        .await
        .expect("create");
    assert!(directory.exists(&username).await.expect("exists"));
    let found = directory
        .find_by_username(&username)
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(found.id(), id);
    assert_eq!(found.credential(), &credential());

    let renamed = unique_username();
    directory
        .update(
            id,
            &UserChanges {
                username: Some(renamed.clone()),
                credential: None,
            },
        )
        .await
        .expect("rename");
    let found = directory
        .find_by_id(id)
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(found.username(), &renamed);

    directory.delete(id).await.expect("delete");
    assert_eq!(
        directory.delete(id).await,
        Err(UserDirectoryError::not_found(id.as_i64()))
    );
    assert!(directory.find_by_id(id).await.expect("lookup").is_none());
}

#[tokio::test]
async fn concurrent_creates_hit_the_unique_index() {
    let Some(directory) = directory().await else {
        return;
    };
    let directory = Arc::new(directory);
    let username = unique_username();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let directory = Arc::clone(&directory);
            let username = username.clone();
            tokio::spawn(async move { directory.create(&username, &credential()).await })
        })
        .collect();

    let mut created = Vec::new();
    for handle in handles {
        match handle.await.expect("create task") {
            Ok(id) => created.push(id),
            Err(UserDirectoryError::UsernameTaken { .. }) => {}
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }
    assert_eq!(created.len(), 1);
    directory.delete(created[0]).await.expect("cleanup");
}

#[tokio::test]
async fn missing_records_report_not_found() {
    let Some(directory) = directory().await else {
        return;
    };
    let missing = UserId::new(i64::MAX);
    let changes = UserChanges {
        username: None,
        credential: Some(credential()),
    };
    assert_eq!(
        directory.update(missing, &changes).await,
        Err(UserDirectoryError::not_found(i64::MAX))
    );
}
