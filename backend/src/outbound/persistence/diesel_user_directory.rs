//! PostgreSQL-backed [`UserDirectory`] using Diesel.
//!
//! Username uniqueness is enforced by the `users_username_key` index, so a
//! racing `create` or rename surfaces as `UsernameTaken` no matter what an
//! earlier `exists` call returned.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::{EncodedCredential, User, UserChanges, UserId, Username};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel implementation of the user directory port.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserDirectoryError {
    UserDirectoryError::connection(error.message())
}

/// Map Diesel failures. `conflicting` names the username a unique
/// violation would be about, when the statement writes one.
fn map_diesel_error(error: DieselError, conflicting: Option<&Username>) -> UserDirectoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => match conflicting {
            Some(username) => UserDirectoryError::username_taken(username.as_ref()),
            None => UserDirectoryError::query("unique constraint violated"),
        },
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserDirectoryError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => UserDirectoryError::query("database query error"),
        _ => UserDirectoryError::query("database error"),
    }
}

fn row_to_user(row: UserRow) -> User {
    User::new(
        UserId::new(row.id),
        Username::from_trusted(row.username),
        EncodedCredential::new(row.credential),
    )
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn exists(&self, username: &Username) -> Result<bool, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::username.eq(username.as_ref())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, None))
    }

    async fn create(
        &self,
        username: &Username,
        credential: &EncodedCredential,
    ) -> Result<UserId, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            username: username.as_ref(),
            credential: credential.as_str(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .returning(users::id)
            .get_result::<i64>(&mut conn)
            .await
            .map(UserId::new)
            .map_err(|err| map_diesel_error(err, Some(username)))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.as_i64())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;
        Ok(row.map(row_to_user))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;
        Ok(row.map(row_to_user))
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> Result<(), UserDirectoryError> {
        if changes.is_empty() {
            return Err(UserDirectoryError::no_fields_provided());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = UserChangeset {
            username: changes.username.as_ref().map(AsRef::as_ref),
            credential: changes.credential.as_ref().map(EncodedCredential::as_str),
            updated_at: Utc::now(),
        };
        let updated = diesel::update(users::table.find(id.as_i64()))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, changes.username.as_ref()))?;
        if updated == 0 {
            return Err(UserDirectoryError::not_found(id.as_i64()));
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(id.as_i64()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        if deleted == 0 {
            return Err(UserDirectoryError::not_found(id.as_i64()));
        }
        Ok(())
    }
}
