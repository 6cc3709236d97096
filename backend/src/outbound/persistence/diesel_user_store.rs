//! PostgreSQL-backed [`UserStore`] implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::{PostId, User, UserId, Username};

use super::models::{UserRow, user_from_row};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserStore`] port.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserStoreError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserStoreError::connection("database connection error")
        }
        _ => UserStoreError::query("database error"),
    }
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(user_from_row).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(user_from_row).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserStoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let wanted: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(wanted))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(user_from_row).collect()
    }

    async fn save_bookmarks(
        &self,
        id: &UserId,
        bookmarks: &[PostId],
    ) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let stored: Vec<Uuid> = bookmarks.iter().map(|id| *id.as_uuid()).collect();
        let updated = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::bookmarks.eq(stored))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(UserStoreError::query("user not found for bookmark update"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the error mapping; query behaviour is covered
    //! by the in-memory store used in service tests.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, UserStoreError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_errors_map_to_query_errors() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, UserStoreError::Query { .. }));
    }
}
