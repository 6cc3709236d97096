//! PostgreSQL-backed [`PostStore`] implementation using Diesel.
//!
//! Reference sets are UUID array columns, so every engagement write is one
//! row update. The like mirror is the exception: its two row updates (post
//! and user) run inside a single transaction so the mirror is never observed
//! half-updated.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{PostStore, PostStoreError};
use crate::domain::{Comment, Post, PostId, UserId};

use super::models::{PostRow, comments_to_value, post_from_row, post_to_new_row};
use super::pool::{DbPool, PoolError};
use super::schema::{posts, users};

/// Diesel-backed implementation of the [`PostStore`] port.
#[derive(Clone)]
pub struct DieselPostStore {
    pool: DbPool,
}

impl DieselPostStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PostStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PostStoreError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> PostStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PostStoreError::connection("database connection error")
        }
        _ => PostStoreError::query("database error"),
    }
}

fn rows_to_posts(rows: Vec<PostRow>) -> Result<Vec<Post>, PostStoreError> {
    rows.into_iter().map(post_from_row).collect()
}

#[async_trait]
impl PostStore for DieselPostStore {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<PostRow> = posts::table
            .filter(posts::id.eq(id.as_uuid()))
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(post_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Post>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PostRow> = posts::table
            .order(posts::created_at.desc())
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_posts(rows)
    }

    async fn list_by_author(&self, author: &UserId) -> Result<Vec<Post>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PostRow> = posts::table
            .filter(posts::author.eq(author.as_uuid()))
            .order(posts::created_at.desc())
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_posts(rows)
    }

    async fn list_by_authors(&self, authors: &[UserId]) -> Result<Vec<Post>, PostStoreError> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let wanted: Vec<Uuid> = authors.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<PostRow> = posts::table
            .filter(posts::author.eq_any(wanted))
            .order(posts::created_at.desc())
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_posts(rows)
    }

    async fn list_by_ids(&self, ids: &[PostId]) -> Result<Vec<Post>, PostStoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let wanted: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<PostRow> = posts::table
            .filter(posts::id.eq_any(wanted))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_posts(rows)
    }

    async fn list_reposted_by(&self, user: &UserId) -> Result<Vec<Post>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PostRow> = posts::table
            .filter(posts::reposts.contains(vec![*user.as_uuid()]))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_posts(rows)
    }

    async fn list_by_author_since(
        &self,
        author: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Post>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PostRow> = posts::table
            .filter(posts::author.eq(author.as_uuid()))
            .filter(posts::created_at.ge(since))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_posts(rows)
    }

    async fn insert(&self, post: &Post) -> Result<(), PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = post_to_new_row(post)?;
        diesel::insert_into(posts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &PostId) -> Result<(), PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(posts::table.filter(posts::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn save_like_mirror(
        &self,
        post: &PostId,
        likes: &[UserId],
        user: &UserId,
        liked_posts: &[PostId],
    ) -> Result<(), PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let post_id = *post.as_uuid();
        let user_id = *user.as_uuid();
        let like_set: Vec<Uuid> = likes.iter().map(|id| *id.as_uuid()).collect();
        let liked_set: Vec<Uuid> = liked_posts.iter().map(|id| *id.as_uuid()).collect();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::update(posts::table.filter(posts::id.eq(post_id)))
                    .set(posts::likes.eq(like_set))
                    .execute(conn)
                    .await?;
                diesel::update(users::table.filter(users::id.eq(user_id)))
                    .set(users::liked_posts.eq(liked_set))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn save_reposts(&self, id: &PostId, reposts: &[UserId]) -> Result<(), PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let repost_set: Vec<Uuid> = reposts.iter().map(|id| *id.as_uuid()).collect();
        diesel::update(posts::table.filter(posts::id.eq(id.as_uuid())))
            .set(posts::reposts.eq(repost_set))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn save_comments(
        &self,
        id: &PostId,
        comments: &[Comment],
    ) -> Result<(), PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let payload = comments_to_value(comments)?;
        diesel::update(posts::table.filter(posts::id.eq(id.as_uuid())))
            .set(posts::comments.eq(payload))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
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
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, PostStoreError::Connection { .. }));
    }

    #[rstest]
    fn diesel_errors_map_to_query_errors() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, PostStoreError::Query { .. }));
    }
}
