//! Engagement mutators: like, comment, repost, bookmark, create and delete.
//!
//! Every mutator is a single-entity read-modify-write with toggle-or-append
//! semantics. The reads are deliberately unsynchronized: two concurrent
//! toggles on the same (user, post) pair race and the last write wins. The
//! only atomicity this module asks of the store is that the two sides of the
//! like mirror (post.likes and user.likedPosts) commit together.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::warn;

use super::error::Error;
use super::notification::{Notification, NotificationKind};
use super::ports::{
    EngagementCommand, MediaStore, MediaStoreError, NotificationOutbox, PostStore,
    PostStoreError, UserStore, UserStoreError,
};
use super::post::{Comment, Post, PostDraft, PostId, PostValidationError};
use super::user::{User, UserId};

/// Result of a bookmark toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkOutcome {
    /// Whether the post was added (`true`) or removed (`false`).
    pub added: bool,
    /// The user's updated bookmark reference set.
    pub bookmarks: Vec<PostId>,
}

/// Mutation service implementing [`EngagementCommand`] over the store ports.
#[derive(Clone)]
pub struct EngagementService<P, U, N, M> {
    post_store: Arc<P>,
    user_store: Arc<U>,
    outbox: Arc<N>,
    media: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<P, U, N, M> EngagementService<P, U, N, M> {
    /// Create a new service over the given adapters.
    pub fn new(
        post_store: Arc<P>,
        user_store: Arc<U>,
        outbox: Arc<N>,
        media: Arc<M>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            post_store,
            user_store,
            outbox,
            media,
            clock,
        }
    }
}

fn map_post_store_error(error: PostStoreError) -> Error {
    Error::internal(format!("post store failure: {error}"))
}

fn map_user_store_error(error: UserStoreError) -> Error {
    Error::internal(format!("user store failure: {error}"))
}

fn map_media_error(error: MediaStoreError) -> Error {
    Error::internal(format!("media host failure: {error}"))
}

impl<P, U, N, M> EngagementService<P, U, N, M>
where
    P: PostStore,
    U: UserStore,
    N: NotificationOutbox,
    M: MediaStore,
{
    async fn require_post(&self, id: &PostId) -> Result<Post, Error> {
        self.post_store
            .find_by_id(id)
            .await
            .map_err(map_post_store_error)?
            .ok_or_else(|| Error::not_found("Post not found"))
    }

    async fn require_user(&self, id: &UserId) -> Result<User, Error> {
        self.user_store
            .find_by_id(id)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    /// Hand a notification to the outbox.
    ///
    /// The engagement write has already committed by the time this runs, so a
    /// failed emission is logged and swallowed; delivery is a downstream
    /// consumer's responsibility.
    async fn notify(&self, from: UserId, to: UserId, kind: NotificationKind) {
        let notification = Notification::new(from, to, kind, self.clock.utc());
        if let Err(error) = self.outbox.emit(&notification).await {
            warn!(%error, from = %from, to = %to, "notification emission failed");
        }
    }
}

#[async_trait]
impl<P, U, N, M> EngagementCommand for EngagementService<P, U, N, M>
where
    P: PostStore,
    U: UserStore,
    N: NotificationOutbox,
    M: MediaStore,
{
    async fn create_post(&self, author: &UserId, draft: PostDraft) -> Result<Post, Error> {
        self.require_user(author).await?;
        draft
            .validate()
            .map_err(|_| Error::invalid_request("Post must have text or image"))?;

        let image = match draft.image {
            Some(payload) => Some(
                self.media
                    .store(&payload)
                    .await
                    .map_err(map_media_error)?,
            ),
            None => None,
        };

        let post = Post::new(
            PostId::random(),
            *author,
            draft.text.filter(|text| !text.trim().is_empty()),
            image,
            self.clock.utc(),
        );
        self.post_store
            .insert(&post)
            .await
            .map_err(map_post_store_error)?;
        Ok(post)
    }

    async fn delete_post(&self, actor: &UserId, post: &PostId) -> Result<(), Error> {
        let stored = self.require_post(post).await?;
        if stored.author != *actor {
            return Err(Error::unauthorized(
                "You are not authorized to delete this post",
            ));
        }
        if let Some(image) = &stored.image {
            self.media.remove(image).await.map_err(map_media_error)?;
        }
        self.post_store
            .delete(post)
            .await
            .map_err(map_post_store_error)
    }

    async fn toggle_like(&self, actor: &UserId, post: &PostId) -> Result<Vec<UserId>, Error> {
        let stored = self.require_post(post).await?;
        let user = self.require_user(actor).await?;

        let mut likes = stored.likes;
        let mut liked_posts = user.liked_posts;

        if likes.contains(actor) {
            likes.retain(|id| id != actor);
            liked_posts.retain(|id| id != post);
            self.post_store
                .save_like_mirror(post, &likes, actor, &liked_posts)
                .await
                .map_err(map_post_store_error)?;
            return Ok(likes);
        }

        likes.push(*actor);
        liked_posts.push(*post);
        self.post_store
            .save_like_mirror(post, &likes, actor, &liked_posts)
            .await
            .map_err(map_post_store_error)?;

        if stored.author != *actor {
            self.notify(*actor, stored.author, NotificationKind::Like).await;
        }
        Ok(likes)
    }

    async fn add_comment(
        &self,
        actor: &UserId,
        post: &PostId,
        text: &str,
    ) -> Result<Post, Error> {
        let comment = Comment::new(*actor, text, self.clock.utc()).map_err(|err| match err {
            PostValidationError::EmptyComment => {
                Error::invalid_request("Text field is required")
            }
            other => Error::invalid_request(other.to_string()),
        })?;

        let mut stored = self.require_post(post).await?;
        stored.comments.push(comment);
        self.post_store
            .save_comments(post, &stored.comments)
            .await
            .map_err(map_post_store_error)?;
        Ok(stored)
    }

    async fn repost(&self, actor: &UserId, post: &PostId) -> Result<Post, Error> {
        let mut stored = self.require_post(post).await?;
        if stored.reposted_by(actor) {
            return Err(Error::conflict("You have already reposted this post"));
        }

        stored.reposts.push(*actor);
        self.post_store
            .save_reposts(post, &stored.reposts)
            .await
            .map_err(map_post_store_error)?;

        if stored.author != *actor {
            self.notify(*actor, stored.author, NotificationKind::Repost)
                .await;
        }
        Ok(stored)
    }

    async fn toggle_bookmark(
        &self,
        actor: &UserId,
        post: &PostId,
    ) -> Result<BookmarkOutcome, Error> {
        let user = self.require_user(actor).await?;
        self.require_post(post).await?;

        let mut bookmarks = user.bookmarks;
        let added = if bookmarks.contains(post) {
            bookmarks.retain(|id| id != post);
            false
        } else {
            bookmarks.push(*post);
            true
        };

        self.user_store
            .save_bookmarks(actor, &bookmarks)
            .await
            .map_err(map_user_store_error)?;
        Ok(BookmarkOutcome { added, bookmarks })
    }
}
