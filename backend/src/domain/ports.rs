//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain expects to interact with adapters
//! (the document store, the notification outbox, the external media host).
//! Driving ports are the use-case surface the HTTP adapter depends on. Each
//! driven trait exposes strongly typed errors so adapters map their failures
//! into predictable variants instead of returning `anyhow::Result`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error as ThisError;

use super::engagement::BookmarkOutcome;
use super::error::Error;
use super::feed::{PostView, RepostView};
use super::impressions::{DailyImpressions, ImpressionSummary};
use super::notification::Notification;
use super::post::{Comment, Post, PostDraft, PostId};
use super::social::FollowCounts;
use super::user::{User, UserId, Username};

/// Failures surfaced by [`UserStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum UserStoreError {
    /// Store connection could not be established or was lost.
    #[error("user store connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user store query failed: {message}")]
    Query {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl UserStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Failures surfaced by [`PostStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum PostStoreError {
    /// Store connection could not be established or was lost.
    #[error("post store connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("post store query failed: {message}")]
    Query {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// Stored document could not be decoded into the domain shape.
    #[error("post store payload could not be decoded: {message}")]
    Serialization {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl PostStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for decode failures.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// Failures surfaced when handing a notification to the outbox.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum OutboxError {
    /// The outbox rejected or failed to record the notification.
    #[error("notification outbox rejected the event: {message}")]
    Rejected {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl OutboxError {
    /// Helper for rejected events.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Failures surfaced by the external media host adapter.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum MediaStoreError {
    /// Upload to the media host failed.
    #[error("media upload failed: {message}")]
    Upload {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// Deletion of stored media failed.
    #[error("media removal failed: {message}")]
    Removal {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl MediaStoreError {
    /// Helper for upload failures.
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload {
            message: message.into(),
        }
    }

    /// Helper for removal failures.
    pub fn removal(message: impl Into<String>) -> Self {
        Self::Removal {
            message: message.into(),
        }
    }
}

/// Persistence port for user documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError>;

    /// Resolve a user by unique handle.
    async fn find_by_username(&self, username: &Username)
    -> Result<Option<User>, UserStoreError>;

    /// Fetch the users for the given identifiers; absent ids are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserStoreError>;

    /// Replace the user's bookmark reference set.
    async fn save_bookmarks(
        &self,
        id: &UserId,
        bookmarks: &[PostId],
    ) -> Result<(), UserStoreError>;
}

/// Persistence port for post documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Fetch a post by identifier.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostStoreError>;

    /// All posts, newest first.
    async fn list_all(&self) -> Result<Vec<Post>, PostStoreError>;

    /// Posts authored by the given user, newest first.
    async fn list_by_author(&self, author: &UserId) -> Result<Vec<Post>, PostStoreError>;

    /// Posts authored by any of the given users, newest first.
    async fn list_by_authors(&self, authors: &[UserId]) -> Result<Vec<Post>, PostStoreError>;

    /// Posts matching the given identifiers; absent ids are skipped and no
    /// ordering is guaranteed.
    async fn list_by_ids(&self, ids: &[PostId]) -> Result<Vec<Post>, PostStoreError>;

    /// Posts whose repost set contains the given user.
    async fn list_reposted_by(&self, user: &UserId) -> Result<Vec<Post>, PostStoreError>;

    /// Posts authored by the given user created at or after `since`.
    async fn list_by_author_since(
        &self,
        author: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Post>, PostStoreError>;

    /// Persist a freshly created post.
    async fn insert(&self, post: &Post) -> Result<(), PostStoreError>;

    /// Remove a post document.
    async fn delete(&self, id: &PostId) -> Result<(), PostStoreError>;

    /// Replace both sides of the like mirror in one store transaction: the
    /// post's like set and the user's liked-posts set.
    async fn save_like_mirror(
        &self,
        post: &PostId,
        likes: &[UserId],
        user: &UserId,
        liked_posts: &[PostId],
    ) -> Result<(), PostStoreError>;

    /// Replace a post's repost reference set.
    async fn save_reposts(&self, id: &PostId, reposts: &[UserId]) -> Result<(), PostStoreError>;

    /// Replace a post's embedded comment sequence.
    async fn save_comments(&self, id: &PostId, comments: &[Comment])
    -> Result<(), PostStoreError>;
}

/// Outbox port recording engagement notifications for a downstream consumer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationOutbox: Send + Sync {
    /// Record a notification event. Delivery happens elsewhere.
    async fn emit(&self, notification: &Notification) -> Result<(), OutboxError>;
}

/// Port to the external media host holding post images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload an image payload and return its stored URL.
    async fn store(&self, payload: &str) -> Result<String, MediaStoreError>;

    /// Remove a previously stored image.
    async fn remove(&self, url: &str) -> Result<(), MediaStoreError>;
}

/// Driving port for the post query engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedQuery: Send + Sync {
    /// All posts, newest first, with full author projection.
    async fn list_all(&self) -> Result<Vec<PostView>, Error>;

    /// Posts authored by users the viewer follows, newest first.
    async fn list_following_feed(&self, viewer: &UserId) -> Result<Vec<PostView>, Error>;

    /// Posts authored by the resolved user, newest first.
    async fn list_by_author(&self, username: &Username) -> Result<Vec<PostView>, Error>;

    /// Posts the user has liked, in the like set's storage order.
    async fn list_liked(&self, user: &UserId) -> Result<Vec<PostView>, Error>;

    /// Posts the user has reposted, with reduced author cards.
    async fn list_reposted(&self, user: &UserId) -> Result<Vec<RepostView>, Error>;

    /// Posts the user has bookmarked, with reduced author cards.
    async fn list_bookmarked(&self, user: &UserId) -> Result<Vec<RepostView>, Error>;
}

/// Driving port for the engagement mutators.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EngagementCommand: Send + Sync {
    /// Publish a new post.
    async fn create_post(&self, author: &UserId, draft: PostDraft) -> Result<Post, Error>;

    /// Delete a post; only the author may do this.
    async fn delete_post(&self, actor: &UserId, post: &PostId) -> Result<(), Error>;

    /// Toggle the actor's like on a post, returning the updated like set.
    async fn toggle_like(&self, actor: &UserId, post: &PostId) -> Result<Vec<UserId>, Error>;

    /// Append a comment, returning the full updated post.
    async fn add_comment(&self, actor: &UserId, post: &PostId, text: &str)
    -> Result<Post, Error>;

    /// Record a repost (add-only), returning the updated post.
    async fn repost(&self, actor: &UserId, post: &PostId) -> Result<Post, Error>;

    /// Toggle the actor's bookmark on a post.
    async fn toggle_bookmark(
        &self,
        actor: &UserId,
        post: &PostId,
    ) -> Result<BookmarkOutcome, Error>;
}

/// Driving port for the impression aggregator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImpressionsQuery: Send + Sync {
    /// Seven-day like+comment histogram for the author's recent posts.
    async fn count_impressions(&self, author: &UserId) -> Result<ImpressionSummary, Error>;
}

/// Driving port for the social graph accessor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialGraphQuery: Send + Sync {
    /// Follower and following counts for the given user.
    async fn follower_following_counts(&self, user: &UserId) -> Result<FollowCounts, Error>;
}

/// Canned [`FeedQuery`] implementation for tests and examples.
///
/// Returns empty feeds everywhere; handler tests asserting on payload shape
/// use the in-memory stores from the test-support module instead.
pub struct FixtureFeedQuery;

#[async_trait]
impl FeedQuery for FixtureFeedQuery {
    async fn list_all(&self) -> Result<Vec<PostView>, Error> {
        Ok(Vec::new())
    }

    async fn list_following_feed(&self, _viewer: &UserId) -> Result<Vec<PostView>, Error> {
        Ok(Vec::new())
    }

    async fn list_by_author(&self, _username: &Username) -> Result<Vec<PostView>, Error> {
        Ok(Vec::new())
    }

    async fn list_liked(&self, _user: &UserId) -> Result<Vec<PostView>, Error> {
        Ok(Vec::new())
    }

    async fn list_reposted(&self, _user: &UserId) -> Result<Vec<RepostView>, Error> {
        Ok(Vec::new())
    }

    async fn list_bookmarked(&self, _user: &UserId) -> Result<Vec<RepostView>, Error> {
        Ok(Vec::new())
    }
}

/// Canned [`EngagementCommand`] implementation for tests and examples.
pub struct FixtureEngagementCommand;

#[async_trait]
impl EngagementCommand for FixtureEngagementCommand {
    async fn create_post(&self, author: &UserId, draft: PostDraft) -> Result<Post, Error> {
        draft
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(Post::new(
            PostId::from_uuid(uuid::Uuid::nil()),
            *author,
            draft.text,
            draft.image,
            DateTime::UNIX_EPOCH,
        ))
    }

    async fn delete_post(&self, _actor: &UserId, _post: &PostId) -> Result<(), Error> {
        Ok(())
    }

    async fn toggle_like(&self, actor: &UserId, _post: &PostId) -> Result<Vec<UserId>, Error> {
        Ok(vec![*actor])
    }

    async fn add_comment(
        &self,
        actor: &UserId,
        post: &PostId,
        text: &str,
    ) -> Result<Post, Error> {
        if text.trim().is_empty() {
            return Err(Error::invalid_request("Text field is required"));
        }
        let mut updated = Post::new(
            *post,
            UserId::from_uuid(uuid::Uuid::nil()),
            Some("fixture".to_owned()),
            None,
            DateTime::UNIX_EPOCH,
        );
        updated.comments.push(Comment {
            author: *actor,
            text: text.to_owned(),
            created_at: DateTime::UNIX_EPOCH,
        });
        Ok(updated)
    }

    async fn repost(&self, actor: &UserId, post: &PostId) -> Result<Post, Error> {
        let mut updated = Post::new(
            *post,
            UserId::from_uuid(uuid::Uuid::nil()),
            Some("fixture".to_owned()),
            None,
            DateTime::UNIX_EPOCH,
        );
        updated.reposts.push(*actor);
        Ok(updated)
    }

    async fn toggle_bookmark(
        &self,
        _actor: &UserId,
        post: &PostId,
    ) -> Result<BookmarkOutcome, Error> {
        Ok(BookmarkOutcome {
            added: true,
            bookmarks: vec![*post],
        })
    }
}

/// Canned [`ImpressionsQuery`] implementation for tests and examples.
///
/// Emits a fixed window ending at the Unix epoch with all-zero buckets.
pub struct FixtureImpressionsQuery;

#[async_trait]
impl ImpressionsQuery for FixtureImpressionsQuery {
    async fn count_impressions(&self, _author: &UserId) -> Result<ImpressionSummary, Error> {
        let today = DateTime::UNIX_EPOCH.date_naive();
        let daily = (0..7)
            .rev()
            .map(|offset| DailyImpressions {
                date: today - chrono::Duration::days(offset),
                count: 0,
            })
            .collect();
        Ok(ImpressionSummary {
            daily,
            total_likes: 0,
            total_comments: 0,
        })
    }
}

/// Canned [`SocialGraphQuery`] implementation for tests and examples.
pub struct FixtureSocialGraphQuery;

#[async_trait]
impl SocialGraphQuery for FixtureSocialGraphQuery {
    async fn follower_following_counts(&self, _user: &UserId) -> Result<FollowCounts, Error> {
        Ok(FollowCounts {
            followers: 2,
            following: 3,
        })
    }
}
