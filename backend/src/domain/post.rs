//! Post aggregate with embedded comments and engagement reference sets.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Validation errors returned when constructing posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// Identifier is empty or not a UUID.
    #[error("post id must be a valid UUID")]
    InvalidId,
    /// Neither text nor image supplied at creation.
    #[error("post must have text or image")]
    EmptyPost,
    /// Comment text is empty once trimmed.
    #[error("comment text must not be empty")]
    EmptyComment,
}

/// Stable post identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(Uuid);

impl PostId {
    /// Validate and construct a [`PostId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, PostValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| PostValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`PostId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Comment embedded in a post.
///
/// Comments are append-only: they are created by the comment mutator and no
/// operation edits or removes them. Ordering is insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment author.
    #[serde(rename = "user")]
    pub author: UserId,
    /// Comment body.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Build a comment after rejecting blank text.
    pub fn new(
        author: UserId,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PostValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(PostValidationError::EmptyComment);
        }
        Ok(Self {
            author,
            text,
            created_at,
        })
    }
}

/// Unsaved post content as supplied by the author.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostDraft {
    /// Post body, optional when an image is present.
    pub text: Option<String>,
    /// Raw image payload handed to the media store, optional when text is
    /// present.
    pub image: Option<String>,
}

impl PostDraft {
    /// Reject drafts carrying neither text nor image.
    ///
    /// Blank-only text counts as absent.
    pub fn validate(&self) -> Result<(), PostValidationError> {
        let has_text = self
            .text
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty());
        if has_text || self.image.is_some() {
            Ok(())
        } else {
            Err(PostValidationError::EmptyPost)
        }
    }
}

/// Published post.
///
/// ## Invariants
/// - `author` is immutable after creation.
/// - At least one of `text`/`image` is present (enforced at creation via
///   [`PostDraft::validate`]).
/// - `likes` mirrors `User::liked_posts`; `reposts` and `comments` grow
///   monotonically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Stable post identifier.
    pub id: PostId,
    /// Post author; immutable after creation.
    #[serde(rename = "user")]
    pub author: UserId,
    /// Post body.
    pub text: Option<String>,
    /// Stored image URL.
    #[serde(rename = "img")]
    pub image: Option<String>,
    /// Users who liked this post.
    pub likes: Vec<UserId>,
    /// Users who reposted this post.
    pub reposts: Vec<UserId>,
    /// Embedded comments in insertion order.
    pub comments: Vec<Comment>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Build a fresh post with empty engagement sets.
    pub fn new(
        id: PostId,
        author: UserId,
        text: Option<String>,
        image: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author,
            text,
            image,
            likes: Vec::new(),
            reposts: Vec::new(),
            comments: Vec::new(),
            created_at,
        }
    }

    /// Whether the given user is in the like set.
    pub fn liked_by(&self, user: &UserId) -> bool {
        self.likes.contains(user)
    }

    /// Whether the given user is in the repost set.
    pub fn reposted_by(&self, user: &UserId) -> bool {
        self.reposts.contains(user)
    }
}
