//! User aggregate and its identifiers.
//!
//! A [`User`] carries the public profile plus the reference sets that drive
//! the social graph: who the user follows, who follows them, and which posts
//! they have liked or bookmarked. Credential fields (password hash, reset
//! tokens) live only on the persistence row and never reach this type, so
//! serialising a `User` is always public-safe.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::post::PostId;

/// Validation errors returned when constructing user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier is empty or not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Username is empty once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username exceeds the storage limit.
    #[error("username must be at most {max} characters")]
    UsernameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Username contains characters outside the accepted set.
    #[error("username may only contain letters, numbers, dots, or underscores")]
    UsernameInvalidCharacters,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum accepted username length.
pub const USERNAME_MAX: usize = 30;

/// Unique handle a user is addressed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if username.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user with profile fields and social reference sets.
///
/// ## Invariants
/// - `following`/`followers` are maintained as mutual inverses by the follow
///   mutator (outside this core); no self-reference is permitted.
/// - `liked_posts` mirrors `Post::likes`; the like mutator updates both sides
///   in one store transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable user identifier.
    pub id: UserId,
    /// Unique handle.
    pub username: Username,
    /// Display name shown alongside posts.
    pub full_name: String,
    /// Contact address; public in the origin's profile projection.
    pub email: Option<String>,
    /// Avatar image URL.
    pub profile_img: Option<String>,
    /// Banner image URL.
    pub cover_img: Option<String>,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Profile link.
    pub link: Option<String>,
    /// Users this user follows.
    pub following: Vec<UserId>,
    /// Users following this user.
    pub followers: Vec<UserId>,
    /// Posts this user has liked, in like order.
    pub liked_posts: Vec<PostId>,
    /// Posts this user has bookmarked, in bookmark order.
    pub bookmarks: Vec<PostId>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Reduced author projection: `{username, fullName, profileImg}` only.
///
/// Used where the origin projects post authors down to a display card
/// (repost and bookmark listings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorCard {
    /// Unique handle.
    pub username: Username,
    /// Display name.
    pub full_name: String,
    /// Avatar image URL.
    pub profile_img: Option<String>,
}

impl From<&User> for AuthorCard {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            profile_img: user.profile_img.clone(),
        }
    }
}
