//! Row types bridging the PostgreSQL schema and the domain aggregates.
//!
//! `UserRow` is the credential boundary: it carries `password_hash` out of
//! the database, and the conversion into [`User`] drops it, so nothing above
//! the persistence layer can serialise a secret.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::{PostStoreError, UserStoreError};
use crate::domain::{Comment, Post, PostId, User, UserId, Username};

use super::schema::{notifications, posts, users};

/// One row of the `users` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Primary key.
    pub id: Uuid,
    /// Unique handle.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Credential hash; dropped before the row leaves this layer.
    pub password_hash: String,
    /// Contact address.
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
    pub following: Vec<Uuid>,
    /// Users following this user.
    pub followers: Vec<Uuid>,
    /// Posts this user liked.
    pub liked_posts: Vec<Uuid>,
    /// Posts this user bookmarked.
    pub bookmarks: Vec<Uuid>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Convert a user row into the credential-free domain aggregate.
pub fn user_from_row(row: UserRow) -> Result<User, UserStoreError> {
    let username = Username::new(row.username)
        .map_err(|error| UserStoreError::query(format!("stored username invalid: {error}")))?;
    Ok(User {
        id: UserId::from_uuid(row.id),
        username,
        full_name: row.full_name,
        email: row.email,
        profile_img: row.profile_img,
        cover_img: row.cover_img,
        bio: row.bio,
        link: row.link,
        following: row.following.into_iter().map(UserId::from_uuid).collect(),
        followers: row.followers.into_iter().map(UserId::from_uuid).collect(),
        liked_posts: row.liked_posts.into_iter().map(PostId::from_uuid).collect(),
        bookmarks: row.bookmarks.into_iter().map(PostId::from_uuid).collect(),
        created_at: row.created_at,
    })
}

/// One row of the `posts` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostRow {
    /// Primary key.
    pub id: Uuid,
    /// Authoring user.
    pub author: Uuid,
    /// Post body.
    pub text: Option<String>,
    /// Stored image URL.
    pub image: Option<String>,
    /// Users who liked this post.
    pub likes: Vec<Uuid>,
    /// Users who reposted this post.
    pub reposts: Vec<Uuid>,
    /// Embedded comment sequence as JSONB.
    pub comments: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insertable form of a fresh post.
#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPostRow {
    /// Primary key.
    pub id: Uuid,
    /// Authoring user.
    pub author: Uuid,
    /// Post body.
    pub text: Option<String>,
    /// Stored image URL.
    pub image: Option<String>,
    /// Users who liked this post.
    pub likes: Vec<Uuid>,
    /// Users who reposted this post.
    pub reposts: Vec<Uuid>,
    /// Embedded comment sequence as JSONB.
    pub comments: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Convert a post row into the domain aggregate, decoding embedded comments.
pub fn post_from_row(row: PostRow) -> Result<Post, PostStoreError> {
    let comments: Vec<Comment> = serde_json::from_value(row.comments)
        .map_err(|error| PostStoreError::serialization(error.to_string()))?;
    Ok(Post {
        id: PostId::from_uuid(row.id),
        author: UserId::from_uuid(row.author),
        text: row.text,
        image: row.image,
        likes: row.likes.into_iter().map(UserId::from_uuid).collect(),
        reposts: row.reposts.into_iter().map(UserId::from_uuid).collect(),
        comments,
        created_at: row.created_at,
    })
}

/// Build the insertable form of a domain post.
pub fn post_to_new_row(post: &Post) -> Result<NewPostRow, PostStoreError> {
    let comments = serde_json::to_value(&post.comments)
        .map_err(|error| PostStoreError::serialization(error.to_string()))?;
    Ok(NewPostRow {
        id: *post.id.as_uuid(),
        author: *post.author.as_uuid(),
        text: post.text.clone(),
        image: post.image.clone(),
        likes: post.likes.iter().map(|id| *id.as_uuid()).collect(),
        reposts: post.reposts.iter().map(|id| *id.as_uuid()).collect(),
        comments,
        created_at: post.created_at,
    })
}

/// Encode an embedded comment sequence for a JSONB column.
pub fn comments_to_value(comments: &[Comment]) -> Result<serde_json::Value, PostStoreError> {
    serde_json::to_value(comments)
        .map_err(|error| PostStoreError::serialization(error.to_string()))
}

/// Insertable form of a notification.
#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow {
    /// Primary key.
    pub id: Uuid,
    /// Acting user.
    pub from_user: Uuid,
    /// Receiving user.
    pub to_user: Uuid,
    /// Engagement kind.
    pub kind: String,
    /// Emission timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn user_row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: "ada".to_owned(),
            full_name: "Ada Lovelace".to_owned(),
            password_hash: "$argon2id$...".to_owned(),
            email: Some("ada@example.com".to_owned()),
            profile_img: None,
            cover_img: None,
            bio: None,
            link: None,
            following: vec![Uuid::new_v4()],
            followers: vec![],
            liked_posts: vec![Uuid::new_v4()],
            bookmarks: vec![],
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn user_conversion_drops_the_credential_hash() {
        let row = user_row();
        let user = user_from_row(row).expect("valid row");
        let serialised = serde_json::to_value(&user).expect("serialize user");
        assert!(serialised.get("passwordHash").is_none());
        assert!(serialised.get("password_hash").is_none());
        assert_eq!(
            serialised.get("username").and_then(|v| v.as_str()),
            Some("ada")
        );
    }

    #[rstest]
    fn user_conversion_rejects_corrupt_usernames() {
        let mut row = user_row();
        row.username = "not valid!".to_owned();
        let err = user_from_row(row).expect_err("corrupt username");
        assert!(matches!(err, UserStoreError::Query { .. }));
    }

    #[rstest]
    fn post_round_trips_through_row_form() {
        let author = UserId::random();
        let mut post = Post::new(
            PostId::random(),
            author,
            Some("hello".to_owned()),
            None,
            Utc::now(),
        );
        post.comments.push(Comment {
            author,
            text: "first".to_owned(),
            created_at: Utc::now(),
        });

        let new_row = post_to_new_row(&post).expect("encode post");
        let row = PostRow {
            id: new_row.id,
            author: new_row.author,
            text: new_row.text,
            image: new_row.image,
            likes: new_row.likes,
            reposts: new_row.reposts,
            comments: new_row.comments,
            created_at: new_row.created_at,
        };
        let decoded = post_from_row(row).expect("decode post");
        assert_eq!(decoded, post);
    }

    #[rstest]
    fn corrupt_comment_payloads_surface_as_serialization_errors() {
        let row = PostRow {
            id: Uuid::new_v4(),
            author: Uuid::new_v4(),
            text: Some("hello".to_owned()),
            image: None,
            likes: vec![],
            reposts: vec![],
            comments: json!({ "not": "an array" }),
            created_at: Utc::now(),
        };
        let err = post_from_row(row).expect_err("corrupt comments");
        assert!(matches!(err, PostStoreError::Serialization { .. }));
    }
}
