//! Post query engine.
//!
//! Resolves posts by predicate and projects authors (and comment authors)
//! onto public-safe shapes before anything is serialised. Two projections
//! exist: the full profile (credential-free [`User`]) for the main feeds, and
//! the reduced [`AuthorCard`] for repost and bookmark listings.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::Error;
use super::ports::{FeedQuery, PostStore, PostStoreError, UserStore, UserStoreError};
use super::post::{Comment, Post, PostId};
use super::user::{AuthorCard, User, UserId, Username};

/// Comment with its author resolved to a full profile.
///
/// Authors of since-deleted accounts resolve to `None` and serialise as
/// `null`, matching the origin's reference-resolution behaviour.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    /// Resolved comment author.
    #[serde(rename = "user")]
    pub author: Option<User>,
    /// Comment body.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Post with author and comment authors resolved to full profiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    /// Stable post identifier.
    pub id: PostId,
    /// Resolved post author.
    #[serde(rename = "user")]
    pub author: Option<User>,
    /// Post body.
    pub text: Option<String>,
    /// Stored image URL.
    #[serde(rename = "img")]
    pub image: Option<String>,
    /// Users who liked this post.
    pub likes: Vec<UserId>,
    /// Users who reposted this post.
    pub reposts: Vec<UserId>,
    /// Comments with resolved authors.
    pub comments: Vec<CommentView>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Post with its author reduced to a display card.
///
/// Comments are carried verbatim (author ids unresolved), matching the
/// origin's repost and bookmark listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepostView {
    /// Stable post identifier.
    pub id: PostId,
    /// Reduced author card.
    #[serde(rename = "user")]
    pub author: Option<AuthorCard>,
    /// Post body.
    pub text: Option<String>,
    /// Stored image URL.
    #[serde(rename = "img")]
    pub image: Option<String>,
    /// Users who liked this post.
    pub likes: Vec<UserId>,
    /// Users who reposted this post.
    pub reposts: Vec<UserId>,
    /// Embedded comments, authors unresolved.
    pub comments: Vec<Comment>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query service implementing [`FeedQuery`] over the store ports.
#[derive(Clone)]
pub struct FeedService<P, U> {
    post_store: Arc<P>,
    user_store: Arc<U>,
}

impl<P, U> FeedService<P, U> {
    /// Create a new service over the given stores.
    pub fn new(post_store: Arc<P>, user_store: Arc<U>) -> Self {
        Self {
            post_store,
            user_store,
        }
    }
}

fn map_post_store_error(error: PostStoreError) -> Error {
    Error::internal(format!("post store failure: {error}"))
}

fn map_user_store_error(error: UserStoreError) -> Error {
    Error::internal(format!("user store failure: {error}"))
}

/// Reorder `posts` to follow the sequence of `ids`; ids without a matching
/// post are skipped.
fn order_by_reference(posts: Vec<Post>, ids: &[PostId]) -> Vec<Post> {
    let mut by_id: HashMap<PostId, Post> = posts.into_iter().map(|p| (p.id, p)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

impl<P, U> FeedService<P, U>
where
    P: PostStore,
    U: UserStore,
{
    async fn load_profiles(&self, ids: Vec<UserId>) -> Result<HashMap<UserId, User>, Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self
            .user_store
            .find_by_ids(&ids)
            .await
            .map_err(map_user_store_error)?;
        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }

    /// Resolve post and comment authors against the user store.
    async fn project_posts(&self, posts: Vec<Post>) -> Result<Vec<PostView>, Error> {
        let mut wanted: Vec<UserId> = Vec::new();
        for post in &posts {
            if !wanted.contains(&post.author) {
                wanted.push(post.author);
            }
            for comment in &post.comments {
                if !wanted.contains(&comment.author) {
                    wanted.push(comment.author);
                }
            }
        }
        let profiles = self.load_profiles(wanted).await?;

        Ok(posts
            .into_iter()
            .map(|post| PostView {
                id: post.id,
                author: profiles.get(&post.author).cloned(),
                text: post.text,
                image: post.image,
                likes: post.likes,
                reposts: post.reposts,
                comments: post
                    .comments
                    .into_iter()
                    .map(|comment| CommentView {
                        author: profiles.get(&comment.author).cloned(),
                        text: comment.text,
                        created_at: comment.created_at,
                    })
                    .collect(),
                created_at: post.created_at,
            })
            .collect())
    }

    /// Resolve post authors down to display cards.
    async fn project_cards(&self, posts: Vec<Post>) -> Result<Vec<RepostView>, Error> {
        let mut wanted: Vec<UserId> = Vec::new();
        for post in &posts {
            if !wanted.contains(&post.author) {
                wanted.push(post.author);
            }
        }
        let profiles = self.load_profiles(wanted).await?;

        Ok(posts
            .into_iter()
            .map(|post| RepostView {
                id: post.id,
                author: profiles.get(&post.author).map(AuthorCard::from),
                text: post.text,
                image: post.image,
                likes: post.likes,
                reposts: post.reposts,
                comments: post.comments,
                created_at: post.created_at,
            })
            .collect())
    }

    async fn require_user(&self, id: &UserId) -> Result<User, Error> {
        self.user_store
            .find_by_id(id)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }
}

#[async_trait]
impl<P, U> FeedQuery for FeedService<P, U>
where
    P: PostStore,
    U: UserStore,
{
    async fn list_all(&self) -> Result<Vec<PostView>, Error> {
        let posts = self
            .post_store
            .list_all()
            .await
            .map_err(map_post_store_error)?;
        self.project_posts(posts).await
    }

    async fn list_following_feed(&self, viewer: &UserId) -> Result<Vec<PostView>, Error> {
        let user = self.require_user(viewer).await?;
        if user.following.is_empty() {
            return Ok(Vec::new());
        }
        let posts = self
            .post_store
            .list_by_authors(&user.following)
            .await
            .map_err(map_post_store_error)?;
        self.project_posts(posts).await
    }

    async fn list_by_author(&self, username: &Username) -> Result<Vec<PostView>, Error> {
        let user = self
            .user_store
            .find_by_username(username)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;
        let posts = self
            .post_store
            .list_by_author(&user.id)
            .await
            .map_err(map_post_store_error)?;
        self.project_posts(posts).await
    }

    async fn list_liked(&self, user: &UserId) -> Result<Vec<PostView>, Error> {
        let profile = self.require_user(user).await?;
        let posts = self
            .post_store
            .list_by_ids(&profile.liked_posts)
            .await
            .map_err(map_post_store_error)?;
        // The like set's storage order is the contract, not chronology.
        let ordered = order_by_reference(posts, &profile.liked_posts);
        self.project_posts(ordered).await
    }

    async fn list_reposted(&self, user: &UserId) -> Result<Vec<RepostView>, Error> {
        let posts = self
            .post_store
            .list_reposted_by(user)
            .await
            .map_err(map_post_store_error)?;
        self.project_cards(posts).await
    }

    async fn list_bookmarked(&self, user: &UserId) -> Result<Vec<RepostView>, Error> {
        let profile = self.require_user(user).await?;
        let posts = self
            .post_store
            .list_by_ids(&profile.bookmarks)
            .await
            .map_err(map_post_store_error)?;
        let ordered = order_by_reference(posts, &profile.bookmarks);
        self.project_cards(ordered).await
    }
}
