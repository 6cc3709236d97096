//! In-memory adapters and world builders shared by unit and integration
//! tests.
//!
//! The in-memory stores implement the driven ports over mutex-guarded maps,
//! which keeps service tests free of database plumbing while still exercising
//! the real services end to end.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;

use crate::domain::ports::{
    MediaStore, MediaStoreError, NotificationOutbox, OutboxError, PostStore, PostStoreError,
    UserStore, UserStoreError,
};
use crate::domain::{Comment, Notification, Post, PostId, User, UserId, Username};

/// Clock returning a fixed instant.
pub struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock pinned to an arbitrary deterministic instant.
pub fn fixed_clock() -> Arc<dyn Clock> {
    fixed_clock_at(DateTime::UNIX_EPOCH)
}

/// A clock pinned to the given instant.
pub fn fixed_clock_at(now: DateTime<Utc>) -> Arc<dyn Clock> {
    Arc::new(FixedClock(now))
}

/// Mutex-guarded [`UserStore`] implementation.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    fn upsert(&self, user: User) {
        let mut guard = self.users.lock().expect("user store poisoned");
        guard.insert(user.id, user);
    }

    fn remove(&self, id: &UserId) {
        let mut guard = self.users.lock().expect("user store poisoned");
        guard.remove(id);
    }

    fn get(&self, id: &UserId) -> Option<User> {
        let guard = self.users.lock().expect("user store poisoned");
        guard.get(id).cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError> {
        Ok(self.get(id))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserStoreError> {
        let guard = self.users.lock().expect("user store poisoned");
        Ok(guard
            .values()
            .find(|user| user.username == *username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserStoreError> {
        let guard = self.users.lock().expect("user store poisoned");
        Ok(ids.iter().filter_map(|id| guard.get(id).cloned()).collect())
    }

    async fn save_bookmarks(
        &self,
        id: &UserId,
        bookmarks: &[PostId],
    ) -> Result<(), UserStoreError> {
        let mut guard = self.users.lock().expect("user store poisoned");
        let user = guard
            .get_mut(id)
            .ok_or_else(|| UserStoreError::query("user vanished"))?;
        user.bookmarks = bookmarks.to_vec();
        Ok(())
    }
}

/// Mutex-guarded [`PostStore`] implementation.
///
/// Holds a handle to the user store so `save_like_mirror` can honour the
/// port's contract of updating both sides of the like mirror together.
pub struct InMemoryPostStore {
    posts: Mutex<HashMap<PostId, Post>>,
    users: Arc<InMemoryUserStore>,
}

impl InMemoryPostStore {
    /// Create a post store sharing the given user store.
    pub fn new(users: Arc<InMemoryUserStore>) -> Self {
        Self {
            posts: Mutex::new(HashMap::new()),
            users,
        }
    }

    fn get(&self, id: &PostId) -> Option<Post> {
        let guard = self.posts.lock().expect("post store poisoned");
        guard.get(id).cloned()
    }

    fn sorted_desc(mut posts: Vec<Post>) -> Vec<Post> {
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostStoreError> {
        Ok(self.get(id))
    }

    async fn list_all(&self) -> Result<Vec<Post>, PostStoreError> {
        let guard = self.posts.lock().expect("post store poisoned");
        Ok(Self::sorted_desc(guard.values().cloned().collect()))
    }

    async fn list_by_author(&self, author: &UserId) -> Result<Vec<Post>, PostStoreError> {
        let guard = self.posts.lock().expect("post store poisoned");
        Ok(Self::sorted_desc(
            guard
                .values()
                .filter(|post| post.author == *author)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_authors(&self, authors: &[UserId]) -> Result<Vec<Post>, PostStoreError> {
        let guard = self.posts.lock().expect("post store poisoned");
        Ok(Self::sorted_desc(
            guard
                .values()
                .filter(|post| authors.contains(&post.author))
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_ids(&self, ids: &[PostId]) -> Result<Vec<Post>, PostStoreError> {
        let guard = self.posts.lock().expect("post store poisoned");
        Ok(ids.iter().filter_map(|id| guard.get(id).cloned()).collect())
    }

    async fn list_reposted_by(&self, user: &UserId) -> Result<Vec<Post>, PostStoreError> {
        let guard = self.posts.lock().expect("post store poisoned");
        Ok(guard
            .values()
            .filter(|post| post.reposts.contains(user))
            .cloned()
            .collect())
    }

    async fn list_by_author_since(
        &self,
        author: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Post>, PostStoreError> {
        let guard = self.posts.lock().expect("post store poisoned");
        Ok(guard
            .values()
            .filter(|post| post.author == *author && post.created_at >= since)
            .cloned()
            .collect())
    }

    async fn insert(&self, post: &Post) -> Result<(), PostStoreError> {
        let mut guard = self.posts.lock().expect("post store poisoned");
        guard.insert(post.id, post.clone());
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<(), PostStoreError> {
        let mut guard = self.posts.lock().expect("post store poisoned");
        guard.remove(id);
        Ok(())
    }

    async fn save_like_mirror(
        &self,
        post: &PostId,
        likes: &[UserId],
        user: &UserId,
        liked_posts: &[PostId],
    ) -> Result<(), PostStoreError> {
        let mut guard = self.posts.lock().expect("post store poisoned");
        let stored = guard
            .get_mut(post)
            .ok_or_else(|| PostStoreError::query("post vanished"))?;
        stored.likes = likes.to_vec();

        let mut users = self.users.users.lock().expect("user store poisoned");
        if let Some(stored_user) = users.get_mut(user) {
            stored_user.liked_posts = liked_posts.to_vec();
        }
        Ok(())
    }

    async fn save_reposts(&self, id: &PostId, reposts: &[UserId]) -> Result<(), PostStoreError> {
        let mut guard = self.posts.lock().expect("post store poisoned");
        let stored = guard
            .get_mut(id)
            .ok_or_else(|| PostStoreError::query("post vanished"))?;
        stored.reposts = reposts.to_vec();
        Ok(())
    }

    async fn save_comments(
        &self,
        id: &PostId,
        comments: &[Comment],
    ) -> Result<(), PostStoreError> {
        let mut guard = self.posts.lock().expect("post store poisoned");
        let stored = guard
            .get_mut(id)
            .ok_or_else(|| PostStoreError::query("post vanished"))?;
        stored.comments = comments.to_vec();
        Ok(())
    }
}

/// Outbox recording emitted notifications for assertions.
#[derive(Default)]
pub struct InMemoryOutbox {
    events: Mutex<Vec<Notification>>,
}

impl InMemoryOutbox {
    /// Snapshot of everything emitted so far.
    pub fn emitted(&self) -> Vec<Notification> {
        self.events.lock().expect("outbox poisoned").clone()
    }
}

#[async_trait]
impl NotificationOutbox for InMemoryOutbox {
    async fn emit(&self, notification: &Notification) -> Result<(), OutboxError> {
        self.events
            .lock()
            .expect("outbox poisoned")
            .push(notification.clone());
        Ok(())
    }
}

/// Media store echoing payloads back as URLs.
#[derive(Default)]
pub struct InMemoryMediaStore;

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn store(&self, payload: &str) -> Result<String, MediaStoreError> {
        Ok(format!("mem://media/{payload}"))
    }

    async fn remove(&self, _url: &str) -> Result<(), MediaStoreError> {
        Ok(())
    }
}

/// Builder wiring users, posts, and engagement into the in-memory stores.
pub struct TestWorld {
    /// Shared post store.
    pub posts: Arc<InMemoryPostStore>,
    /// Shared user store.
    pub users: Arc<InMemoryUserStore>,
    /// Shared recording outbox.
    pub outbox: Arc<InMemoryOutbox>,
    /// Shared echoing media store.
    pub media: Arc<InMemoryMediaStore>,
    tick: i64,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Fresh, empty world.
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserStore::default());
        Self {
            posts: Arc::new(InMemoryPostStore::new(users.clone())),
            users,
            outbox: Arc::new(InMemoryOutbox::default()),
            media: Arc::new(InMemoryMediaStore::default()),
            tick: 0,
        }
    }

    fn next_instant(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        DateTime::UNIX_EPOCH + chrono::Duration::seconds(self.tick)
    }

    /// Add a user with a deterministic creation timestamp.
    pub fn add_user(&mut self, username: &str) -> UserId {
        let created_at = self.next_instant();
        self.add_user_at(username, created_at)
    }

    /// Add a user registered at the given instant.
    pub fn add_user_at(&mut self, username: &str, created_at: DateTime<Utc>) -> UserId {
        let id = UserId::random();
        self.users.upsert(User {
            id,
            username: Username::new(username).expect("valid fixture username"),
            full_name: format!("{username} full"),
            email: Some(format!("{username}@example.com")),
            profile_img: None,
            cover_img: None,
            bio: None,
            link: None,
            following: Vec::new(),
            followers: Vec::new(),
            liked_posts: Vec::new(),
            bookmarks: Vec::new(),
            created_at,
        });
        id
    }

    /// Remove a user, leaving dangling references behind.
    pub fn remove_user(&mut self, id: UserId) {
        self.users.remove(&id);
    }

    /// Add a text post with a deterministic creation timestamp.
    pub fn add_post(&mut self, author: UserId, text: &str) -> PostId {
        let created_at = self.next_instant();
        self.add_post_at(author, text, created_at)
    }

    /// Add a text post created at the given instant.
    pub fn add_post_at(
        &mut self,
        author: UserId,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> PostId {
        let id = PostId::random();
        let post = Post::new(id, author, Some(text.to_owned()), None, created_at);
        let mut guard = self.posts.posts.lock().expect("post store poisoned");
        guard.insert(id, post);
        id
    }

    /// Record `follower` following `followed` on both sides.
    pub fn follow(&mut self, follower: UserId, followed: UserId) {
        self.mutate_user(follower, |user| user.following.push(followed));
        self.mutate_user(followed, |user| user.followers.push(follower));
    }

    /// Record a like on both sides of the mirror.
    pub fn like(&mut self, liker: UserId, post: PostId) {
        self.mutate_post(post, |stored| stored.likes.push(liker));
        self.mutate_user(liker, |user| user.liked_posts.push(post));
    }

    /// Record a repost.
    pub fn repost(&mut self, reposter: UserId, post: PostId) {
        self.mutate_post(post, |stored| stored.reposts.push(reposter));
    }

    /// Record a bookmark.
    pub fn bookmark(&mut self, reader: UserId, post: PostId) {
        self.mutate_user(reader, |user| user.bookmarks.push(post));
    }

    /// Append a comment with the given timestamp.
    pub fn comment_at(
        &mut self,
        post: PostId,
        author: UserId,
        text: &str,
        created_at: DateTime<Utc>,
    ) {
        self.mutate_post(post, |stored| {
            stored.comments.push(Comment {
                author,
                text: text.to_owned(),
                created_at,
            });
        });
    }

    /// Current state of a user; panics if absent.
    pub fn user(&self, id: UserId) -> User {
        self.users.get(&id).expect("user present in world")
    }

    /// Current state of a post; panics if absent.
    pub fn post(&self, id: PostId) -> Post {
        self.find_post(id).expect("post present in world")
    }

    /// Current state of a post, if any.
    pub fn find_post(&self, id: PostId) -> Option<Post> {
        self.posts.get(&id)
    }

    fn mutate_user(&mut self, id: UserId, mutate: impl FnOnce(&mut User)) {
        let mut guard = self.users.users.lock().expect("user store poisoned");
        if let Some(user) = guard.get_mut(&id) {
            mutate(user);
        }
    }

    fn mutate_post(&mut self, id: PostId, mutate: impl FnOnce(&mut Post)) {
        let mut guard = self.posts.posts.lock().expect("post store poisoned");
        if let Some(post) = guard.get_mut(&id) {
            mutate(post);
        }
    }
}
