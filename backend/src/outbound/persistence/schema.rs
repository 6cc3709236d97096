//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `migrations/` exactly;
//! Diesel uses them for compile-time query validation and type-safe SQL
//! generation. Reference sets are UUID array columns so every engagement
//! mutation stays a single-row write; embedded comments live in a JSONB
//! column owned by their post.

diesel::table! {
    /// User documents.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique handle (max 30 characters).
        username -> Varchar,
        /// Display name.
        full_name -> Varchar,
        /// Credential hash; never leaves the persistence layer.
        password_hash -> Varchar,
        /// Contact address.
        email -> Nullable<Varchar>,
        /// Avatar image URL.
        profile_img -> Nullable<Varchar>,
        /// Banner image URL.
        cover_img -> Nullable<Varchar>,
        /// Free-form biography.
        bio -> Nullable<Text>,
        /// Profile link.
        link -> Nullable<Varchar>,
        /// Users this user follows.
        following -> Array<Uuid>,
        /// Users following this user.
        followers -> Array<Uuid>,
        /// Posts this user liked, in like order.
        liked_posts -> Array<Uuid>,
        /// Posts this user bookmarked, in bookmark order.
        bookmarks -> Array<Uuid>,
        /// Account creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Post documents with embedded comments.
    posts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Authoring user; immutable after creation.
        author -> Uuid,
        /// Post body.
        text -> Nullable<Text>,
        /// Stored image URL.
        image -> Nullable<Varchar>,
        /// Users who liked this post.
        likes -> Array<Uuid>,
        /// Users who reposted this post.
        reposts -> Array<Uuid>,
        /// Embedded comment sequence, insertion ordered.
        comments -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only notification outbox consumed elsewhere.
    notifications (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Acting user.
        from_user -> Uuid,
        /// Receiving user.
        to_user -> Uuid,
        /// Engagement kind (`like` or `repost`).
        kind -> Varchar,
        /// Emission timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, posts, notifications);
