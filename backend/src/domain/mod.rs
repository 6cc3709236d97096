//! Domain primitives, aggregates, services, and ports.
//!
//! Purpose: define the strongly typed entities and use-cases shared by the
//! HTTP and persistence adapters. Types here are transport agnostic; serde
//! contracts are documented on each type.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`] — API error payload and stable identifiers.
//! - [`User`], [`Post`], [`Comment`], [`Notification`] — stored aggregates.
//! - [`ports`] — driven store ports and driving use-case ports.
//! - Services: [`FeedService`], [`EngagementService`], [`ImpressionService`],
//!   [`SocialGraphService`].

pub mod engagement;
pub mod error;
pub mod feed;
pub mod impressions;
pub mod notification;
pub mod ports;
pub mod post;
pub mod social;
pub mod user;

pub use self::engagement::{BookmarkOutcome, EngagementService};
pub use self::error::{Error, ErrorCode};
pub use self::feed::{CommentView, FeedService, PostView, RepostView};
pub use self::impressions::{DailyImpressions, ImpressionService, ImpressionSummary};
pub use self::notification::{Notification, NotificationKind};
pub use self::post::{Comment, Post, PostDraft, PostId, PostValidationError};
pub use self::social::{FollowCounts, SocialGraphService};
pub use self::user::{AuthorCard, User, UserId, UserValidationError, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
