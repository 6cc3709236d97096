//! Post, engagement, and dashboard HTTP handlers.
//!
//! ```text
//! GET    /api/posts/all                     full feed
//! GET    /api/posts/following               feed of followed authors
//! GET    /api/posts/likes/{id}              posts a user liked
//! GET    /api/posts/user/{username}         posts by author
//! POST   /api/posts/create                  publish a post
//! POST   /api/posts/like/{id}               toggle a like
//! POST   /api/posts/comment/{id}            append a comment
//! DELETE /api/posts/{id}                    delete own post
//! GET    /api/posts/countImpressions        seven-day engagement histogram
//! GET    /api/posts/getFollowersFollowing   follower/following counts
//! POST   /api/posts/{post_id}/repost        repost (add-only)
//! GET    /api/posts/getAllReposts/{user_id} posts a user reposted
//! POST   /api/posts/bookmark/{post_id}      toggle a bookmark
//! GET    /api/posts/bookmarks/{user_id}     posts a user bookmarked
//! ```
//!
//! The paths are a compatibility contract with the existing frontend; the
//! handlers translate them onto the driving ports and own every wire shape.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Post, PostDraft, PostId, UserId, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request payload for publishing a post.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatePostRequest {
    /// Post body; optional when an image is supplied.
    pub text: Option<String>,
    /// Image payload handed to the media host; optional when text is present.
    pub img: Option<String>,
}

/// Request payload for commenting on a post.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CommentRequest {
    /// Comment body.
    pub text: Option<String>,
}

/// Confirmation message wrapper.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable action description.
    pub message: String,
}

/// Repost confirmation carrying the updated post.
#[derive(Debug, Serialize)]
pub struct RepostResponse {
    /// Human-readable action description.
    pub message: String,
    /// The updated post.
    pub post: Post,
}

/// Bookmark toggle confirmation carrying the updated reference set.
#[derive(Debug, Serialize)]
pub struct BookmarkResponse {
    /// Human-readable action description.
    pub message: String,
    /// The user's updated bookmark set.
    pub bookmarks: Vec<PostId>,
}

/// One named value of a dashboard chart.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChartPoint {
    /// Bucket label (a calendar date or a series name).
    pub name: String,
    /// Bucket value.
    pub value: usize,
}

/// Impression aggregation payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpressionsData {
    /// Daily buckets, oldest first.
    pub chart_data: Vec<ChartPoint>,
    /// Like events in the window.
    pub total_likes: usize,
    /// Comment events in the window.
    pub total_comments: usize,
    /// Combined events.
    pub total_impressions: usize,
    /// Mean daily impressions over the fixed seven-day window.
    pub average_impressions: f64,
}

/// Envelope for dashboard payloads.
#[derive(Debug, Serialize)]
pub struct DashboardResponse<T> {
    /// Always `true` on the success path.
    pub success: bool,
    /// Wrapped payload.
    pub data: T,
}

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| Error::invalid_request("Invalid user ID"))
}

fn parse_post_id(raw: &str) -> Result<PostId, Error> {
    PostId::new(raw).map_err(|_| Error::invalid_request("Invalid post ID"))
}

/// All posts, newest first.
#[utoipa::path(
    get,
    path = "/api/posts/all",
    tags = ["posts"],
    responses(
        (status = 200, description = "All posts with author projection"),
        (status = 401, description = "No authenticated session")
    )
)]
#[get("/all")]
pub async fn get_all_posts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let posts = state.feed.list_all().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Posts authored by users the viewer follows.
#[utoipa::path(
    get,
    path = "/api/posts/following",
    tags = ["posts"],
    responses(
        (status = 200, description = "Posts from followed authors"),
        (status = 401, description = "No authenticated session"),
        (status = 404, description = "Viewer record is missing")
    )
)]
#[get("/following")]
pub async fn get_following_posts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let viewer = session.require_user_id()?;
    let posts = state.feed.list_following_feed(&viewer).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Posts a user has liked, in like order.
#[utoipa::path(
    get,
    path = "/api/posts/likes/{id}",
    tags = ["posts"],
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Liked posts"),
        (status = 400, description = "Malformed user id"),
        (status = 404, description = "User not found")
    )
)]
#[get("/likes/{id}")]
pub async fn get_liked_posts(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let user = parse_user_id(&path)?;
    let posts = state.feed.list_liked(&user).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Posts authored by the given username.
#[utoipa::path(
    get,
    path = "/api/posts/user/{username}",
    tags = ["posts"],
    params(("username" = String, Path, description = "Author handle")),
    responses(
        (status = 200, description = "Posts by the author"),
        (status = 400, description = "Malformed username"),
        (status = 404, description = "Unknown username")
    )
)]
#[get("/user/{username}")]
pub async fn get_user_posts(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let username =
        Username::new(path.into_inner()).map_err(|err| Error::invalid_request(err.to_string()))?;
    let posts = state.feed.list_by_author(&username).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Publish a new post.
#[utoipa::path(
    post,
    path = "/api/posts/create",
    tags = ["posts"],
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created"),
        (status = 400, description = "Neither text nor image supplied"),
        (status = 401, description = "No authenticated session")
    )
)]
#[post("/create")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePostRequest>,
) -> ApiResult<HttpResponse> {
    let author = session.require_user_id()?;
    let request = payload.into_inner();
    let post = state
        .engagement
        .create_post(
            &author,
            PostDraft {
                text: request.text,
                image: request.img,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// Toggle the session user's like on a post.
#[utoipa::path(
    post,
    path = "/api/posts/like/{id}",
    tags = ["posts"],
    params(("id" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Updated like set"),
        (status = 400, description = "Malformed post id"),
        (status = 404, description = "Post not found")
    )
)]
#[post("/like/{id}")]
pub async fn like_unlike_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let post = parse_post_id(&path)?;
    let likes = state.engagement.toggle_like(&actor, &post).await?;
    Ok(HttpResponse::Ok().json(likes))
}

/// Append a comment to a post.
#[utoipa::path(
    post,
    path = "/api/posts/comment/{id}",
    tags = ["posts"],
    params(("id" = String, Path, description = "Post identifier")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Updated post"),
        (status = 400, description = "Missing comment text"),
        (status = 404, description = "Post not found")
    )
)]
#[post("/comment/{id}")]
pub async fn comment_on_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let post = parse_post_id(&path)?;
    let text = payload
        .into_inner()
        .text
        .ok_or_else(|| Error::invalid_request("Text field is required"))?;
    let updated = state.engagement.add_comment(&actor, &post, &text).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Delete a post; only its author may do this.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tags = ["posts"],
    params(("id" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Not the post's author"),
        (status = 404, description = "Post not found")
    )
)]
#[delete("/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let post = parse_post_id(&path)?;
    state.engagement.delete_post(&actor, &post).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Post deleted successfully".to_owned(),
    }))
}

/// Seven-day like+comment histogram for the session user's recent posts.
#[utoipa::path(
    get,
    path = "/api/posts/countImpressions",
    tags = ["dashboard"],
    responses(
        (status = 200, description = "Daily impression buckets plus totals"),
        (status = 401, description = "No authenticated session")
    )
)]
#[get("/countImpressions")]
pub async fn count_post_impressions(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let author = session.require_user_id()?;
    let summary = state.impressions.count_impressions(&author).await?;
    let chart_data = summary
        .daily
        .iter()
        .map(|bucket| ChartPoint {
            name: bucket.date.format("%Y-%m-%d").to_string(),
            value: bucket.count,
        })
        .collect();
    Ok(HttpResponse::Ok().json(DashboardResponse {
        success: true,
        data: ImpressionsData {
            chart_data,
            total_likes: summary.total_likes,
            total_comments: summary.total_comments,
            total_impressions: summary.total_impressions(),
            average_impressions: summary.average_impressions(),
        },
    }))
}

/// Follower and following counts for the session user.
#[utoipa::path(
    get,
    path = "/api/posts/getFollowersFollowing",
    tags = ["dashboard"],
    responses(
        (status = 200, description = "Ordered follower/following pair"),
        (status = 401, description = "No authenticated session"),
        (status = 404, description = "User record is missing")
    )
)]
#[get("/getFollowersFollowing")]
pub async fn count_followers_following(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    let counts = state.social.follower_following_counts(&user).await?;
    Ok(HttpResponse::Ok().json(DashboardResponse {
        success: true,
        data: vec![
            ChartPoint {
                name: "Followers".to_owned(),
                value: counts.followers,
            },
            ChartPoint {
                name: "Following".to_owned(),
                value: counts.following,
            },
        ],
    }))
}

/// Record a repost of the given post.
#[utoipa::path(
    post,
    path = "/api/posts/{post_id}/repost",
    tags = ["posts"],
    params(("post_id" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Repost recorded"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Already reposted")
    )
)]
#[post("/{post_id}/repost")]
pub async fn repost_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let post = parse_post_id(&path)?;
    let updated = state.engagement.repost(&actor, &post).await?;
    Ok(HttpResponse::Ok().json(RepostResponse {
        message: "Post reposted successfully".to_owned(),
        post: updated,
    }))
}

/// Posts the given user has reposted.
#[utoipa::path(
    get,
    path = "/api/posts/getAllReposts/{user_id}",
    tags = ["posts"],
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Reposted posts with author cards"),
        (status = 400, description = "Malformed user id")
    )
)]
#[get("/getAllReposts/{user_id}")]
pub async fn get_all_reposts(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let user = parse_user_id(&path)?;
    let posts = state.feed.list_reposted(&user).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Toggle a bookmark on the given post for the session user.
#[utoipa::path(
    post,
    path = "/api/posts/bookmark/{post_id}",
    tags = ["posts"],
    params(("post_id" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Bookmark toggled"),
        (status = 404, description = "Post or user not found")
    )
)]
#[post("/bookmark/{post_id}")]
pub async fn bookmark_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let post = parse_post_id(&path)?;
    let outcome = state.engagement.toggle_bookmark(&actor, &post).await?;
    let message = if outcome.added {
        "Post bookmarked successfully"
    } else {
        "Post removed from bookmarks"
    };
    Ok(HttpResponse::Ok().json(BookmarkResponse {
        message: message.to_owned(),
        bookmarks: outcome.bookmarks,
    }))
}

/// Posts the given user has bookmarked.
#[utoipa::path(
    get,
    path = "/api/posts/bookmarks/{user_id}",
    tags = ["posts"],
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Bookmarked posts with author cards"),
        (status = 400, description = "Malformed user id"),
        (status = 404, description = "User not found")
    )
)]
#[get("/bookmarks/{user_id}")]
pub async fn get_bookmarked_posts(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let user = parse_user_id(&path)?;
    let posts = state.feed.list_bookmarked(&user).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Register every post handler under the caller's scope.
pub fn configure(config: &mut web::ServiceConfig) {
    config
        .service(get_all_posts)
        .service(get_following_posts)
        .service(get_liked_posts)
        .service(get_user_posts)
        .service(create_post)
        .service(like_unlike_post)
        .service(comment_on_post)
        .service(count_post_impressions)
        .service(count_followers_following)
        .service(get_all_reposts)
        .service(bookmark_post)
        .service(get_bookmarked_posts)
        .service(repost_post)
        .service(delete_post);
}
