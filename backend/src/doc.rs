//! OpenAPI document assembly.

use utoipa::OpenApi;

use crate::inbound::http::{health, posts, schemas};

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Social engagement backend",
        description = "Posts, engagement mutators, and dashboard aggregations."
    ),
    paths(
        health::live,
        health::ready,
        posts::get_all_posts,
        posts::get_following_posts,
        posts::get_liked_posts,
        posts::get_user_posts,
        posts::create_post,
        posts::like_unlike_post,
        posts::comment_on_post,
        posts::delete_post,
        posts::count_post_impressions,
        posts::count_followers_following,
        posts::repost_post,
        posts::get_all_reposts,
        posts::bookmark_post,
        posts::get_bookmarked_posts,
    ),
    components(schemas(
        schemas::ErrorSchema,
        schemas::ErrorCodeSchema,
        posts::CreatePostRequest,
        posts::CommentRequest,
        posts::MessageResponse,
        posts::ChartPoint,
    )),
    tags(
        (name = "posts", description = "Post queries and engagement mutators"),
        (name = "dashboard", description = "Aggregated engagement views"),
        (name = "health", description = "Orchestration probes"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/posts/all",
            "/api/posts/following",
            "/api/posts/likes/{id}",
            "/api/posts/user/{username}",
            "/api/posts/create",
            "/api/posts/like/{id}",
            "/api/posts/comment/{id}",
            "/api/posts/{id}",
            "/api/posts/countImpressions",
            "/api/posts/getFollowersFollowing",
            "/api/posts/{post_id}/repost",
            "/api/posts/getAllReposts/{user_id}",
            "/api/posts/bookmark/{post_id}",
            "/api/posts/bookmarks/{user_id}",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
