//! End-to-end HTTP tests: real services and handlers over in-memory stores.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, get, test, web};
use serde_json::{Value, json};

use backend::domain::{
    EngagementService, Error, FeedService, ImpressionService, SocialGraphService, UserId,
};
use backend::inbound::http::posts;
use backend::inbound::http::session::SessionContext;
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::test_support::{TestWorld, fixed_clock};

fn state(world: &TestWorld) -> HttpState {
    HttpState::new(HttpStatePorts {
        feed: Arc::new(FeedService::new(world.posts.clone(), world.users.clone())),
        engagement: Arc::new(EngagementService::new(
            world.posts.clone(),
            world.users.clone(),
            world.outbox.clone(),
            world.media.clone(),
            fixed_clock(),
        )),
        impressions: Arc::new(ImpressionService::new(
            world.posts.clone(),
            world.users.clone(),
            fixed_clock(),
        )),
        social: Arc::new(SocialGraphService::new(world.users.clone())),
    })
}

/// Test-only login route standing in for the external auth collaborator.
#[get("/login/{id}")]
async fn login(
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let id = UserId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(&id)?;
    Ok(HttpResponse::Ok().finish())
}

macro_rules! test_app {
    ($world:expr) => {{
        test::init_service(
            App::new()
                .app_data(web::Data::new(state($world)))
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_name("session".to_owned())
                        .cookie_secure(false)
                        .build(),
                )
                .service(login)
                .service(web::scope("/api/posts").configure(posts::configure)),
        )
        .await
    }};
}

async fn login_as(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    user: UserId,
) -> actix_web::cookie::Cookie<'static> {
    let res = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!("/login/{user}"))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

#[actix_web::test]
async fn feed_requires_a_session() {
    let world = TestWorld::new();
    let app = test_app!(&world);

    let res =
        test::call_service(&app, test::TestRequest::get().uri("/api/posts/all").to_request())
            .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("code"), Some(&json!("unauthorized")));
}

#[actix_web::test]
async fn like_round_trip_over_http() {
    let mut world = TestWorld::new();
    let author = world.add_user("author");
    let reader = world.add_user("reader");
    let post = world.add_post(author, "hello");
    let app = test_app!(&world);
    let cookie = login_as(&app, reader).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/posts/like/{post}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let likes: Value = test::read_body_json(res).await;
    assert_eq!(likes, json!([reader.to_string()]));

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/posts/like/{post}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let likes: Value = test::read_body_json(res).await;
    assert_eq!(likes, json!([]));
    assert!(world.user(reader).liked_posts.is_empty());
}

#[actix_web::test]
async fn feed_projects_authors_without_credentials() {
    let mut world = TestWorld::new();
    let author = world.add_user("ada");
    world.add_post(author, "hello");
    let app = test_app!(&world);
    let cookie = login_as(&app, author).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/posts/all")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let posted = body.get(0).expect("one post");
    assert_eq!(
        posted.pointer("/user/username").and_then(Value::as_str),
        Some("ada")
    );
    assert!(posted.pointer("/user/password").is_none());
    assert!(posted.pointer("/user/passwordHash").is_none());
}

#[actix_web::test]
async fn duplicate_repost_conflicts() {
    let mut world = TestWorld::new();
    let author = world.add_user("author");
    let reader = world.add_user("reader");
    let post = world.add_post(author, "hello");
    let app = test_app!(&world);
    let cookie = login_as(&app, reader).await;

    let uri = format!("/api/posts/{post}/repost");
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::post().uri(&uri).cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("code"), Some(&json!("conflict")));
    assert_eq!(world.post(post).reposts.len(), 1);
}

#[actix_web::test]
async fn bookmark_toggle_and_listing() {
    let mut world = TestWorld::new();
    let author = world.add_user("author");
    let reader = world.add_user("reader");
    let post = world.add_post(author, "keep this");
    let app = test_app!(&world);
    let cookie = login_as(&app, reader).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/posts/bookmark/{post}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body.get("message"),
        Some(&json!("Post bookmarked successfully"))
    );

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/posts/bookmarks/{reader}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let listing: Value = test::read_body_json(res).await;
    let card = listing.pointer("/0/user").expect("author card");
    assert_eq!(card.get("username"), Some(&json!("author")));
    assert!(card.get("id").is_none(), "card carries no identifier");

    // Second toggle removes the bookmark again.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/posts/bookmark/{post}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body.get("message"),
        Some(&json!("Post removed from bookmarks"))
    );

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/posts/bookmarks/{reader}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let listing: Value = test::read_body_json(res).await;
    assert_eq!(listing, json!([]));
}

#[actix_web::test]
async fn malformed_bookmark_user_id_is_rejected_first() {
    let mut world = TestWorld::new();
    let reader = world.add_user("reader");
    let app = test_app!(&world);
    let cookie = login_as(&app, reader).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/posts/bookmarks/not-an-id")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("message"), Some(&json!("Invalid user ID")));
}

#[actix_web::test]
async fn impressions_histogram_counts_window_engagement() {
    let mut world = TestWorld::new();
    let author = world.add_user("author");
    let reader = world.add_user("reader");
    let post = world.add_post(author, "hello");
    world.like(reader, post);
    world.comment_at(
        post,
        reader,
        "nice",
        chrono::DateTime::UNIX_EPOCH + chrono::Duration::seconds(30),
    );
    let app = test_app!(&world);
    let cookie = login_as(&app, author).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/posts/countImpressions")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("success"), Some(&json!(true)));
    assert_eq!(body.pointer("/data/totalLikes"), Some(&json!(1)));
    assert_eq!(body.pointer("/data/totalComments"), Some(&json!(1)));
    assert_eq!(body.pointer("/data/totalImpressions"), Some(&json!(2)));

    let chart = body
        .pointer("/data/chartData")
        .and_then(Value::as_array)
        .expect("chart data");
    assert_eq!(chart.len(), 7);
    let bucket_sum: u64 = chart
        .iter()
        .filter_map(|point| point.get("value").and_then(Value::as_u64))
        .sum();
    assert_eq!(bucket_sum, 2);
    // Both events land on the epoch date, the newest bucket.
    assert_eq!(chart[6].get("name"), Some(&json!("1970-01-01")));
    assert_eq!(chart[6].get("value"), Some(&json!(2)));

    let average = body
        .pointer("/data/averageImpressions")
        .and_then(Value::as_f64)
        .expect("average");
    assert_eq!(average, 2.0 / 7.0);
}

#[actix_web::test]
async fn follower_counts_are_an_ordered_pair() {
    let mut world = TestWorld::new();
    let user = world.add_user("user");
    let fan = world.add_user("fan");
    world.follow(fan, user);
    let app = test_app!(&world);
    let cookie = login_as(&app, user).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/posts/getFollowersFollowing")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body.get("data"),
        Some(&json!([
            { "name": "Followers", "value": 1 },
            { "name": "Following", "value": 0 }
        ]))
    );
}

#[actix_web::test]
async fn delete_is_owner_only_over_http() {
    let mut world = TestWorld::new();
    let author = world.add_user("author");
    let intruder = world.add_user("intruder");
    let post = world.add_post(author, "mine");
    let app = test_app!(&world);

    let intruder_cookie = login_as(&app, intruder).await;
    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/posts/{post}"))
            .cookie(intruder_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let author_cookie = login_as(&app, author).await;
    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/posts/{post}"))
            .cookie(author_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(world.find_post(post).is_none());
}

#[actix_web::test]
async fn comment_flow_appends_and_returns_the_post() {
    let mut world = TestWorld::new();
    let author = world.add_user("author");
    let reader = world.add_user("reader");
    let post = world.add_post(author, "hello");
    let app = test_app!(&world);
    let cookie = login_as(&app, reader).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/posts/comment/{post}"))
            .cookie(cookie)
            .set_json(json!({ "text": "first!" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body.pointer("/comments/0/text"),
        Some(&json!("first!"))
    );
    assert_eq!(
        body.pointer("/comments/0/user"),
        Some(&json!(reader.to_string()))
    );
}
