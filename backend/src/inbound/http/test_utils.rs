//! Helpers shared by handler tests.

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::Key;
use actix_web::{HttpResponse, get, web};
use uuid::Uuid;

use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;

/// Cookie session middleware with an ephemeral key for tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Test-only login route persisting the given user id into the session.
#[get("/test-login/{id}")]
pub async fn test_login(
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let id = UserId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(&id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Log the nil fixture user in and return the session cookie.
pub async fn login_cookie(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
) -> actix_web::cookie::Cookie<'static> {
    login_cookie_for(app, UserId::from_uuid(Uuid::nil())).await
}

/// Log the given user in and return the session cookie.
pub async fn login_cookie_for(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    user: UserId,
) -> actix_web::cookie::Cookie<'static> {
    let request = actix_web::test::TestRequest::get()
        .uri(&format!("/test-login/{user}"))
        .to_request();
    let response = actix_web::test::call_service(app, request).await;
    assert!(response.status().is_success());
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
