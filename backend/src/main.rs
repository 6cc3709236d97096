//! Backend entry-point: wires REST endpoints, persistence, and OpenAPI docs.

use std::env;
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpServer, web};
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use mockable::DefaultClock;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::ports::{
    FixtureEngagementCommand, FixtureFeedQuery, FixtureImpressionsQuery, FixtureSocialGraphQuery,
};
use backend::domain::{EngagementService, FeedService, ImpressionService, SocialGraphService};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::posts;
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::media::PassthroughMediaStore;
use backend::outbound::persistence::{
    DbPool, DieselNotificationOutbox, DieselPostStore, DieselUserStore, PoolConfig,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let key = load_session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());

    let pool = match env::var("DATABASE_URL") {
        Ok(url) => {
            run_pending_migrations(url.clone()).await?;
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(std::io::Error::other)?;
            info!("persistence adapters attached");
            Some(pool)
        }
        Err(_) => {
            warn!("DATABASE_URL not set; serving fixture data only");
            None
        }
    };

    let state = build_state(pool);
    let health_state = web::Data::new(HealthState::new());
    // Clone for server factory so readiness probe remains accessible.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".into())
            .cookie_path("/".into())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .build();

        let app = App::new()
            .app_data(server_health_state.clone())
            .app_data(web::Data::new(state.clone()))
            .service(
                web::scope("/api/posts")
                    .wrap(session)
                    .configure(posts::configure),
            )
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app.wrap(Trace)
    })
    .bind(bind_addr)?;

    health_state.mark_ready();
    server.run().await
}

/// Read the session key from disk, generating an ephemeral one in dev builds.
fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

/// Apply pending migrations over a blocking wrapper around the async
/// connection.
async fn run_pending_migrations(database_url: String) -> std::io::Result<()> {
    tokio::task::spawn_blocking(move || {
        use diesel::Connection;
        use diesel_async::AsyncPgConnection;
        use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
        use diesel_migrations::MigrationHarness;

        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&database_url)
            .map_err(|e| std::io::Error::other(format!("database connection failed: {e}")))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))
    })
    .await
    .map_err(|e| std::io::Error::other(format!("migration task failed: {e}")))?
}

/// Wire the driving ports: database-backed services when a pool is available,
/// canned fixtures otherwise (useful for smoke tests and local UI work).
fn build_state(pool: Option<DbPool>) -> HttpState {
    match pool {
        Some(pool) => {
            let post_store = Arc::new(DieselPostStore::new(pool.clone()));
            let user_store = Arc::new(DieselUserStore::new(pool.clone()));
            let outbox = Arc::new(DieselNotificationOutbox::new(pool));
            let media = Arc::new(PassthroughMediaStore);
            let clock = Arc::new(DefaultClock);

            HttpState::new(HttpStatePorts {
                feed: Arc::new(FeedService::new(post_store.clone(), user_store.clone())),
                engagement: Arc::new(EngagementService::new(
                    post_store.clone(),
                    user_store.clone(),
                    outbox,
                    media,
                    clock.clone(),
                )),
                impressions: Arc::new(ImpressionService::new(post_store, user_store.clone(), clock)),
                social: Arc::new(SocialGraphService::new(user_store)),
            })
        }
        None => HttpState::new(HttpStatePorts {
            feed: Arc::new(FixtureFeedQuery),
            engagement: Arc::new(FixtureEngagementCommand),
            impressions: Arc::new(FixtureImpressionsQuery),
            social: Arc::new(FixtureSocialGraphQuery),
        }),
    }
}

