#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use yamdb_api::auth::confirmation::ConfirmationConfig;
use yamdb_api::auth::jwt::{generate_access_token, JwtConfig};
use yamdb_api::config::ServerConfig;
use yamdb_api::router::build_app_router;
use yamdb_api::state::AppState;
use yamdb_core::confirmation::DEFAULT_CODE_TTL_SECS;
use yamdb_core::pagination::DEFAULT_PAGE_SIZE;
use yamdb_core::roles::Role;
use yamdb_db::models::category::{Category, CreateCategory};
use yamdb_db::models::genre::{CreateGenre, Genre};
use yamdb_db::models::title::{CreateTitle, TitleWithRelations};
use yamdb_db::models::user::{CreateUser, User};
use yamdb_db::repositories::{CategoryRepo, GenreRepo, TitleRepo, UserRepo};
use yamdb_mail::MemoryMailer;

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with fixed secrets and the default page size.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        page_size: DEFAULT_PAGE_SIZE,
        jwt: JwtConfig {
            secret: "test-jwt-secret".to_string(),
            access_token_expiry_mins: 60,
        },
        confirmation: ConfirmationConfig {
            secret: "test-confirmation-secret".to_string(),
            code_ttl_secs: DEFAULT_CODE_TTL_SECS,
        },
        bootstrap_admin: None,
    }
}

/// Build the full application router over `pool`, delivering mail into an
/// in-memory outbox that is discarded.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with_mailer(pool, Arc::new(MemoryMailer::new()))
}

/// Build the full application router over `pool` with the given outbox, so
/// the test can read the confirmation codes that were sent.
pub fn build_test_app_with_mailer(pool: SqlitePool, mailer: Arc<MemoryMailer>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        mailer,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Send one request through the router.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with `role` and email `<username>@example.com`.
pub async fn create_user(pool: &SqlitePool, username: &str, role: Role) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            role,
            ..CreateUser::default()
        },
        Utc::now(),
    )
    .await
    .expect("user creation should succeed")
}

/// An access token for `user` signed with the test secret.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, user.role(), &test_config().jwt)
        .expect("token generation should succeed")
}

/// Insert a user with `role` and return a token for it.
pub async fn user_with_token(pool: &SqlitePool, username: &str, role: Role) -> (User, String) {
    let user = create_user(pool, username, role).await;
    let token = token_for(&user);
    (user, token)
}

pub async fn create_category(pool: &SqlitePool, name: &str, slug: &str) -> Category {
    CategoryRepo::create(
        pool,
        &CreateCategory {
            name: name.to_string(),
            slug: slug.to_string(),
        },
    )
    .await
    .expect("category creation should succeed")
}

pub async fn create_genre(pool: &SqlitePool, name: &str, slug: &str) -> Genre {
    GenreRepo::create(
        pool,
        &CreateGenre {
            name: name.to_string(),
            slug: slug.to_string(),
        },
    )
    .await
    .expect("genre creation should succeed")
}

/// Insert a title with no category or genres.
pub async fn create_title(pool: &SqlitePool, name: &str, year: i32) -> TitleWithRelations {
    TitleRepo::create(
        pool,
        &CreateTitle {
            name: name.to_string(),
            year,
            description: String::new(),
            category_id: None,
            genre_ids: vec![],
        },
    )
    .await
    .expect("title creation should succeed")
}
