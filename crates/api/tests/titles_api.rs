//! HTTP-level integration tests for `/titles`: writes with slug relations,
//! validation, filters, and the computed rating.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get, patch_json_auth, post_json, post_json_auth};
use serde_json::json;
use sqlx::SqlitePool;
use yamdb_core::roles::Role;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seed categories `films`/`books` and genres `drama`/`crime`/`comedy`, and
/// return an admin token.
async fn seed(pool: &SqlitePool) -> String {
    common::create_category(pool, "Films", "films").await;
    common::create_category(pool, "Books", "books").await;
    common::create_genre(pool, "Drama", "drama").await;
    common::create_genre(pool, "Crime", "crime").await;
    common::create_genre(pool, "Comedy", "comedy").await;
    let (_, token) = common::user_with_token(pool, "boss", Role::Admin).await;
    token
}

async fn create(app: axum::Router, token: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(app, "/api/v1/titles", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

fn names(page: &serde_json::Value) -> Vec<&str> {
    page["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Writes take slugs and respond with the nested read shape.
#[sqlx::test(migrations = "../../db/migrations")]
async fn create_title_returns_read_shape(pool: SqlitePool) {
    let token = seed(&pool).await;
    let app = common::build_test_app(pool);

    let json = create(
        app,
        &token,
        json!({
            "name": "Heat",
            "year": 1995,
            "description": "Cops and robbers.",
            "genre": ["drama", "crime"],
            "category": "films",
        }),
    )
    .await;

    assert!(json["id"].is_i64());
    assert_eq!(json["name"], "Heat");
    assert_eq!(json["year"], 1995);
    assert!(json["rating"].is_null());
    assert_eq!(json["description"], "Cops and robbers.");
    assert_eq!(
        json["genre"],
        json!([{ "name": "Drama", "slug": "drama" }, { "name": "Crime", "slug": "crime" }])
    );
    assert_eq!(json["category"], json!({ "name": "Films", "slug": "films" }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_admins_create_titles(pool: SqlitePool) {
    let _ = seed(&pool).await;
    let (_, user_token) = common::user_with_token(&pool, "reader", Role::User).await;
    let app = common::build_test_app(pool);
    let body = json!({ "name": "Heat", "year": 1995, "genre": [] });

    let response = post_json(app.clone(), "/api/v1/titles", body.clone()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json_auth(app, "/api/v1/titles", body, &user_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn year_after_current_is_rejected(pool: SqlitePool) {
    let token = seed(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/titles",
        json!({ "name": "Sequel", "year": 9999, "genre": [] }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["year"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_slugs_are_field_errors(pool: SqlitePool) {
    let token = seed(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/titles",
        json!({ "name": "Heat", "year": 1995, "genre": ["drama", "western"], "category": "games" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["fields"]["genre"],
        json!(["Object with slug=western does not exist."])
    );
    assert_eq!(
        json["fields"]["category"],
        json!(["Object with slug=games does not exist."])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn name_and_year_are_required(pool: SqlitePool) {
    let token = seed(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/v1/titles", json!({ "genre": [] }), &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["name"].is_array());
    assert!(json["fields"]["year"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mistyped_body_is_400(pool: SqlitePool) {
    let token = seed(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/titles",
        json!({ "name": "Heat", "year": "nineteen ninety-five" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Read, filter
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_combine(pool: SqlitePool) {
    let token = seed(&pool).await;
    let app = common::build_test_app(pool);

    create(
        app.clone(),
        &token,
        json!({ "name": "Heat", "year": 1995, "genre": ["crime", "drama"], "category": "films" }),
    )
    .await;
    create(
        app.clone(),
        &token,
        json!({ "name": "Heat Wave", "year": 2012, "genre": ["comedy"], "category": "books" }),
    )
    .await;
    create(
        app.clone(),
        &token,
        json!({ "name": "Ronin", "year": 1998, "genre": ["crime"], "category": "films" }),
    )
    .await;

    let page = body_json(get(app.clone(), "/api/v1/titles").await).await;
    assert_eq!(page["count"], 3);

    let page = body_json(get(app.clone(), "/api/v1/titles?name=heat").await).await;
    assert_eq!(names(&page), ["Heat", "Heat Wave"]);

    let page = body_json(get(app.clone(), "/api/v1/titles?genre=crim").await).await;
    assert_eq!(names(&page), ["Heat", "Ronin"]);

    let page = body_json(get(app.clone(), "/api/v1/titles?category=books").await).await;
    assert_eq!(names(&page), ["Heat Wave"]);

    let page = body_json(get(app.clone(), "/api/v1/titles?year=1998").await).await;
    assert_eq!(names(&page), ["Ronin"]);

    let page = body_json(get(app, "/api/v1/titles?name=heat&category=films&year=1995").await).await;
    assert_eq!(names(&page), ["Heat"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn name_filter_folds_non_ascii_case(pool: SqlitePool) {
    common::create_title(&pool, "Война и мир", 1869).await;
    common::create_title(&pool, "Heat", 1995).await;
    let app = common::build_test_app(pool);

    let lower = "/api/v1/titles?name=%D0%B2%D0%BE%D0%B9%D0%BD%D0%B0"; // война
    let page = body_json(get(app.clone(), lower).await).await;
    assert_eq!(names(&page), ["Война и мир"]);

    let upper = "/api/v1/titles?name=%D0%92%D0%9E%D0%99%D0%9D%D0%90"; // ВОЙНА
    let page = body_json(get(app, upper).await).await;
    assert_eq!(names(&page), ["Война и мир"]);
}

/// Empty filter values are ignored rather than rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_filters_match_everything(pool: SqlitePool) {
    common::create_title(&pool, "Heat", 1995).await;
    common::create_title(&pool, "Ronin", 1998).await;
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/titles?year=&name=&genre=&category=").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["count"], 2);

    let response = get(app, "/api/v1/titles?year=recent").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_or_malformed_id_is_404(pool: SqlitePool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/titles/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, "/api/v1/titles/abc").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Rating is the mean review score, `null` without reviews.
#[sqlx::test(migrations = "../../db/migrations")]
async fn rating_is_mean_of_scores(pool: SqlitePool) {
    let token = seed(&pool).await;
    let (_, first) = common::user_with_token(&pool, "first", Role::User).await;
    let (_, second) = common::user_with_token(&pool, "second", Role::User).await;
    let app = common::build_test_app(pool);

    let title = create(
        app.clone(),
        &token,
        json!({ "name": "Heat", "year": 1995, "genre": [] }),
    )
    .await;
    let id = title["id"].as_i64().unwrap();
    let reviews = format!("/api/v1/titles/{id}/reviews");

    post_json_auth(app.clone(), &reviews, json!({ "text": "Good", "score": 4 }), &first).await;
    post_json_auth(app.clone(), &reviews, json!({ "text": "Great", "score": 7 }), &second).await;

    let json = body_json(get(app, &format!("/api/v1/titles/{id}")).await).await;
    assert_eq!(json["rating"], 5.5);
}

// ---------------------------------------------------------------------------
// Update, delete
// ---------------------------------------------------------------------------

/// A PATCH changes only the given fields; a genre list replaces all genres.
#[sqlx::test(migrations = "../../db/migrations")]
async fn patch_updates_given_fields(pool: SqlitePool) {
    let token = seed(&pool).await;
    let app = common::build_test_app(pool);

    let title = create(
        app.clone(),
        &token,
        json!({ "name": "Heat", "year": 1995, "genre": ["crime", "drama"], "category": "films" }),
    )
    .await;
    let uri = format!("/api/v1/titles/{}", title["id"]);

    let response =
        patch_json_auth(app.clone(), &uri, json!({ "name": "Heat (1995)" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Heat (1995)");
    assert_eq!(json["year"], 1995);
    assert_eq!(json["genre"].as_array().unwrap().len(), 2);
    assert_eq!(json["category"]["slug"], "films");

    let response = patch_json_auth(
        app,
        &uri,
        json!({ "genre": ["comedy"], "category": "books" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["genre"], json!([{ "name": "Comedy", "slug": "comedy" }]));
    assert_eq!(json["category"]["slug"], "books");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn patch_validates_and_authorizes(pool: SqlitePool) {
    let token = seed(&pool).await;
    let (_, moderator) = common::user_with_token(&pool, "mod", Role::Moderator).await;
    let app = common::build_test_app(pool);

    let title = create(
        app.clone(),
        &token,
        json!({ "name": "Heat", "year": 1995, "genre": [] }),
    )
    .await;
    let uri = format!("/api/v1/titles/{}", title["id"]);

    let response = patch_json_auth(app.clone(), &uri, json!({ "name": "X" }), &moderator).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(app.clone(), &uri, json!({ "year": 9999 }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json_auth(app, "/api/v1/titles/999", json!({ "name": "X" }), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_title_removes_it(pool: SqlitePool) {
    let token = seed(&pool).await;
    let app = common::build_test_app(pool);

    let title = create(
        app.clone(),
        &token,
        json!({ "name": "Heat", "year": 1995, "genre": [] }),
    )
    .await;
    let uri = format!("/api/v1/titles/{}", title["id"]);

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
