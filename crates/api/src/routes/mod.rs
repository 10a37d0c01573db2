pub mod auth;
pub mod catalog;
pub mod health;
pub mod titles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                     register / resend code (public)
/// /auth/token                                      exchange code for JWT (public)
///
/// /users                                           list, create (admin only)
/// /users/me                                        get, update own profile
/// /users/{username}                                get, update, delete (admin only)
///
/// /categories                                      list, create
/// /categories/{slug}                               delete
/// /genres                                          list, create
/// /genres/{slug}                                   delete
///
/// /titles                                          list (filtered), create
/// /titles/{id}                                     get, update, delete
/// /titles/{id}/reviews                             list, create
/// /titles/{id}/reviews/{id}                        get, update, delete
/// /titles/{id}/reviews/{id}/comments               list, create
/// /titles/{id}/reviews/{id}/comments/{id}          get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Sign-up and token exchange.
        .nest("/auth", auth::router())
        // User management and own profile.
        .nest("/users", users::router())
        // Catalog taxonomy.
        .nest("/categories", catalog::categories_router())
        .nest("/genres", catalog::genres_router())
        // Titles with nested reviews and comments.
        .nest("/titles", titles::router())
}
