//! JWT-based authentication extractors for Axum handlers.
//!
//! The token only identifies the user; the user row is reloaded on every
//! request so role changes and deletions take effect immediately.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use yamdb_core::error::CoreError;
use yamdb_core::permissions::{Actor, Principal};
use yamdb_db::models::user::User;
use yamdb_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user.id, role = %auth.user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

impl AuthUser {
    pub fn principal(&self) -> Principal {
        self.user.principal()
    }

    pub fn actor(&self) -> Actor {
        Actor::User(self.principal())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Authentication credentials were not provided".into(),
            ))
        })?;
        authenticate(token, state).await
    }
}

/// Like [`AuthUser`], but a request without an `Authorization` header is
/// anonymous instead of rejected. A header that is present but invalid is
/// still a 401.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthUser>);

impl OptionalAuth {
    pub fn actor(&self) -> Actor {
        self.0.as_ref().map_or(Actor::Anonymous, AuthUser::actor)
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(OptionalAuth(Some(authenticate(token, state).await?))),
            None => Ok(OptionalAuth(None)),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The bearer token, `None` if there is no `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

    Ok(Some(token))
}

async fn authenticate(token: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let claims = validate_token(token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User not found".into())))?;

    Ok(AuthUser { user })
}
