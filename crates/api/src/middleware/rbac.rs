//! Role-based access control (RBAC) extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use yamdb_core::permissions::{authorize, policies};

use super::access_for;
use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires an admin (role `admin` or superuser). Rejects with 401 when
/// unauthenticated and 403 otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     // admin is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize(
            &policies::admin_only(),
            &user.actor(),
            access_for(&parts.method),
            None,
        )?;
        Ok(RequireAdmin(user))
    }
}
