//! Handlers for the `/auth` resource (passwordless sign-up and token issuance).
//!
//! Sign-up emails a stateless confirmation code; exchanging that code for a
//! JWT is the only way to log in.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::users::{validate_email, validate_username};
use yamdb_db::models::user::{CreateUser, User};
use yamdb_db::repositories::UserRepo;

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::users::check_unique_identity;
use crate::middleware::auth::OptionalAuth;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Response body for `POST /auth/signup`.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub confirmation_code: String,
}

/// Response body for `POST /auth/token`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// If the exact (username, email) pair is already registered, a fresh code is
/// emailed. Otherwise the pair is validated, the user is created, and a code
/// is emailed. If the email cannot be sent the new user is removed again.
///
/// The insert is committed before delivery so no write lock is held while
/// the mail server is slow.
pub async fn signup(
    State(state): State<AppState>,
    _auth: OptionalAuth,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<Json<SignupResponse>> {
    let now = Utc::now();

    if let Some(user) =
        UserRepo::find_by_username_and_email(&state.pool, &input.username, &input.email).await?
    {
        send_code(&state, &user).await?;
        tracing::info!(user_id = user.id, "Confirmation code re-sent");
        return Ok(Json(SignupResponse {
            username: user.username,
            email: user.email,
        }));
    }

    let mut errors = FieldErrors::new();
    validate_username(&input.username, &mut errors);
    validate_email(&input.email, &mut errors);
    check_unique_identity(
        &state.pool,
        Some(&input.username),
        Some(&input.email),
        None,
        &mut errors,
    )
    .await?;
    errors.into_result()?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            ..CreateUser::default()
        },
        now,
    )
    .await?;

    if let Err(err) = send_code(&state, &user).await {
        UserRepo::delete(&state.pool, user.id).await?;
        tracing::warn!(
            user_id = user.id,
            error = %err,
            "Confirmation code not delivered, sign-up discarded"
        );
        return Err(err);
    }

    tracing::info!(user_id = user.id, username = %user.username, "User signed up");

    Ok(Json(SignupResponse {
        username: user.username,
        email: user.email,
    }))
}

/// POST /api/v1/auth/token
///
/// Exchange a confirmation code for an access token. The code stays valid
/// until it expires.
pub async fn token(
    State(state): State<AppState>,
    _auth: OptionalAuth,
    AppJson(input): AppJson<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let mut errors = FieldErrors::new();
    if input.username.is_empty() {
        errors.add("username", "This field may not be blank.");
    }
    if input.confirmation_code.is_empty() {
        errors.add("confirmation_code", "This field may not be blank.");
    }
    errors.into_result()?;

    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &input.username))?;

    let codes = state.config.confirmation.codes();
    if !codes.verify(&input.confirmation_code, user.id, &user.email, Utc::now()) {
        return Err(FieldErrors::single(
            "confirmation_code",
            "Invalid or expired confirmation code.",
        )
        .into());
    }

    let token = generate_access_token(user.id, user.role(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "Access token issued");

    Ok(Json(TokenResponse { token }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn send_code(state: &AppState, user: &User) -> AppResult<()> {
    let code = state
        .config
        .confirmation
        .codes()
        .issue(user.id, &user.email, Utc::now());
    state
        .mailer
        .send_confirmation_code(&user.email, &user.username, &code)
        .await?;
    Ok(())
}
