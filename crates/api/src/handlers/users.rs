//! Handlers for the `/users` resource.
//!
//! `/users/me` is open to any authenticated user for their own profile (the
//! role is read-only there). Everything else requires an admin via
//! [`RequireAdmin`].

use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::roles::Role;
use yamdb_core::types::DbId;
use yamdb_core::users::{parse_role, validate_email, validate_person_name, validate_username};
use yamdb_db::models::user::{CreateUser, UpdateUser, UserListParams, UserResponse};
use yamdb_db::repositories::UserRepo;
use yamdb_db::DbPool;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PageParams;
use crate::response::Paginated;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    pub role: Option<String>,
}

/// Request body for `PATCH /users/{username}` and `PATCH /users/me`.
///
/// `role` is ignored on `/users/me`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

// ---------------------------------------------------------------------------
// Self-service
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(auth: AuthUser) -> AppResult<Json<UserResponse>> {
    Ok(Json(auth.user.into()))
}

/// PATCH /api/v1/users/me
///
/// Update the caller's own profile. A `role` in the body is silently ignored.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(mut input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    input.role = None;
    let update = validate_update(&state.pool, &input, auth.user.id).await?;

    let user = UserRepo::update(&state.pool, auth.user.id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user.id))?;

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(user.into()))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/users
///
/// Paginated user list, optionally filtered by `?search=` on the username.
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    AppQuery(params): AppQuery<UserListParams>,
    AppQuery(paging): AppQuery<PageParams>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let page = paging.page_request(state.config.page_size)?;
    let search = params.search.as_deref();

    let total = UserRepo::count(&state.pool, search).await?;
    page.ensure_in_range(total)?;
    let users = UserRepo::list(&state.pool, search, page.limit(), page.offset()).await?;

    let results = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(Paginated::new(results, total, &page, &uri)))
}

/// POST /api/v1/users
///
/// Create a user with any role. Returns 201 Created.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let mut errors = FieldErrors::new();
    validate_username(&input.username, &mut errors);
    validate_email(&input.email, &mut errors);
    validate_person_name("first_name", &input.first_name, &mut errors);
    validate_person_name("last_name", &input.last_name, &mut errors);
    let role = match input.role.as_deref() {
        Some(value) => parse_role(value, &mut errors),
        None => Some(Role::default()),
    };
    check_unique_identity(
        &state.pool,
        Some(&input.username),
        Some(&input.email),
        None,
        &mut errors,
    )
    .await?;
    errors.into_result()?;

    let create_dto = CreateUser {
        username: input.username,
        email: input.email,
        first_name: input.first_name,
        last_name: input.last_name,
        bio: input.bio,
        role: role.unwrap_or_default(),
        is_superuser: false,
    };
    let user = UserRepo::create(&state.pool, &create_dto, Utc::now()).await?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        admin_id = admin.user.id,
        "User created",
    );

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/v1/users/{username}
pub async fn get_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;
    Ok(Json(user.into()))
}

/// PATCH /api/v1/users/{username}
///
/// Partial update, including the role.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(username): AppPath<String>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let existing = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    let update = validate_update(&state.pool, &input, existing.id).await?;
    let user = UserRepo::update(&state.pool, existing.id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    tracing::info!(user_id = user.id, admin_id = admin.user.id, "User updated");

    Ok(Json(user.into()))
}

/// DELETE /api/v1/users/{username}
///
/// Removes the user together with their reviews and comments.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(username): AppPath<String>,
) -> AppResult<StatusCode> {
    if !UserRepo::delete_by_username(&state.pool, &username).await? {
        return Err(CoreError::not_found("User", &username).into());
    }

    tracing::info!(username = %username, admin_id = admin.user.id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Record a field error for a username or email already taken by a user
/// other than `except`.
pub(crate) async fn check_unique_identity(
    pool: &DbPool,
    username: Option<&str>,
    email: Option<&str>,
    except: Option<DbId>,
    errors: &mut FieldErrors,
) -> Result<(), sqlx::Error> {
    let taken = |id: DbId| except != Some(id);

    if let Some(username) = username.filter(|_| errors.get("username").is_none()) {
        if let Some(other) = UserRepo::find_by_username(pool, username).await? {
            if taken(other.id) {
                errors.add("username", "A user with that username already exists.");
            }
        }
    }
    if let Some(email) = email.filter(|_| errors.get("email").is_none()) {
        if let Some(other) = UserRepo::find_by_email(pool, email).await? {
            if taken(other.id) {
                errors.add("email", "A user with that email already exists.");
            }
        }
    }
    Ok(())
}

/// Validate a partial user update for the user `id`.
async fn validate_update(
    pool: &DbPool,
    input: &UpdateUserRequest,
    id: DbId,
) -> AppResult<UpdateUser> {
    let mut errors = FieldErrors::new();
    if let Some(ref username) = input.username {
        validate_username(username, &mut errors);
    }
    if let Some(ref email) = input.email {
        validate_email(email, &mut errors);
    }
    if let Some(ref first_name) = input.first_name {
        validate_person_name("first_name", first_name, &mut errors);
    }
    if let Some(ref last_name) = input.last_name {
        validate_person_name("last_name", last_name, &mut errors);
    }
    let role = input
        .role
        .as_deref()
        .and_then(|value| parse_role(value, &mut errors));
    check_unique_identity(
        pool,
        input.username.as_deref(),
        input.email.as_deref(),
        Some(id),
        &mut errors,
    )
    .await?;
    errors.into_result()?;

    Ok(UpdateUser {
        username: input.username.clone(),
        email: input.email.clone(),
        first_name: input.first_name.clone(),
        last_name: input.last_name.clone(),
        bio: input.bio.clone(),
        role,
    })
}
