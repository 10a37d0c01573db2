//! Handlers for `/titles/{title_id}/reviews/{review_id}/comments`.
//!
//! The review must exist under the given title. Permissions match reviews.

use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::permissions::{authorize, policies, Access};
use yamdb_core::reviews::validate_text;
use yamdb_core::types::DbId;
use yamdb_db::models::comment::{Comment, CreateComment, UpdateComment};
use yamdb_db::repositories::CommentRepo;
use yamdb_db::DbPool;

use super::reviews::find_review;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::{AuthUser, OptionalAuth};
use crate::query::PageParams;
use crate::response::Paginated;
use crate::state::AppState;

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    _auth: OptionalAuth,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppQuery(paging): AppQuery<PageParams>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<Paginated<Comment>>> {
    find_review(&state.pool, title_id, review_id).await?;
    let page = paging.page_request(state.config.page_size)?;

    let total = CommentRepo::count(&state.pool, review_id).await?;
    page.ensure_in_range(total)?;
    let comments = CommentRepo::list(&state.pool, review_id, page.limit(), page.offset()).await?;

    Ok(Json(Paginated::new(comments, total, &page, &uri)))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<CreateComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    find_review(&state.pool, title_id, review_id).await?;

    let mut errors = FieldErrors::new();
    validate_text(&input.text, &mut errors);
    errors.into_result()?;

    let comment =
        CommentRepo::create(&state.pool, review_id, auth.user.id, &input, Utc::now()).await?;

    tracing::info!(
        comment_id = comment.id,
        review_id,
        author_id = auth.user.id,
        "Comment created"
    );

    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<AppState>,
    _auth: OptionalAuth,
    AppPath((title_id, review_id, comment_id)): AppPath<(DbId, DbId, DbId)>,
) -> AppResult<Json<Comment>> {
    let comment = find_comment(&state.pool, title_id, review_id, comment_id).await?;
    Ok(Json(comment))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn update_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((title_id, review_id, comment_id)): AppPath<(DbId, DbId, DbId)>,
    AppJson(input): AppJson<UpdateComment>,
) -> AppResult<Json<Comment>> {
    let comment = find_comment(&state.pool, title_id, review_id, comment_id).await?;
    authorize(
        &policies::author_staff_or_read_only(),
        &auth.actor(),
        Access::Write,
        Some(&comment),
    )?;

    if let Some(ref text) = input.text {
        let mut errors = FieldErrors::new();
        validate_text(text, &mut errors);
        errors.into_result()?;
    }

    let comment = CommentRepo::update(&state.pool, review_id, comment_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment_id))?;

    tracing::info!(comment_id, review_id, editor_id = auth.user.id, "Comment updated");

    Ok(Json(comment))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((title_id, review_id, comment_id)): AppPath<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    let comment = find_comment(&state.pool, title_id, review_id, comment_id).await?;
    authorize(
        &policies::author_staff_or_read_only(),
        &auth.actor(),
        Access::Write,
        Some(&comment),
    )?;

    if !CommentRepo::delete(&state.pool, review_id, comment_id).await? {
        return Err(CoreError::not_found("Comment", comment_id).into());
    }

    tracing::info!(comment_id, review_id, editor_id = auth.user.id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_comment(
    pool: &DbPool,
    title_id: DbId,
    review_id: DbId,
    comment_id: DbId,
) -> AppResult<Comment> {
    find_review(pool, title_id, review_id).await?;
    let comment = CommentRepo::find(pool, review_id, comment_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment_id))?;
    Ok(comment)
}
