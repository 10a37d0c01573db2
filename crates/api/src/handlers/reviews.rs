//! Handlers for `/titles/{title_id}/reviews`.
//!
//! Anyone may read. Any authenticated user may review a title once; the
//! author, moderators, and admins may edit or delete a review.

use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::permissions::{authorize, policies, Access};
use yamdb_core::reviews::{duplicate_review, validate_new_review, validate_score, validate_text};
use yamdb_core::types::DbId;
use yamdb_db::models::review::{CreateReview, Review, UpdateReview};
use yamdb_db::repositories::{ReviewRepo, TitleRepo};
use yamdb_db::DbPool;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::{AuthUser, OptionalAuth};
use crate::query::PageParams;
use crate::response::Paginated;
use crate::state::AppState;

/// GET /api/v1/titles/{title_id}/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    _auth: OptionalAuth,
    AppPath(title_id): AppPath<DbId>,
    AppQuery(paging): AppQuery<PageParams>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<Paginated<Review>>> {
    ensure_title(&state.pool, title_id).await?;
    let page = paging.page_request(state.config.page_size)?;

    let total = ReviewRepo::count(&state.pool, title_id).await?;
    page.ensure_in_range(total)?;
    let reviews = ReviewRepo::list(&state.pool, title_id, page.limit(), page.offset()).await?;

    Ok(Json(Paginated::new(reviews, total, &page, &uri)))
}

/// POST /api/v1/titles/{title_id}/reviews
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(title_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    ensure_title(&state.pool, title_id).await?;
    validate_new_review(&input.text, input.score)?;

    if ReviewRepo::exists_for_author(&state.pool, title_id, auth.user.id).await? {
        return Err(duplicate_review().into());
    }

    let review = match ReviewRepo::create(&state.pool, title_id, auth.user.id, &input, Utc::now())
        .await
    {
        Ok(review) => review,
        // Lost a race with a concurrent review by the same author.
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(duplicate_review().into())
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        review_id = review.id,
        title_id,
        author_id = auth.user.id,
        score = review.score,
        "Review created"
    );

    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn get_review(
    State(state): State<AppState>,
    _auth: OptionalAuth,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<Review>> {
    let review = find_review(&state.pool, title_id, review_id).await?;
    Ok(Json(review))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn update_review(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<UpdateReview>,
) -> AppResult<Json<Review>> {
    let review = find_review(&state.pool, title_id, review_id).await?;
    authorize(
        &policies::author_staff_or_read_only(),
        &auth.actor(),
        Access::Write,
        Some(&review),
    )?;

    let mut errors = FieldErrors::new();
    if let Some(ref text) = input.text {
        validate_text(text, &mut errors);
    }
    if let Some(score) = input.score {
        validate_score(score, &mut errors);
    }
    errors.into_result()?;

    let review = ReviewRepo::update(&state.pool, title_id, review_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", review_id))?;

    tracing::info!(review_id, title_id, editor_id = auth.user.id, "Review updated");

    Ok(Json(review))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Comments on the review are deleted with it.
pub async fn delete_review(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let review = find_review(&state.pool, title_id, review_id).await?;
    authorize(
        &policies::author_staff_or_read_only(),
        &auth.actor(),
        Access::Write,
        Some(&review),
    )?;

    if !ReviewRepo::delete(&state.pool, title_id, review_id).await? {
        return Err(CoreError::not_found("Review", review_id).into());
    }

    tracing::info!(review_id, title_id, editor_id = auth.user.id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_title(pool: &DbPool, title_id: DbId) -> AppResult<()> {
    if !TitleRepo::exists(pool, title_id).await? {
        return Err(CoreError::not_found("Title", title_id).into());
    }
    Ok(())
}

/// Load review `review_id` of title `title_id`, or 404.
pub(crate) async fn find_review(
    pool: &DbPool,
    title_id: DbId,
    review_id: DbId,
) -> AppResult<Review> {
    let review = ReviewRepo::find(pool, title_id, review_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", review_id))?;
    Ok(review)
}
