//! Handlers for the `/genres` resource.
//!
//! Everyone may list; only admins may create or delete.

use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;
use yamdb_core::catalog::validate_category_like;
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::permissions::{authorize, policies, Access};
use yamdb_db::models::category::CatalogListParams;
use yamdb_db::models::genre::{CreateGenre, Genre};
use yamdb_db::repositories::GenreRepo;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::OptionalAuth;
use crate::query::PageParams;
use crate::response::Paginated;
use crate::state::AppState;

/// GET /api/v1/genres
pub async fn list_genres(
    State(state): State<AppState>,
    _auth: OptionalAuth,
    AppQuery(params): AppQuery<CatalogListParams>,
    AppQuery(paging): AppQuery<PageParams>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<Paginated<Genre>>> {
    let page = paging.page_request(state.config.page_size)?;
    let search = params.search.as_deref();

    let total = GenreRepo::count(&state.pool, search).await?;
    page.ensure_in_range(total)?;
    let genres = GenreRepo::list(&state.pool, search, page.limit(), page.offset()).await?;

    Ok(Json(Paginated::new(genres, total, &page, &uri)))
}

/// POST /api/v1/genres
pub async fn create_genre(
    State(state): State<AppState>,
    auth: OptionalAuth,
    AppJson(input): AppJson<CreateGenre>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    authorize(&policies::admin_or_read_only(), &auth.actor(), Access::Write, None)?;

    validate_category_like(&input.name, &input.slug)?;
    if GenreRepo::find_by_slug(&state.pool, &input.slug).await?.is_some() {
        return Err(FieldErrors::single("slug", "genre with this slug already exists.").into());
    }

    let genre = GenreRepo::create(&state.pool, &input).await?;

    tracing::info!(genre_id = genre.id, slug = %genre.slug, "Genre created");

    Ok((StatusCode::CREATED, Json(genre)))
}

/// DELETE /api/v1/genres/{slug}
///
/// Titles keep existing; only their links to the genre are removed.
pub async fn delete_genre(
    State(state): State<AppState>,
    auth: OptionalAuth,
    AppPath(slug): AppPath<String>,
) -> AppResult<StatusCode> {
    authorize(&policies::admin_or_read_only(), &auth.actor(), Access::Write, None)?;

    if !GenreRepo::delete_by_slug(&state.pool, &slug).await? {
        return Err(CoreError::not_found("Genre", &slug).into());
    }

    tracing::info!(slug = %slug, "Genre deleted");

    Ok(StatusCode::NO_CONTENT)
}
