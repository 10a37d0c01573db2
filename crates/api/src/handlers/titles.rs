//! Handlers for the `/titles` resource.
//!
//! Titles are read with their category, genres, and computed rating, and
//! written with category/genre slugs. Only admins may write.

use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use yamdb_core::catalog::{validate_name, validate_year};
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::permissions::{authorize, policies, Access};
use yamdb_core::types::DbId;
use yamdb_db::models::title::{CreateTitle, TitleFilter, TitleWithRelations, UpdateTitle};
use yamdb_db::repositories::{CategoryRepo, GenreRepo, TitleRepo};
use yamdb_db::DbPool;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::OptionalAuth;
use crate::query::PageParams;
use crate::response::Paginated;
use crate::state::AppState;

const REQUIRED: &str = "This field is required.";

/// Request body for `POST /titles` and `PATCH /titles/{id}`.
///
/// `category` is a category slug and `genre` a list of genre slugs.
#[derive(Debug, Default, Deserialize)]
pub struct TitleWriteRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub category: Option<String>,
}

/// Validated writable fields with slugs resolved to ids.
struct ResolvedTitle {
    category_id: Option<DbId>,
    genre_ids: Option<Vec<DbId>>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles
///
/// Filters: `name` and `genre`/`category` (slug) are case-insensitive
/// substrings, `year` is exact.
pub async fn list_titles(
    State(state): State<AppState>,
    _auth: OptionalAuth,
    AppQuery(filter): AppQuery<TitleFilter>,
    AppQuery(paging): AppQuery<PageParams>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<Paginated<TitleWithRelations>>> {
    let page = paging.page_request(state.config.page_size)?;

    let total = TitleRepo::count(&state.pool, &filter).await?;
    page.ensure_in_range(total)?;
    let titles = TitleRepo::list(&state.pool, &filter, page.limit(), page.offset()).await?;

    Ok(Json(Paginated::new(titles, total, &page, &uri)))
}

/// POST /api/v1/titles
pub async fn create_title(
    State(state): State<AppState>,
    auth: OptionalAuth,
    AppJson(input): AppJson<TitleWriteRequest>,
) -> AppResult<(StatusCode, Json<TitleWithRelations>)> {
    authorize(&policies::admin_or_read_only(), &auth.actor(), Access::Write, None)?;

    let mut errors = FieldErrors::new();
    if input.name.is_none() {
        errors.add("name", REQUIRED);
    }
    if input.year.is_none() {
        errors.add("year", REQUIRED);
    }
    let resolved = validate_write(&state.pool, &input, &mut errors).await?;
    errors.into_result()?;

    let create_dto = CreateTitle {
        name: input.name.unwrap_or_default(),
        year: input.year.unwrap_or_default(),
        description: input.description.unwrap_or_default(),
        category_id: resolved.category_id,
        genre_ids: resolved.genre_ids.unwrap_or_default(),
    };
    let title = TitleRepo::create(&state.pool, &create_dto).await?;

    tracing::info!(title_id = title.id, name = %title.name, "Title created");

    Ok((StatusCode::CREATED, Json(title)))
}

/// GET /api/v1/titles/{id}
pub async fn get_title(
    State(state): State<AppState>,
    _auth: OptionalAuth,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<TitleWithRelations>> {
    let title = TitleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", id))?;
    Ok(Json(title))
}

/// PATCH /api/v1/titles/{id}
///
/// Partial update. A `genre` list replaces all genres; `category` cannot be
/// cleared once set, only changed.
pub async fn update_title(
    State(state): State<AppState>,
    auth: OptionalAuth,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<TitleWriteRequest>,
) -> AppResult<Json<TitleWithRelations>> {
    authorize(&policies::admin_or_read_only(), &auth.actor(), Access::Write, None)?;

    if !TitleRepo::exists(&state.pool, id).await? {
        return Err(CoreError::not_found("Title", id).into());
    }

    let mut errors = FieldErrors::new();
    let resolved = validate_write(&state.pool, &input, &mut errors).await?;
    errors.into_result()?;

    let update_dto = UpdateTitle {
        name: input.name,
        year: input.year,
        description: input.description,
        category_id: resolved.category_id,
        genre_ids: resolved.genre_ids,
    };
    let title = TitleRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", id))?;

    tracing::info!(title_id = id, "Title updated");

    Ok(Json(title))
}

/// DELETE /api/v1/titles/{id}
///
/// Reviews and their comments are deleted with the title.
pub async fn delete_title(
    State(state): State<AppState>,
    auth: OptionalAuth,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    authorize(&policies::admin_or_read_only(), &auth.actor(), Access::Write, None)?;

    if !TitleRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Title", id).into());
    }

    tracing::info!(title_id = id, "Title deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate the fields present in `input` and resolve slugs, recording
/// problems in `errors`.
async fn validate_write(
    pool: &DbPool,
    input: &TitleWriteRequest,
    errors: &mut FieldErrors,
) -> Result<ResolvedTitle, sqlx::Error> {
    if let Some(ref name) = input.name {
        validate_name(name, errors);
    }
    if let Some(year) = input.year {
        validate_year(year, Utc::now(), errors);
    }

    let category_id = match input.category.as_deref() {
        Some(slug) => match CategoryRepo::find_by_slug(pool, slug).await? {
            Some(category) => Some(category.id),
            None => {
                errors.add("category", format!("Object with slug={slug} does not exist."));
                None
            }
        },
        None => None,
    };

    let genre_ids = match input.genre {
        Some(ref slugs) => {
            let genres = GenreRepo::find_by_slugs(pool, slugs).await?;
            for slug in slugs {
                if !genres.iter().any(|g| &g.slug == slug) {
                    errors.add("genre", format!("Object with slug={slug} does not exist."));
                }
            }
            Some(genres.into_iter().map(|g| g.id).collect())
        }
        None => None,
    };

    Ok(ResolvedTitle {
        category_id,
        genre_ids,
    })
}
