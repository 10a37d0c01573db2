//! Handlers for the `/categories` resource.
//!
//! Everyone may list; only admins may create or delete.

use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;
use yamdb_core::catalog::validate_category_like;
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::permissions::{authorize, policies, Access};
use yamdb_db::models::category::{CatalogListParams, Category, CreateCategory};
use yamdb_db::repositories::CategoryRepo;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::OptionalAuth;
use crate::query::PageParams;
use crate::response::Paginated;
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
    _auth: OptionalAuth,
    AppQuery(params): AppQuery<CatalogListParams>,
    AppQuery(paging): AppQuery<PageParams>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<Paginated<Category>>> {
    let page = paging.page_request(state.config.page_size)?;
    let search = params.search.as_deref();

    let total = CategoryRepo::count(&state.pool, search).await?;
    page.ensure_in_range(total)?;
    let categories = CategoryRepo::list(&state.pool, search, page.limit(), page.offset()).await?;

    Ok(Json(Paginated::new(categories, total, &page, &uri)))
}

/// POST /api/v1/categories
pub async fn create_category(
    State(state): State<AppState>,
    auth: OptionalAuth,
    AppJson(input): AppJson<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    authorize(&policies::admin_or_read_only(), &auth.actor(), Access::Write, None)?;

    validate_category_like(&input.name, &input.slug)?;
    if CategoryRepo::find_by_slug(&state.pool, &input.slug).await?.is_some() {
        return Err(FieldErrors::single("slug", "category with this slug already exists.").into());
    }

    let category = CategoryRepo::create(&state.pool, &input).await?;

    tracing::info!(category_id = category.id, slug = %category.slug, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE /api/v1/categories/{slug}
///
/// Titles in the category are kept with their category cleared.
pub async fn delete_category(
    State(state): State<AppState>,
    auth: OptionalAuth,
    AppPath(slug): AppPath<String>,
) -> AppResult<StatusCode> {
    authorize(&policies::admin_or_read_only(), &auth.actor(), Access::Write, None)?;

    if !CategoryRepo::delete_by_slug(&state.pool, &slug).await? {
        return Err(CoreError::not_found("Category", &slug).into());
    }

    tracing::info!(slug = %slug, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}
