//! Category entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::types::DbId;

/// A row from the `categories` table. Serialized as `{name, slug}`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Category {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// DTO for creating a new category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Query parameters for listing categories or genres.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogListParams {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
}
