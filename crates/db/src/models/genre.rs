//! Genre entity model and DTOs.
//!
//! Genres share their shape with categories; they differ only in how titles
//! reference them (many-to-many through `title_genres`).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::types::DbId;

/// A row from the `genres` table. Serialized as `{name, slug}`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Genre {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// DTO for creating a new genre.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGenre {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}
