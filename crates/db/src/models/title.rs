//! Title entity model and DTOs.
//!
//! A title references at most one category (nulled when the category is
//! deleted) and any number of genres. Its rating is never stored: every read
//! computes the mean review score, `None` when there are no reviews.

use std::fmt::Display;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use yamdb_core::types::DbId;

use super::category::Category;
use super::genre::Genre;

/// A `titles` row joined with its category and computed rating.
#[derive(Debug, Clone, FromRow)]
pub struct TitleRow {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: String,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub rating: Option<f64>,
}

/// A title enriched with its genres and category, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct TitleWithRelations {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub rating: Option<f64>,
    pub description: String,
    pub genre: Vec<Genre>,
    pub category: Option<Category>,
}

impl TitleWithRelations {
    pub fn from_row(row: TitleRow, genre: Vec<Genre>) -> Self {
        let category = match (row.category_id, row.category_name, row.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(Category { id, name, slug }),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            year: row.year,
            rating: row.rating,
            description: row.description,
            genre,
            category,
        }
    }
}

/// DTO for inserting a title with resolved relation ids.
#[derive(Debug, Clone)]
pub struct CreateTitle {
    pub name: String,
    pub year: i32,
    pub description: String,
    pub category_id: Option<DbId>,
    pub genre_ids: Vec<DbId>,
}

/// DTO for patching a title. `None` leaves a field unchanged.
///
/// If `genre_ids` is `Some`, it replaces all genre links.
#[derive(Debug, Clone, Default)]
pub struct UpdateTitle {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub genre_ids: Option<Vec<DbId>>,
}

/// Query-string filters for title listing. An empty value (`?year=`) is the
/// same as leaving the filter out.
#[derive(Debug, Default, Deserialize)]
pub struct TitleFilter {
    /// Case-insensitive substring of the title name.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub name: Option<String>,
    /// Exact release year.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub year: Option<i32>,
    /// Case-insensitive substring of a genre slug.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub genre: Option<String>,
    /// Case-insensitive substring of the category slug.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<String>,
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
    }
}
