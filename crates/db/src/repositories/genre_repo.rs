//! Repository for the `genres` table and title/genre links.

use yamdb_core::types::DbId;

use super::placeholders;
use crate::models::genre::{CreateGenre, Genre};
use crate::{contains_pattern, fold_case, DbPool};

const COLUMNS: &str = "id, name, slug";

/// Provides create/list/delete operations for genres.
pub struct GenreRepo;

impl GenreRepo {
    /// Insert a new genre, returning the created row.
    pub async fn create(pool: &DbPool, input: &CreateGenre) -> Result<Genre, sqlx::Error> {
        let query = format!(
            "INSERT INTO genres (name, name_folded, slug) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Genre>(&query)
            .bind(&input.name)
            .bind(fold_case(&input.name))
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    /// Find a genre by its slug.
    pub async fn find_by_slug(pool: &DbPool, slug: &str) -> Result<Option<Genre>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM genres WHERE slug = $1");
        sqlx::query_as::<_, Genre>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Fetch every genre whose slug is in `slugs`. Unknown slugs are skipped.
    pub async fn find_by_slugs(pool: &DbPool, slugs: &[String]) -> Result<Vec<Genre>, sqlx::Error> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM genres WHERE slug IN ({}) ORDER BY id",
            placeholders(1, slugs.len())
        );
        let mut q = sqlx::query_as::<_, Genre>(&query);
        for slug in slugs {
            q = q.bind(slug);
        }
        q.fetch_all(pool).await
    }

    /// List genres ordered by id, optionally filtered by a name substring.
    pub async fn list(
        pool: &DbPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Genre>, sqlx::Error> {
        let query = format!(
            r"SELECT {COLUMNS} FROM genres
              WHERE ($1 IS NULL OR name_folded LIKE $1 ESCAPE '\')
              ORDER BY id
              LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Genre>(&query)
            .bind(search.map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &DbPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r"SELECT COUNT(*) FROM genres WHERE ($1 IS NULL OR name_folded LIKE $1 ESCAPE '\')",
        )
        .bind(search.map(contains_pattern))
        .fetch_one(pool)
        .await
    }

    /// Delete a genre by slug. Its title links are removed; titles stay.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_by_slug(pool: &DbPool, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM genres WHERE slug = $1")
            .bind(slug)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Genres linked to each of `title_ids`, as `(title_id, genre)` pairs
    /// ordered by title then genre id.
    pub async fn list_for_titles(
        pool: &DbPool,
        title_ids: &[DbId],
    ) -> Result<Vec<(DbId, Genre)>, sqlx::Error> {
        if title_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT tg.title_id, g.id, g.name, g.slug
             FROM title_genres tg
             JOIN genres g ON g.id = tg.genre_id
             WHERE tg.title_id IN ({})
             ORDER BY tg.title_id, g.id",
            placeholders(1, title_ids.len())
        );
        let mut q = sqlx::query_as::<_, (DbId, DbId, String, String)>(&query);
        for id in title_ids {
            q = q.bind(id);
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows
            .into_iter()
            .map(|(title_id, id, name, slug)| (title_id, Genre { id, name, slug }))
            .collect())
    }
}
