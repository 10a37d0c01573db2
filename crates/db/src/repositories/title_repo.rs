//! Repository for the `titles` table and its `title_genres` junction.
//!
//! Reads always come back as [`TitleWithRelations`]: the category is joined
//! in, genres are loaded in one batch per page, and the rating is the mean
//! of the title's review scores.

use std::collections::HashMap;

use sqlx::Sqlite;
use yamdb_core::types::DbId;

use super::GenreRepo;
use crate::models::title::{CreateTitle, TitleFilter, TitleRow, TitleWithRelations, UpdateTitle};
use crate::{contains_pattern, fold_case, DbPool};

/// Select list producing a [`TitleRow`]. Expects `titles t LEFT JOIN categories c`.
const SELECT_ROW: &str = "SELECT t.id, t.name, t.year, t.description, t.category_id, \
                          c.name AS category_name, c.slug AS category_slug, \
                          (SELECT AVG(r.score) FROM reviews r WHERE r.title_id = t.id) AS rating \
                          FROM titles t LEFT JOIN categories c ON c.id = t.category_id";

/// Filter clause over `$1..$4` = name pattern, year, genre pattern, category pattern.
/// Name matching runs against the folded column.
const FILTER: &str = r"($1 IS NULL OR t.name_folded LIKE $1 ESCAPE '\')
    AND ($2 IS NULL OR t.year = $2)
    AND ($3 IS NULL OR EXISTS (
        SELECT 1 FROM title_genres tg JOIN genres g ON g.id = tg.genre_id
        WHERE tg.title_id = t.id AND g.slug LIKE $3 ESCAPE '\'))
    AND ($4 IS NULL OR c.slug LIKE $4 ESCAPE '\')";

/// Provides CRUD operations for titles.
pub struct TitleRepo;

impl TitleRepo {
    /// Insert a title and its genre links in one transaction.
    pub async fn create(
        pool: &DbPool,
        input: &CreateTitle,
    ) -> Result<TitleWithRelations, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO titles (name, name_folded, year, description, category_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(fold_case(&input.name))
        .bind(input.year)
        .bind(&input.description)
        .bind(input.category_id)
        .fetch_one(&mut *tx)
        .await?;

        if !input.genre_ids.is_empty() {
            Self::set_genres_inner(&mut tx, id, &input.genre_ids).await?;
        }

        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a title by id with its relations and rating.
    pub async fn find_by_id(
        pool: &DbPool,
        id: DbId,
    ) -> Result<Option<TitleWithRelations>, sqlx::Error> {
        let query = format!("{SELECT_ROW} WHERE t.id = $1");
        let Some(row) = sqlx::query_as::<_, TitleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };
        let mut titles = Self::attach_genres(pool, vec![row]).await?;
        Ok(titles.pop())
    }

    /// Whether a title with this id exists.
    pub async fn exists(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM titles WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List titles matching `filter`, ordered by id.
    pub async fn list(
        pool: &DbPool,
        filter: &TitleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TitleWithRelations>, sqlx::Error> {
        let query = format!("{SELECT_ROW} WHERE {FILTER} ORDER BY t.id LIMIT $5 OFFSET $6");
        let rows = sqlx::query_as::<_, TitleRow>(&query)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.year)
            .bind(filter.genre.as_deref().map(contains_pattern))
            .bind(filter.category.as_deref().map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Self::attach_genres(pool, rows).await
    }

    /// Count titles matching `filter`.
    pub async fn count(pool: &DbPool, filter: &TitleFilter) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM titles t LEFT JOIN categories c ON c.id = t.category_id \
             WHERE {FILTER}"
        );
        sqlx::query_scalar(&query)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.year)
            .bind(filter.genre.as_deref().map(contains_pattern))
            .bind(filter.category.as_deref().map(contains_pattern))
            .fetch_one(pool)
            .await
    }

    /// Update a title. Only non-`None` fields in `input` are applied.
    ///
    /// If `genre_ids` is `Some`, replaces all genre links.
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        input: &UpdateTitle,
    ) -> Result<Option<TitleWithRelations>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE titles SET
                name = COALESCE($2, name),
                name_folded = COALESCE($3, name_folded),
                year = COALESCE($4, year),
                description = COALESCE($5, description),
                category_id = COALESCE($6, category_id)
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.name.as_deref().map(fold_case))
        .bind(input.year)
        .bind(&input.description)
        .bind(input.category_id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }
        if let Some(ref genre_ids) = input.genre_ids {
            Self::set_genres_inner(&mut tx, id, genre_ids).await?;
        }

        tx.commit().await?;
        Self::find_by_id(pool, id).await
    }

    /// Delete a title. Its genre links, reviews, and comments cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Replace genre links within an existing transaction.
    async fn set_genres_inner(
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        title_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
            .bind(title_id)
            .execute(&mut **tx)
            .await?;

        for &genre_id in genre_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO title_genres (title_id, genre_id) VALUES ($1, $2)",
            )
            .bind(title_id)
            .bind(genre_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Load genres for a batch of rows and assemble the full titles.
    async fn attach_genres(
        pool: &DbPool,
        rows: Vec<TitleRow>,
    ) -> Result<Vec<TitleWithRelations>, sqlx::Error> {
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let mut genres: HashMap<DbId, Vec<_>> = HashMap::new();
        for (title_id, genre) in GenreRepo::list_for_titles(pool, &ids).await? {
            genres.entry(title_id).or_default().push(genre);
        }
        Ok(rows
            .into_iter()
            .map(|row| {
                let linked = genres.remove(&row.id).unwrap_or_default();
                TitleWithRelations::from_row(row, linked)
            })
            .collect())
    }
}
