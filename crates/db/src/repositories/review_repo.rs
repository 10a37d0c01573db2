//! Repository for the `reviews` table.
//!
//! Every lookup is scoped by title: a review id that belongs to another
//! title is treated as missing.

use yamdb_core::types::{DbId, Timestamp};

use crate::models::review::{CreateReview, Review, UpdateReview};
use crate::DbPool;

/// Select list producing a [`Review`]. Expects `reviews r JOIN users u`.
const SELECT: &str = "SELECT r.id, r.title_id, r.author_id, u.username AS author, \
                      r.text, r.score, r.pub_date \
                      FROM reviews r JOIN users u ON u.id = r.author_id";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Whether `author_id` has already reviewed `title_id`.
    pub async fn exists_for_author(
        pool: &DbPool,
        title_id: DbId,
        author_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE title_id = $1 AND author_id = $2)",
        )
        .bind(title_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
    }

    /// Insert a review. The `(author_id, title_id)` unique constraint rejects
    /// a second review of the same title.
    pub async fn create(
        pool: &DbPool,
        title_id: DbId,
        author_id: DbId,
        input: &CreateReview,
        now: Timestamp,
    ) -> Result<Review, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO reviews (title_id, author_id, text, score, pub_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(title_id)
        .bind(author_id)
        .bind(&input.text)
        .bind(input.score)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Self::find(pool, title_id, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find review `id` under `title_id`.
    pub async fn find(
        pool: &DbPool,
        title_id: DbId,
        id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("{SELECT} WHERE r.title_id = $1 AND r.id = $2");
        sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List reviews of a title, oldest first.
    pub async fn list(
        pool: &DbPool,
        title_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE r.title_id = $1 ORDER BY r.pub_date, r.id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &DbPool, title_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(title_id)
            .fetch_one(pool)
            .await
    }

    /// Update a review's text and/or score.
    ///
    /// Returns `None` if no such review exists under `title_id`.
    pub async fn update(
        pool: &DbPool,
        title_id: DbId,
        id: DbId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE reviews SET
                text = COALESCE($3, text),
                score = COALESCE($4, score)
             WHERE title_id = $1 AND id = $2",
        )
        .bind(title_id)
        .bind(id)
        .bind(&input.text)
        .bind(input.score)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find(pool, title_id, id).await
    }

    /// Delete a review and its comments.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, title_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE title_id = $1 AND id = $2")
            .bind(title_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
