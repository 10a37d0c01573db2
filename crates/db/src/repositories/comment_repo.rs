//! Repository for the `comments` table, scoped by review.

use yamdb_core::types::{DbId, Timestamp};

use crate::models::comment::{Comment, CreateComment, UpdateComment};
use crate::DbPool;

const SELECT: &str = "SELECT c.id, c.review_id, c.author_id, u.username AS author, \
                      c.text, c.pub_date \
                      FROM comments c JOIN users u ON u.id = c.author_id";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a comment on `review_id`.
    pub async fn create(
        pool: &DbPool,
        review_id: DbId,
        author_id: DbId,
        input: &CreateComment,
        now: Timestamp,
    ) -> Result<Comment, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO comments (review_id, author_id, text, pub_date)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(review_id)
        .bind(author_id)
        .bind(&input.text)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Self::find(pool, review_id, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find comment `id` under `review_id`.
    pub async fn find(
        pool: &DbPool,
        review_id: DbId,
        id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("{SELECT} WHERE c.review_id = $1 AND c.id = $2");
        sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List comments on a review, oldest first.
    pub async fn list(
        pool: &DbPool,
        review_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE c.review_id = $1 ORDER BY c.pub_date, c.id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &DbPool, review_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = $1")
            .bind(review_id)
            .fetch_one(pool)
            .await
    }

    /// Update a comment's text. Returns `None` if it does not exist under `review_id`.
    pub async fn update(
        pool: &DbPool,
        review_id: DbId,
        id: DbId,
        input: &UpdateComment,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE comments SET text = COALESCE($3, text) WHERE review_id = $1 AND id = $2",
        )
        .bind(review_id)
        .bind(id)
        .bind(&input.text)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find(pool, review_id, id).await
    }

    /// Delete a comment. Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, review_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE review_id = $1 AND id = $2")
            .bind(review_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
