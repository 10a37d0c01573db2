//! Repository for the `categories` table.

use crate::models::category::{Category, CreateCategory};
use crate::{contains_pattern, fold_case, DbPool};

const COLUMNS: &str = "id, name, slug";

/// Provides create/list/delete operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    pub async fn create(pool: &DbPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, name_folded, slug) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(fold_case(&input.name))
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    /// Find a category by its slug.
    pub async fn find_by_slug(pool: &DbPool, slug: &str) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE slug = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List categories ordered by id, optionally filtered by a name substring.
    pub async fn list(
        pool: &DbPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            r"SELECT {COLUMNS} FROM categories
              WHERE ($1 IS NULL OR name_folded LIKE $1 ESCAPE '\')
              ORDER BY id
              LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(search.map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &DbPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r"SELECT COUNT(*) FROM categories WHERE ($1 IS NULL OR name_folded LIKE $1 ESCAPE '\')",
        )
        .bind(search.map(contains_pattern))
        .fetch_one(pool)
        .await
    }

    /// Delete a category by slug. Titles in it keep existing with no category.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_by_slug(pool: &DbPool, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE slug = $1")
            .bind(slug)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
