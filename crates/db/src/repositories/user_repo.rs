//! Repository for the `users` table.

use sqlx::{Executor, Sqlite};
use yamdb_core::roles::Role;
use yamdb_core::types::{DbId, Timestamp};

use crate::models::user::{CreateUser, UpdateUser, User};
use crate::{contains_pattern, fold_case, DbPool};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, first_name, last_name, bio, role, \
                       is_superuser, date_joined";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateUser,
        now: Timestamp,
    ) -> Result<User, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let query = format!(
            "INSERT INTO users \
                (username, username_folded, email, first_name, last_name, bio, role, \
                 is_superuser, date_joined) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(fold_case(&input.username))
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.bio)
            .bind(input.role.as_str())
            .bind(input.is_superuser)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &DbPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find the user owning exactly this (username, email) pair.
    pub async fn find_by_username_and_email(
        pool: &DbPool,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1 AND email = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List users ordered by id, optionally filtered by a username substring.
    pub async fn list(
        pool: &DbPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            r"SELECT {COLUMNS} FROM users
              WHERE ($1 IS NULL OR username_folded LIKE $1 ESCAPE '\')
              ORDER BY id
              LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(search.map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count users matching the same filter as [`UserRepo::list`].
    pub async fn count(pool: &DbPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r"SELECT COUNT(*) FROM users WHERE ($1 IS NULL OR username_folded LIKE $1 ESCAPE '\')",
        )
        .bind(search.map(contains_pattern))
        .fetch_one(pool)
        .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                username = COALESCE($2, username),
                username_folded = COALESCE($3, username_folded),
                email = COALESCE($4, email),
                first_name = COALESCE($5, first_name),
                last_name = COALESCE($6, last_name),
                bio = COALESCE($7, bio),
                role = COALESCE($8, role)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(input.username.as_deref().map(fold_case))
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.bio)
            .bind(input.role.map(Role::as_str))
            .fetch_optional(pool)
            .await
    }

    /// Delete a user by username. Their reviews and comments cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_by_username(pool: &DbPool, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user by internal ID. Their reviews and comments cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Create or promote the bootstrap superuser.
    ///
    /// An existing user with `username` is promoted to `admin` with
    /// `is_superuser` set; its email is left untouched. Otherwise a new
    /// superuser is inserted.
    pub async fn ensure_superuser(
        pool: &DbPool,
        username: &str,
        email: &str,
        now: Timestamp,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET role = $2, is_superuser = 1 \
             WHERE username = $1 \
             RETURNING {COLUMNS}"
        );
        let promoted = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(Role::Admin.as_str())
            .fetch_optional(pool)
            .await?;
        if let Some(user) = promoted {
            return Ok(user);
        }

        let input = CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            role: Role::Admin,
            is_superuser: true,
            ..CreateUser::default()
        };
        Self::create(pool, &input, now).await
    }
}
