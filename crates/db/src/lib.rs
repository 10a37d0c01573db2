//! Persistence layer: sqlx models, repositories, pool setup, and migrations.

pub mod models;
pub mod repositories;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub type DbPool = sqlx::SqlitePool;

/// Maximum number of pooled connections.
const MAX_CONNECTIONS: u32 = 8;

/// Create a connection pool from a database URL (e.g. `sqlite://yamdb.db`).
///
/// The database file is created if missing and foreign keys are enforced on
/// every connection, which the `ON DELETE` rules in the schema rely on.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Lowercase `text` for storage in a `*_folded` search column.
///
/// SQLite's `LIKE` is case-insensitive for ASCII only, so searches compare
/// a folded needle against text folded here on write.
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Build a `LIKE` pattern matching the case-folded `needle` anywhere, with
/// `\` as the escape character for literal `%` and `_`.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let needle = fold_case(needle);
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
