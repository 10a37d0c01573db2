//! Integration tests for the user repository: lookup, search, update, delete.

use assert_matches::assert_matches;
use chrono::Utc;
use sqlx::SqlitePool;
use yamdb_core::roles::Role;
use yamdb_db::models::user::{CreateUser, UpdateUser};
use yamdb_db::repositories::UserRepo;

fn new_user(username: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        ..CreateUser::default()
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_find(pool: SqlitePool) {
    let user = UserRepo::create(&pool, &new_user("reader"), Utc::now()).await.unwrap();

    let by_name = UserRepo::find_by_username(&pool, "reader").await.unwrap().unwrap();
    assert_eq!(by_name.id, user.id);

    let by_email = UserRepo::find_by_email(&pool, "reader@example.com").await.unwrap();
    assert!(by_email.is_some());

    let pair = UserRepo::find_by_username_and_email(&pool, "reader", "other@example.com")
        .await
        .unwrap();
    assert!(pair.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_username_violates_unique(pool: SqlitePool) {
    UserRepo::create(&pool, &new_user("reader"), Utc::now()).await.unwrap();

    let mut dup = new_user("reader");
    dup.email = "another@example.com".into();
    let err = UserRepo::create(&pool, &dup, Utc::now()).await.unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db) if db.is_unique_violation());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_is_case_insensitive_substring(pool: SqlitePool) {
    for name in ["alice", "Malik", "bob", "100%_real"] {
        UserRepo::create(&pool, &new_user(name), Utc::now()).await.unwrap();
    }

    let hits = UserRepo::list(&pool, Some("LI"), 10, 0).await.unwrap();
    let names: Vec<_> = hits.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["alice", "Malik"]);
    assert_eq!(UserRepo::count(&pool, Some("LI")).await.unwrap(), 2);

    // Wildcards in the needle are literal.
    assert_eq!(UserRepo::count(&pool, Some("%_")).await.unwrap(), 1);
    assert_eq!(UserRepo::count(&pool, None).await.unwrap(), 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_folds_non_ascii_case(pool: SqlitePool) {
    let user = UserRepo::create(&pool, &new_user("Всеволод"), Utc::now()).await.unwrap();
    UserRepo::create(&pool, &new_user("bob"), Utc::now()).await.unwrap();

    let hits = UserRepo::list(&pool, Some("ВСЕВ"), 10, 0).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].username, "Всеволод");

    // A renamed user is found by the new name only.
    UserRepo::update(
        &pool,
        user.id,
        &UpdateUser {
            username: Some("Ярослав".into()),
            ..UpdateUser::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(UserRepo::count(&pool, Some("всев")).await.unwrap(), 0);
    assert_eq!(UserRepo::count(&pool, Some("ярос")).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_applies_only_given_fields(pool: SqlitePool) {
    let user = UserRepo::create(&pool, &new_user("reader"), Utc::now()).await.unwrap();

    let updated = UserRepo::update(
        &pool,
        user.id,
        &UpdateUser {
            bio: Some("Loves noir".into()),
            role: Some(Role::Moderator),
            ..UpdateUser::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.username, "reader");
    assert_eq!(updated.bio, "Loves noir");
    assert_eq!(updated.role(), Role::Moderator);

    let missing = UserRepo::update(&pool, 9999, &UpdateUser::default()).await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_by_username(pool: SqlitePool) {
    UserRepo::create(&pool, &new_user("reader"), Utc::now()).await.unwrap();
    assert!(UserRepo::delete_by_username(&pool, "reader").await.unwrap());
    assert!(!UserRepo::delete_by_username(&pool, "reader").await.unwrap());
}
