//! Integration tests for reviews and comments: uniqueness, scoping, cascades.

use assert_matches::assert_matches;
use chrono::Utc;
use sqlx::SqlitePool;
use yamdb_db::models::comment::{CreateComment, UpdateComment};
use yamdb_db::models::review::{CreateReview, UpdateReview};
use yamdb_db::models::title::CreateTitle;
use yamdb_db::models::user::CreateUser;
use yamdb_db::repositories::{CommentRepo, ReviewRepo, TitleRepo, UserRepo};

struct Fixture {
    user_id: i64,
    title_id: i64,
    other_title_id: i64,
}

async fn setup(pool: &SqlitePool) -> Fixture {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: "critic".into(),
            email: "critic@example.com".into(),
            ..CreateUser::default()
        },
        Utc::now(),
    )
    .await
    .unwrap();

    let mut ids = Vec::new();
    for name in ["Heat", "Ronin"] {
        let title = TitleRepo::create(
            pool,
            &CreateTitle {
                name: name.into(),
                year: 1995,
                description: String::new(),
                category_id: None,
                genre_ids: vec![],
            },
        )
        .await
        .unwrap();
        ids.push(title.id);
    }

    Fixture {
        user_id: user.id,
        title_id: ids[0],
        other_title_id: ids[1],
    }
}

fn review(score: i32) -> CreateReview {
    CreateReview { text: "Great".into(), score }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_review_of_same_title_is_rejected(pool: SqlitePool) {
    let fx = setup(&pool).await;

    let first = ReviewRepo::create(&pool, fx.title_id, fx.user_id, &review(9), Utc::now())
        .await
        .unwrap();
    assert_eq!(first.author, "critic");
    assert_eq!(first.title_id, fx.title_id);
    assert!(ReviewRepo::exists_for_author(&pool, fx.title_id, fx.user_id).await.unwrap());

    let err = ReviewRepo::create(&pool, fx.title_id, fx.user_id, &review(3), Utc::now())
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db) if db.is_unique_violation());

    // The same author may review a different title.
    ReviewRepo::create(&pool, fx.other_title_id, fx.user_id, &review(5), Utc::now())
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_lookup_is_scoped_to_title(pool: SqlitePool) {
    let fx = setup(&pool).await;
    let created = ReviewRepo::create(&pool, fx.title_id, fx.user_id, &review(9), Utc::now())
        .await
        .unwrap();

    assert!(ReviewRepo::find(&pool, fx.title_id, created.id).await.unwrap().is_some());
    assert!(ReviewRepo::find(&pool, fx.other_title_id, created.id).await.unwrap().is_none());
    assert!(!ReviewRepo::delete(&pool, fx.other_title_id, created.id).await.unwrap());
    assert_eq!(ReviewRepo::count(&pool, fx.other_title_id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_update(pool: SqlitePool) {
    let fx = setup(&pool).await;
    let created = ReviewRepo::create(&pool, fx.title_id, fx.user_id, &review(9), Utc::now())
        .await
        .unwrap();

    let updated = ReviewRepo::update(
        &pool,
        fx.title_id,
        created.id,
        &UpdateReview { score: Some(4), text: None },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.score, 4);
    assert_eq!(updated.text, "Great");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comments_cascade_with_review(pool: SqlitePool) {
    let fx = setup(&pool).await;
    let rev = ReviewRepo::create(&pool, fx.title_id, fx.user_id, &review(9), Utc::now())
        .await
        .unwrap();

    let comment = CommentRepo::create(
        &pool,
        rev.id,
        fx.user_id,
        &CreateComment { text: "Agreed".into() },
        Utc::now(),
    )
    .await
    .unwrap();
    assert_eq!(comment.review_id, rev.id);
    assert_eq!(comment.author, "critic");

    let edited = CommentRepo::update(
        &pool,
        rev.id,
        comment.id,
        &UpdateComment { text: Some("Strongly agreed".into()) },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(edited.text, "Strongly agreed");

    assert!(ReviewRepo::delete(&pool, fx.title_id, rev.id).await.unwrap());
    assert_eq!(CommentRepo::count(&pool, rev.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_title_removes_reviews(pool: SqlitePool) {
    let fx = setup(&pool).await;
    ReviewRepo::create(&pool, fx.title_id, fx.user_id, &review(9), Utc::now())
        .await
        .unwrap();

    assert!(TitleRepo::delete(&pool, fx.title_id).await.unwrap());
    assert_eq!(ReviewRepo::count(&pool, fx.title_id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_author_removes_their_content(pool: SqlitePool) {
    let fx = setup(&pool).await;
    ReviewRepo::create(&pool, fx.title_id, fx.user_id, &review(9), Utc::now())
        .await
        .unwrap();

    assert!(UserRepo::delete_by_username(&pool, "critic").await.unwrap());
    assert_eq!(ReviewRepo::count(&pool, fx.title_id).await.unwrap(), 0);
}
