use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction, Value};
use uuid::Uuid;

use folio_core::domain::{Post, Viewer};
use folio_core::error::RepoError;
use folio_core::pagination::PageWindow;
use folio_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};
use folio_core::query::PostFilter;

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
};

fn post_model(id: Uuid, author_id: Uuid, title: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id,
        title: title.to_owned(),
        text: "Content".to_owned(),
        pub_date: (now - Duration::hours(1)).into(),
        is_published: true,
        category_id: None,
        location_id: None,
        image: None,
        created_at: now.into(),
    }
}

fn user_model(id: Uuid, username: &str) -> user::Model {
    user::Model {
        id,
        username: username.to_owned(),
        first_name: String::new(),
        last_name: String::new(),
        email: format!("{username}@example.com"),
        created_at: Utc::now().into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, author_id, "Test Post")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.expect("post should be found");
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, author_id);
}

#[tokio::test]
async fn test_find_related_loads_author() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, author_id, "With author")]])
        .append_query_results([vec![user_model(author_id, "alice")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let record = repo.find_related(post_id).await.unwrap().unwrap();

    assert_eq!(record.post.id, post_id);
    assert_eq!(record.author.map(|u| u.username), Some("alice".to_string()));
    assert!(record.category.is_none());
    assert!(record.location.is_none());
}

const SELECT_POSTS: &str = r#"SELECT "posts"."id", "posts"."author_id", "posts"."title", "posts"."text", "posts"."pub_date", "posts"."is_published", "posts"."category_id", "posts"."location_id", "posts"."image", "posts"."created_at" FROM "posts""#;

const JOIN_CATEGORIES: &str =
    r#"LEFT JOIN "categories" ON "posts"."category_id" = "categories"."id""#;

const FEED_ORDER: &str = r#"ORDER BY "posts"."pub_date" DESC, "posts"."id" DESC"#;

#[tokio::test]
async fn test_anonymous_feed_query() {
    let author_id = Uuid::new_v4();
    let now = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            post_model(Uuid::new_v4(), author_id, "Newer"),
            post_model(Uuid::new_v4(), author_id, "Older"),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let filter = PostFilter::visible_to(Viewer::Anonymous, now);
    let window = PageWindow::resolve(2, 10, None).unwrap();
    let records = repo
        .find_by_filter(&filter, Some(window), false)
        .await
        .unwrap();

    let titles: Vec<_> = records.iter().map(|r| r.post.title.as_str()).collect();
    assert_eq!(titles, ["Newer", "Older"]);
    assert!(records.iter().all(|r| r.author.is_none()));

    let sql = format!(
        r#"{SELECT_POSTS} {JOIN_CATEGORIES} WHERE "posts"."is_published" = $1 AND "posts"."pub_date" <= $2 AND ("posts"."category_id" IS NULL OR "categories"."is_published" = $3) {FEED_ORDER} LIMIT $4 OFFSET $5"#
    );
    assert_eq!(
        repo.db.into_transaction_log(),
        [Transaction::from_sql_and_values(
            DatabaseBackend::Postgres,
            &sql,
            [
                true.into(),
                now.into(),
                true.into(),
                10u64.into(),
                0u64.into(),
            ],
        )]
    );
}

#[tokio::test]
async fn test_signed_in_category_feed_query() {
    let viewer_id = Uuid::new_v4();
    let category_id = Uuid::new_v4();
    let now = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let filter = PostFilter::visible_to(Viewer::User(viewer_id), now).in_category(category_id);
    let window = PageWindow::resolve(25, 10, Some("3")).unwrap();
    repo.find_by_filter(&filter, Some(window), false)
        .await
        .unwrap();

    let sql = format!(
        r#"{SELECT_POSTS} {JOIN_CATEGORIES} WHERE "posts"."category_id" = $1 AND (("posts"."is_published" = $2 AND "posts"."pub_date" <= $3 AND ("posts"."category_id" IS NULL OR "categories"."is_published" = $4)) OR "posts"."author_id" = $5) {FEED_ORDER} LIMIT $6 OFFSET $7"#
    );
    assert_eq!(
        repo.db.into_transaction_log(),
        [Transaction::from_sql_and_values(
            DatabaseBackend::Postgres,
            &sql,
            [
                category_id.into(),
                true.into(),
                now.into(),
                true.into(),
                viewer_id.into(),
                10u64.into(),
                20u64.into(),
            ],
        )]
    );
}

#[tokio::test]
async fn test_own_profile_query_has_no_visibility_predicate() {
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let filter = PostFilter::everything().by_author(author_id);
    let window = PageWindow::resolve(3, 10, None).unwrap();
    repo.find_by_filter(&filter, Some(window), false)
        .await
        .unwrap();

    let sql = format!(
        r#"{SELECT_POSTS} WHERE "posts"."author_id" = $1 {FEED_ORDER} LIMIT $2 OFFSET $3"#
    );
    assert_eq!(
        repo.db.into_transaction_log(),
        [Transaction::from_sql_and_values(
            DatabaseBackend::Postgres,
            &sql,
            [author_id.into(), 10u64.into(), 0u64.into()],
        )]
    );
}

#[tokio::test]
async fn test_count_comments_by_posts() {
    let busy = Uuid::new_v4();
    let quiet = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![BTreeMap::from([
            ("post_id", Value::from(busy)),
            ("total", Value::from(3i64)),
        ])]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let counts = repo.count_by_posts(&[busy, quiet]).await.unwrap();

    assert_eq!(counts.get(&busy), Some(&3));
    assert_eq!(counts.get(&quiet), None);
}

#[tokio::test]
async fn test_unknown_username() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    assert!(repo.find_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_missing_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}
