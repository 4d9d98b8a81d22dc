//! HTTP handlers and route configuration.

mod comments;
mod feeds;
mod health;
mod posts;
mod present;
mod users;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/category/{slug}", web::get().to(feeds::category_posts))
            .route("/profile", web::put().to(users::update_profile))
            .route("/profile/{username}", web::get().to(feeds::profile))
            .service(
                web::scope("/posts")
                    .route("", web::get().to(feeds::index))
                    .route("", web::post().to(posts::create))
                    .route("/{id}", web::get().to(posts::show))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/authorship", web::get().to(posts::authorship))
                    .route("/{id}/comments", web::get().to(comments::list))
                    .route("/{id}/comments", web::post().to(comments::create))
                    .route("/{id}/comments/{comment_id}", web::put().to(comments::update))
                    .route(
                        "/{id}/comments/{comment_id}",
                        web::delete().to(comments::delete),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use chrono::{Duration, Utc};
    use folio_core::Blog;
    use folio_core::domain::{Category, Post, User};
    use folio_infra::InMemoryStore;
    use serde_json::{Value, json};

    use super::*;
    use crate::middleware::identity::VIEWER_HEADER;
    use crate::state::AppState;

    struct Seed {
        state: AppState,
        alice: User,
        hidden: Category,
    }

    async fn seed() -> Seed {
        let blog = Blog::new(InMemoryStore::new().repositories());
        let repos = blog.repositories();
        let alice = repos.users.save(User::new("alice", "alice@example.com")).await.unwrap();
        let hidden = repos
            .categories
            .save(Category::new("Hidden", "Not yet", "hidden").with_published(false))
            .await
            .unwrap();

        let now = Utc::now();
        for i in 0..3 {
            let post = Post::new(alice.id, format!("Post {i}"), "Text", now - Duration::hours(i));
            repos.posts.save(post).await.unwrap();
        }
        let draft = Post::new(alice.id, "Draft", "Soon", now).with_published(false);
        repos.posts.save(draft).await.unwrap();

        Seed {
            state: AppState::new(blog, 2),
            alice,
            hidden,
        }
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_index_pages_visible_posts() {
        let seed = seed().await;
        let app = app!(seed.state);

        let req = test::TestRequest::get().uri("/api/posts?page=2").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let posts = &body["data"]["posts"];
        assert_eq!(posts["total_count"], 3);
        assert_eq!(posts["total_pages"], 2);
        assert_eq!(posts["page"], 2);
        assert_eq!(posts["items"][0]["title"], "Post 2");
        assert_eq!(posts["items"][0]["comment_count"], 0);
    }

    #[actix_web::test]
    async fn test_garbage_page_falls_back_to_first() {
        let seed = seed().await;
        let app = app!(seed.state);

        let req = test::TestRequest::get().uri("/api/posts?page=abc").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["posts"]["page"], 1);
        assert_eq!(body["data"]["posts"]["items"][0]["title"], "Post 0");
    }

    #[actix_web::test]
    async fn test_profile_owner_sees_drafts() {
        let seed = seed().await;
        let app = app!(seed.state);

        let req = test::TestRequest::get().uri("/api/profile/alice").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["posts"]["total_count"], 3);
        assert_eq!(body["data"]["profile"]["username"], "alice");

        let req = test::TestRequest::get()
            .uri("/api/profile/alice")
            .insert_header((VIEWER_HEADER, seed.alice.id.to_string()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["posts"]["total_count"], 4);
    }

    #[actix_web::test]
    async fn test_unpublished_category_is_not_found() {
        let seed = seed().await;
        let app = app!(seed.state);

        let uri = format!("/api/category/{}", seed.hidden.slug);
        let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/profile/nobody").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_writes_require_a_viewer() {
        let seed = seed().await;
        let app = app!(seed.state);
        let body = json!({
            "title": "Hello",
            "text": "World",
            "pub_date": Utc::now(),
        });

        let req = test::TestRequest::post().uri("/api/posts").set_json(&body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((VIEWER_HEADER, "not-a-uuid"))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((VIEWER_HEADER, seed.alice.id.to_string()))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn test_comment_flow_and_detail() {
        let seed = seed().await;
        let app = app!(seed.state);
        let bob = seed
            .state
            .blog
            .repositories()
            .users
            .save(User::new("bob", "bob@example.com"))
            .await
            .unwrap();

        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let post_id = body["data"]["posts"]["items"][0]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{post_id}/comments"))
            .insert_header((VIEWER_HEADER, bob.id.to_string()))
            .set_json(json!({ "text": "Nice one" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let comment_id = created["data"]["id"].as_str().unwrap().to_string();

        // Alice did not write the comment.
        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{post_id}/comments/{comment_id}"))
            .insert_header((VIEWER_HEADER, seed.alice.id.to_string()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{post_id}"))
            .insert_header((VIEWER_HEADER, seed.alice.id.to_string()))
            .to_request();
        let detail: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(detail["data"]["is_author"], true);
        assert_eq!(detail["data"]["post"]["comment_count"], 1);
        assert_eq!(detail["data"]["comments"][0]["author"]["username"], "bob");

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{post_id}/authorship"))
            .insert_header((VIEWER_HEADER, bob.id.to_string()))
            .to_request();
        let authorship: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(authorship["data"]["is_author"], false);
    }

    #[actix_web::test]
    async fn test_profile_edit() {
        let seed = seed().await;
        let app = app!(seed.state);
        seed.state
            .blog
            .repositories()
            .users
            .save(User::new("bob", "bob@example.com"))
            .await
            .unwrap();
        let body = |username: &str| {
            json!({
                "username": username,
                "first_name": "Alice",
                "last_name": "Liddell",
                "email": "alice@example.com",
            })
        };

        let req = test::TestRequest::put()
            .uri("/api/profile")
            .set_json(body("alice_l"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::put()
            .uri("/api/profile")
            .insert_header((VIEWER_HEADER, seed.alice.id.to_string()))
            .set_json(body("bob"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::put()
            .uri("/api/profile")
            .insert_header((VIEWER_HEADER, seed.alice.id.to_string()))
            .set_json(body(""))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::put()
            .uri("/api/profile")
            .insert_header((VIEWER_HEADER, seed.alice.id.to_string()))
            .set_json(body("alice_l"))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["data"]["username"], "alice_l");
        assert_eq!(updated["data"]["last_name"], "Liddell");

        let req = test::TestRequest::get().uri("/api/profile/alice_l").to_request();
        let feed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(feed["data"]["posts"]["total_count"], 3);
    }

    #[actix_web::test]
    async fn test_in_memory_store_is_writable_after_seeding() {
        let state = AppState::connect(None, 10, true).await;
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri(&format!("/api/profile/{}", crate::state::DEMO_USERNAME))
            .to_request();
        let feed: Value = test::call_and_read_body_json(&app, req).await;
        let demo_id = feed["data"]["profile"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((VIEWER_HEADER, demo_id))
            .set_json(json!({ "title": "First", "text": "Hello", "pub_date": Utc::now() }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/api/category/general").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_unseeded_in_memory_store_is_empty() {
        let state = AppState::connect(None, 10, false).await;
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri(&format!("/api/profile/{}", crate::state::DEMO_USERNAME))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
