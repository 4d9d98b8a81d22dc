//! Post page and author-only post edits.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use folio_core::authorship::EntityRef;
use folio_core::domain::PostDraft;
use folio_shared::ApiResponse;
use folio_shared::dto::{AuthorshipResponse, PostRequest};
use uuid::Uuid;

use super::present;
use crate::middleware::error::AppResult;
use crate::middleware::identity::ViewerIdentity;
use crate::state::AppState;

fn draft(req: PostRequest) -> PostDraft {
    PostDraft {
        title: req.title,
        text: req.text,
        pub_date: req.pub_date,
        is_published: req.is_published,
        category_id: req.category_id,
        location_id: req.location_id,
        image: req.image,
    }
}

/// GET /api/posts/{id}
pub async fn show(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = state
        .blog
        .get_post_detail(post_id.into_inner(), identity.viewer(), Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(present::detail(detail))))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .blog
        .create_post(identity.viewer(), draft(body.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(present::bare_post(post))))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    post_id: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .blog
        .update_post(post_id.into_inner(), identity.viewer(), draft(body.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(present::bare_post(post))))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .blog
        .delete_post(post_id.into_inner(), identity.viewer())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/posts/{id}/authorship
pub async fn authorship(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let is_author = state
        .blog
        .check_authorship(EntityRef::Post(post_id.into_inner()), identity.viewer())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(AuthorshipResponse { is_author })))
}
