//! Comments under a post.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use folio_shared::ApiResponse;
use folio_shared::dto::CommentRequest;
use uuid::Uuid;

use super::present;
use crate::middleware::error::AppResult;
use crate::middleware::identity::ViewerIdentity;
use crate::state::AppState;

/// GET /api/posts/{id}/comments
pub async fn list(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comments = state
        .blog
        .post_comments(post_id.into_inner(), identity.viewer(), Utc::now())
        .await?;
    let comments: Vec<_> = comments.into_iter().map(present::comment).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comments)))
}

/// POST /api/posts/{id}/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    post_id: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .blog
        .add_comment(
            post_id.into_inner(),
            identity.viewer(),
            body.into_inner().text,
            Utc::now(),
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(present::bare_comment(comment))))
}

/// PUT /api/posts/{id}/comments/{comment_id}
pub async fn update(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = state
        .blog
        .update_comment(post_id, comment_id, identity.viewer(), body.into_inner().text)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(present::bare_comment(comment))))
}

/// DELETE /api/posts/{id}/comments/{comment_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state
        .blog
        .delete_comment(post_id, comment_id, identity.viewer())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
