//! Profile edits by the signed-in user.

use actix_web::{HttpResponse, web};
use folio_core::domain::ProfileDraft;
use folio_shared::ApiResponse;
use folio_shared::dto::ProfileRequest;

use super::present;
use crate::middleware::error::AppResult;
use crate::middleware::identity::ViewerIdentity;
use crate::state::AppState;

/// PUT /api/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    body: web::Json<ProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .blog
        .update_profile(
            identity.viewer(),
            ProfileDraft {
                username: req.username,
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(present::profile(&user))))
}
