//! Paginated feeds: the front page, category pages and author profiles.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use folio_core::query::{FeedContext, QueryOptions};
use folio_shared::ApiResponse;
use folio_shared::dto::{FeedResponse, PageQuery};

use super::present;
use crate::middleware::error::AppResult;
use crate::middleware::identity::ViewerIdentity;
use crate::state::AppState;

async fn render(
    state: &AppState,
    identity: &ViewerIdentity,
    context: FeedContext,
    query: PageQuery,
) -> AppResult<HttpResponse> {
    let feed = state
        .blog
        .resolve_feed(&context, identity.viewer(), Utc::now())
        .await?;
    let page = state
        .blog
        .page_feed(&feed, &state.page_request(query), QueryOptions::default())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(FeedResponse {
        category: feed.category.as_ref().map(present::category),
        profile: feed.author.as_ref().map(present::profile),
        posts: present::page(page),
    })))
}

/// GET /api/posts?page=N
pub async fn index(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    render(&state, &identity, FeedContext::Global, query.into_inner()).await
}

/// GET /api/category/{slug}?page=N
pub async fn category_posts(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let context = FeedContext::category(slug.into_inner());
    render(&state, &identity, context, query.into_inner()).await
}

/// GET /api/profile/{username}?page=N
///
/// The profile owner also sees their drafts and scheduled posts.
pub async fn profile(
    state: web::Data<AppState>,
    identity: ViewerIdentity,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let context = FeedContext::author(username.into_inner());
    render(&state, &identity, context, query.into_inner()).await
}
