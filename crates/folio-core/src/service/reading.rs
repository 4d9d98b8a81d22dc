use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::Blog;
use crate::authorship::is_author;
use crate::domain::{Category, User, Viewer};
use crate::error::DomainError;
use crate::pagination::{Page, PageRequest, PageWindow};
use crate::query::{CommentView, FeedContext, PostFilter, PostRecord, PostView, QueryOptions};
use crate::visibility::{comments_visible, is_visible};

/// A feed context resolved against storage: the filter to run plus the
/// category or profile the feed belongs to.
#[derive(Debug, Clone)]
pub struct Feed {
    pub filter: PostFilter,
    pub category: Option<Category>,
    pub author: Option<User>,
}

/// Everything the post page shows.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub view: PostView,
    pub comments: Vec<CommentView>,
    pub is_author: bool,
}

impl Blog {
    /// Resolve `context` for `viewer`.
    ///
    /// Category feeds fail with `NotFound` when the slug is unknown or the
    /// category is unpublished; author feeds fail when the username is unknown.
    pub async fn resolve_feed(
        &self,
        context: &FeedContext,
        viewer: &Viewer,
        now: DateTime<Utc>,
    ) -> Result<Feed, DomainError> {
        let visible = PostFilter::visible_to(*viewer, now);

        match context {
            FeedContext::Global => Ok(Feed {
                filter: visible,
                category: None,
                author: None,
            }),
            FeedContext::Category(slug) => {
                let category = self
                    .repos
                    .categories
                    .find_by_slug(slug)
                    .await?
                    .filter(|c| c.is_published)
                    .ok_or_else(|| DomainError::not_found("category", slug))?;

                Ok(Feed {
                    filter: visible.in_category(category.id),
                    category: Some(category),
                    author: None,
                })
            }
            FeedContext::Author(username) => {
                let author = self
                    .repos
                    .users
                    .find_by_username(username)
                    .await?
                    .ok_or_else(|| DomainError::not_found("user", username))?;

                // Authors browsing their own profile see drafts and scheduled posts.
                let base = if viewer.is(author.id) {
                    PostFilter::everything()
                } else {
                    visible
                };

                Ok(Feed {
                    filter: base.by_author(author.id),
                    category: None,
                    author: Some(author),
                })
            }
        }
    }

    /// Every post of a feed, in feed order.
    pub async fn get_posts(
        &self,
        context: &FeedContext,
        viewer: &Viewer,
        now: DateTime<Utc>,
        options: QueryOptions,
    ) -> Result<Vec<PostView>, DomainError> {
        let feed = self.resolve_feed(context, viewer, now).await?;
        let records = self
            .repos
            .posts
            .find_by_filter(&feed.filter, None, options.eager_related)
            .await?;
        self.annotate(records, options).await
    }

    /// One page of a feed.
    pub async fn list_posts(
        &self,
        context: &FeedContext,
        viewer: &Viewer,
        now: DateTime<Utc>,
        request: &PageRequest,
        options: QueryOptions,
    ) -> Result<Page<PostView>, DomainError> {
        let feed = self.resolve_feed(context, viewer, now).await?;
        self.page_feed(&feed, request, options).await
    }

    /// One page of an already resolved feed.
    pub async fn page_feed(
        &self,
        feed: &Feed,
        request: &PageRequest,
        options: QueryOptions,
    ) -> Result<Page<PostView>, DomainError> {
        if request.page_size < 1 {
            return Err(DomainError::InvalidPageSize(request.page_size));
        }

        let total = self.repos.posts.count_by_filter(&feed.filter).await?;
        let window = PageWindow::resolve(total, request.page_size, request.page())?;
        tracing::debug!(
            total,
            page = window.number,
            total_pages = window.total_pages,
            "Listing posts"
        );

        let records = if total == 0 {
            Vec::new()
        } else {
            self.repos
                .posts
                .find_by_filter(&feed.filter, Some(window), options.eager_related)
                .await?
        };
        let views = self.annotate(records, options).await?;

        Ok(Page::new(views, window))
    }

    /// A single post, if `viewer` may see it at `now`.
    pub async fn get_post(
        &self,
        post_id: Uuid,
        viewer: &Viewer,
        now: DateTime<Utc>,
    ) -> Result<PostView, DomainError> {
        let record = self.fetch_post(post_id).await?;
        if !is_visible(&record.post, record.category.as_ref(), viewer, now) {
            tracing::debug!(%post_id, "Post hidden from viewer");
            return Err(DomainError::not_found("post", post_id));
        }
        let count = self.repos.comments.count_by_post(post_id).await?;
        Ok(PostView::new(record, Some(count)))
    }

    /// Comments under a post, oldest first. Hidden posts have no readable comments.
    pub async fn post_comments(
        &self,
        post_id: Uuid,
        viewer: &Viewer,
        now: DateTime<Utc>,
    ) -> Result<Vec<CommentView>, DomainError> {
        let record = self.fetch_post(post_id).await?;
        if !comments_visible(&record.post, record.category.as_ref(), viewer, now) {
            return Err(DomainError::not_found("post", post_id));
        }
        Ok(self.repos.comments.find_by_post(post_id).await?)
    }

    /// The post page: the post, its comments and whether `viewer` may edit it.
    pub async fn get_post_detail(
        &self,
        post_id: Uuid,
        viewer: &Viewer,
        now: DateTime<Utc>,
    ) -> Result<PostDetail, DomainError> {
        let record = self.fetch_post(post_id).await?;
        if !is_visible(&record.post, record.category.as_ref(), viewer, now) {
            return Err(DomainError::not_found("post", post_id));
        }
        let comments = self.repos.comments.find_by_post(post_id).await?;
        let is_author = is_author(&record.post, viewer);

        Ok(PostDetail {
            view: PostView::new(record, Some(comments.len() as u64)),
            comments,
            is_author,
        })
    }

    pub(super) async fn fetch_post(&self, post_id: Uuid) -> Result<PostRecord, DomainError> {
        self.repos
            .posts
            .find_related(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn annotate(
        &self,
        records: Vec<PostRecord>,
        options: QueryOptions,
    ) -> Result<Vec<PostView>, DomainError> {
        if !options.with_comment_count {
            return Ok(records
                .into_iter()
                .map(|record| PostView::new(record, None))
                .collect());
        }

        let ids: Vec<Uuid> = records.iter().map(|r| r.post.id).collect();
        let counts = if ids.is_empty() {
            HashMap::new()
        } else {
            self.repos.comments.count_by_posts(&ids).await?
        };

        Ok(records
            .into_iter()
            .map(|record| {
                let count = counts.get(&record.post.id).copied().unwrap_or(0);
                PostView::new(record, Some(count))
            })
            .collect())
    }
}
