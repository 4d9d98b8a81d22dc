//! Domain views to wire DTOs.

use folio_core::domain::{Category, Comment, Location, Post, User};
use folio_core::pagination::Page;
use folio_core::query::{CommentView, PostView};
use folio_core::service::PostDetail;
use folio_shared::dto::{
    AuthorSummary, CategorySummary, CommentResponse, PageResponse, PostDetailResponse,
    PostResponse, ProfileResponse,
};

pub fn author(user: &User) -> AuthorSummary {
    AuthorSummary {
        id: user.id,
        username: user.username.clone(),
        display_name: user.display_name(),
    }
}

pub fn category(category: &Category) -> CategorySummary {
    CategorySummary {
        id: category.id,
        title: category.title.clone(),
        slug: category.slug.clone(),
        description: category.description.clone(),
    }
}

pub fn profile(user: &User) -> ProfileResponse {
    ProfileResponse {
        id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        joined_at: user.created_at,
    }
}

/// Unpublished locations are not shown.
fn location(location: Option<&Location>) -> Option<String> {
    location
        .filter(|l| l.is_published)
        .map(|l| l.name.clone())
}

pub fn post(view: PostView) -> PostResponse {
    let PostView {
        post,
        author: post_author,
        category: post_category,
        location: post_location,
        comment_count,
    } = view;

    PostResponse {
        author: post_author.as_ref().map(author),
        category: post_category.as_ref().map(category),
        location: location(post_location.as_ref()),
        comment_count,
        ..bare_post(post)
    }
}

/// A freshly written post; relations are referenced by id only.
pub fn bare_post(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        is_published: post.is_published,
        image: post.image,
        author: None,
        category: None,
        location: None,
        comment_count: None,
        created_at: post.created_at,
    }
}

pub fn comment(view: CommentView) -> CommentResponse {
    CommentResponse {
        author: view.author.as_ref().map(author),
        ..bare_comment(view.comment)
    }
}

pub fn bare_comment(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        text: comment.text,
        author: None,
        created_at: comment.created_at,
    }
}

pub fn page(page: Page<PostView>) -> PageResponse<PostResponse> {
    let page = page.map(post);
    PageResponse {
        items: page.items,
        page: page.page_number,
        total_pages: page.total_pages,
        total_count: page.total_count,
        page_size: page.page_size,
        has_next: page.has_next,
        has_previous: page.has_previous,
    }
}

pub fn detail(detail: PostDetail) -> PostDetailResponse {
    PostDetailResponse {
        post: post(detail.view),
        comments: detail.comments.into_iter().map(comment).collect(),
        is_author: detail.is_author,
    }
}
