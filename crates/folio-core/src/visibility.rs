//! Visibility rules - which posts a viewer may see at a given instant.
//!
//! Every check takes `now` from the caller so results never depend on a
//! hidden clock.

use chrono::{DateTime, Utc};

use crate::domain::{Category, Post, Viewer};

/// Whether `post` is live for the general public at `now`.
///
/// `category` is the post's category when it has one. A live post is
/// published, has a publication date that is not in the future, and is
/// either uncategorised or filed under a published category.
pub fn is_live(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published && post.pub_date <= now && category.is_none_or(|c| c.is_published)
}

/// Whether `viewer` may see `post` at `now`. Authors always see their own posts,
/// including drafts and scheduled ones.
pub fn is_visible(
    post: &Post,
    category: Option<&Category>,
    viewer: &Viewer,
    now: DateTime<Utc>,
) -> bool {
    viewer.is(post.author_id) || is_live(post, category, now)
}

/// Comments follow their post: they are readable exactly when the post is.
pub fn comments_visible(
    post: &Post,
    category: Option<&Category>,
    viewer: &Viewer,
    now: DateTime<Utc>,
) -> bool {
    is_visible(post, category, viewer, now)
}
