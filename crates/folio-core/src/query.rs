//! Feed composition types: which posts a feed selects, how they are ordered and
//! what each row carries.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Category, Comment, Location, Post, User, Viewer};
use crate::visibility::is_visible;

/// The scope a feed is requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedContext {
    /// The front page: every post the viewer may see.
    Global,
    /// Posts filed under the category with this slug.
    Category(String),
    /// Posts written by the user with this username.
    Author(String),
}

impl FeedContext {
    pub fn category(slug: impl Into<String>) -> Self {
        Self::Category(slug.into())
    }

    pub fn author(username: impl Into<String>) -> Self {
        Self::Author(username.into())
    }
}

/// Annotations and loading strategy for a feed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Attach the number of comments to every post.
    pub with_comment_count: bool,
    /// Load author, category and location in batched queries alongside the posts.
    pub eager_related: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            with_comment_count: true,
            eager_related: true,
        }
    }
}

/// Visibility restriction applied by a [`PostFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    /// No restriction. Reserved for an author browsing their own profile.
    Everything,
    /// Posts live at `now`, plus any post written by `viewer`.
    VisibleTo { viewer: Viewer, now: DateTime<Utc> },
}

/// A predicate over posts that storage adapters evaluate, either by translating
/// it to SQL or by calling [`PostFilter::matches`] row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostFilter {
    pub scope: VisibilityScope,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
}

impl PostFilter {
    pub fn visible_to(viewer: Viewer, now: DateTime<Utc>) -> Self {
        Self {
            scope: VisibilityScope::VisibleTo { viewer, now },
            category_id: None,
            author_id: None,
        }
    }

    pub fn everything() -> Self {
        Self {
            scope: VisibilityScope::Everything,
            category_id: None,
            author_id: None,
        }
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Evaluate the filter against one post and its category, if any.
    pub fn matches(&self, post: &Post, category: Option<&Category>) -> bool {
        if self.category_id.is_some_and(|id| post.category_id != Some(id)) {
            return false;
        }
        if self.author_id.is_some_and(|id| post.author_id != id) {
            return false;
        }
        match self.scope {
            VisibilityScope::Everything => true,
            VisibilityScope::VisibleTo { viewer, now } => is_visible(post, category, &viewer, now),
        }
    }
}

/// Feed ordering: newest publication first, ties broken by descending id so
/// that paging through a feed never repeats or skips a row.
pub fn feed_order(a: &Post, b: &Post) -> Ordering {
    b.pub_date
        .cmp(&a.pub_date)
        .then_with(|| b.id.cmp(&a.id))
}

/// A post as returned by storage, with whatever relations were loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
    pub post: Post,
    pub author: Option<User>,
    pub category: Option<Category>,
    pub location: Option<Location>,
}

impl PostRecord {
    pub fn bare(post: Post) -> Self {
        Self {
            post,
            author: None,
            category: None,
            location: None,
        }
    }
}

/// A post as handed to callers: the stored record plus annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    pub post: Post,
    pub author: Option<User>,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comment_count: Option<u64>,
}

impl PostView {
    pub fn new(record: PostRecord, comment_count: Option<u64>) -> Self {
        Self {
            post: record.post,
            author: record.author,
            category: record.category,
            location: record.location,
            comment_count,
        }
    }
}

/// A comment together with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_filter_restricts_category_and_author() {
        let now = Utc::now();
        let alice = Uuid::new_v4();
        let travel = Category::new("Travel", "Trips", "travel");
        let post = Post::new(alice, "Tbilisi", "Sulfur baths", now).in_category(travel.id);

        let filter = PostFilter::visible_to(Viewer::Anonymous, now);
        assert!(filter.in_category(travel.id).matches(&post, Some(&travel)));
        assert!(!filter.in_category(Uuid::new_v4()).matches(&post, Some(&travel)));
        assert!(filter.by_author(alice).matches(&post, Some(&travel)));
        assert!(!filter.by_author(Uuid::new_v4()).matches(&post, Some(&travel)));
    }

    #[test]
    fn test_everything_scope_ignores_visibility() {
        let now = Utc::now();
        let post = Post::new(Uuid::new_v4(), "Draft", "Soon", now + Duration::days(3))
            .with_published(false);

        assert!(PostFilter::everything().matches(&post, None));
        assert!(!PostFilter::visible_to(Viewer::Anonymous, now).matches(&post, None));
    }

    #[test]
    fn test_feed_order_breaks_ties_by_id() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let older = Post::new(author, "Older", "", now - Duration::days(1));
        let mut a = Post::new(author, "A", "", now);
        let mut b = Post::new(author, "B", "", now);
        a.id = Uuid::from_u128(1);
        b.id = Uuid::from_u128(2);

        let mut posts = vec![older.clone(), a.clone(), b.clone()];
        posts.sort_by(feed_order);
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["B", "A", "Older"]);
    }
}
