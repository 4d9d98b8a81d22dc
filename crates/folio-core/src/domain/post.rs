use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::excerpt;

/// Post entity - a publication written by a user.
///
/// A `pub_date` in the future schedules the post: it stays hidden from
/// everyone but its author until that instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new published post without category or location.
    pub fn new(
        author_id: Uuid,
        title: impl Into<String>,
        text: impl Into<String>,
        pub_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: title.into(),
            text: text.into(),
            pub_date,
            is_published: true,
            category_id: None,
            location_id: None,
            image: None,
            created_at: Utc::now(),
        }
    }

    /// Build a post for `author_id` from submitted fields.
    pub fn from_draft(author_id: Uuid, draft: PostDraft) -> Self {
        let mut post = Self::new(author_id, String::new(), String::new(), draft.pub_date);
        post.apply(draft);
        post
    }

    /// Overwrite every editable field with the draft's values.
    /// Identity, authorship and creation time are left untouched.
    pub fn apply(&mut self, draft: PostDraft) {
        self.title = draft.title;
        self.text = draft.text;
        self.pub_date = draft.pub_date;
        self.is_published = draft.is_published;
        self.category_id = draft.category_id;
        self.location_id = draft.location_id;
        self.image = draft.image;
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn at_location(mut self, location_id: Uuid) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = is_published;
        self
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", excerpt(&self.title), excerpt(&self.text))
    }
}

/// The author-editable fields of a post, as submitted on create or edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_apply_keeps_identity() {
        let author = Uuid::new_v4();
        let mut post = Post::new(author, "Old", "Old text", Utc::now());
        let id = post.id;
        let created_at = post.created_at;

        post.apply(PostDraft {
            title: "New".to_string(),
            text: "New text".to_string(),
            pub_date: Utc::now() + Duration::days(1),
            is_published: false,
            category_id: Some(Uuid::new_v4()),
            location_id: None,
            image: Some("post_images/cover.jpg".to_string()),
        });

        assert_eq!(post.id, id);
        assert_eq!(post.author_id, author);
        assert_eq!(post.created_at, created_at);
        assert_eq!(post.title, "New");
        assert!(!post.is_published);
        assert!(post.category_id.is_some());
    }

    #[test]
    fn test_display_uses_excerpts() {
        let post = Post::new(Uuid::new_v4(), "Title", "x".repeat(80), Utc::now());
        assert_eq!(post.to_string(), format!("Title: {}...", "x".repeat(47)));
    }
}
