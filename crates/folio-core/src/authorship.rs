//! Authorship guard - checked by every write path before it mutates a post or comment.

use uuid::Uuid;

use crate::domain::{Comment, Post, Viewer};
use crate::error::DomainError;

/// Anything written by a single user.
pub trait Authored {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn author_id(&self) -> Uuid;
}

impl Authored for Post {
    const ENTITY: &'static str = "post";

    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl Authored for Comment {
    const ENTITY: &'static str = "comment";

    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

pub fn is_author<E: Authored>(entity: &E, viewer: &Viewer) -> bool {
    viewer.is(entity.author_id())
}

/// Fails with [`DomainError::Forbidden`] unless `viewer` wrote `entity`.
pub fn assert_author<E: Authored>(entity: &E, viewer: &Viewer) -> Result<(), DomainError> {
    if is_author(entity, viewer) {
        Ok(())
    } else {
        Err(DomainError::Forbidden {
            entity_type: E::ENTITY,
        })
    }
}

/// Reference to an authored entity by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Post(Uuid),
    Comment(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_author_passes() {
        let alice = Uuid::new_v4();
        let post = Post::new(alice, "Title", "Text", Utc::now());
        assert!(assert_author(&post, &Viewer::User(alice)).is_ok());
    }

    #[test]
    fn test_other_user_is_forbidden() {
        let post = Post::new(Uuid::new_v4(), "Title", "Text", Utc::now());
        let result = assert_author(&post, &Viewer::User(Uuid::new_v4()));
        assert!(matches!(
            result,
            Err(DomainError::Forbidden { entity_type: "post" })
        ));
    }

    #[test]
    fn test_anonymous_is_never_author() {
        let comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "Nice", Utc::now());
        assert!(!is_author(&comment, &Viewer::Anonymous));
        assert!(matches!(
            assert_author(&comment, &Viewer::Anonymous),
            Err(DomainError::Forbidden { entity_type: "comment" })
        ));
    }
}
