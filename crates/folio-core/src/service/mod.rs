//! The blog service: feed queries, post detail and author-guarded writes.

mod reading;
mod writing;

pub use reading::{Feed, PostDetail};

use crate::authorship::{EntityRef, is_author};
use crate::domain::Viewer;
use crate::error::DomainError;
use crate::ports::Repositories;

/// Entry point for the HTTP layer. Holds the repositories and nothing else;
/// every call is independent of the previous one.
#[derive(Clone)]
pub struct Blog {
    repos: Repositories,
}

impl Blog {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    /// Whether `viewer` wrote the referenced post or comment.
    pub async fn check_authorship(
        &self,
        entity: EntityRef,
        viewer: &Viewer,
    ) -> Result<bool, DomainError> {
        match entity {
            EntityRef::Post(id) => {
                let post = self
                    .repos
                    .posts
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("post", id))?;
                Ok(is_author(&post, viewer))
            }
            EntityRef::Comment(id) => {
                let comment = self
                    .repos
                    .comments
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("comment", id))?;
                Ok(is_author(&comment, viewer))
            }
        }
    }
}
