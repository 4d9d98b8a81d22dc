use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Blog;
use crate::authorship::assert_author;
use crate::domain::{Comment, Post, PostDraft, ProfileDraft, User, Viewer};
use crate::error::DomainError;
use crate::visibility::comments_visible;

fn require_user(viewer: &Viewer) -> Result<Uuid, DomainError> {
    viewer.user_id().ok_or(DomainError::Unauthorized)
}

fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

impl Blog {
    /// Publish a new post written by `viewer`.
    pub async fn create_post(&self, viewer: &Viewer, draft: PostDraft) -> Result<Post, DomainError> {
        let author_id = require_user(viewer)?;
        self.check_draft(&draft).await?;

        let post = self
            .repos
            .posts
            .save(Post::from_draft(author_id, draft))
            .await?;
        tracing::info!(post_id = %post.id, %author_id, "Post created");
        Ok(post)
    }

    /// Replace the editable fields of a post. Only its author may do this.
    pub async fn update_post(
        &self,
        post_id: Uuid,
        viewer: &Viewer,
        draft: PostDraft,
    ) -> Result<Post, DomainError> {
        require_user(viewer)?;
        let mut post = self.find_post(post_id).await?;
        assert_author(&post, viewer)?;
        self.check_draft(&draft).await?;

        post.apply(draft);
        let post = self.repos.posts.save(post).await?;
        tracing::info!(%post_id, "Post updated");
        Ok(post)
    }

    /// Delete a post and, with it, its comments. Only its author may do this.
    pub async fn delete_post(&self, post_id: Uuid, viewer: &Viewer) -> Result<(), DomainError> {
        require_user(viewer)?;
        let post = self.find_post(post_id).await?;
        assert_author(&post, viewer)?;

        self.repos.posts.delete(post_id).await?;
        tracing::info!(%post_id, "Post deleted");
        Ok(())
    }

    /// Comment on a post the viewer can currently see.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        viewer: &Viewer,
        text: String,
        now: DateTime<Utc>,
    ) -> Result<Comment, DomainError> {
        let author_id = require_user(viewer)?;
        let record = self.fetch_post(post_id).await?;
        if !comments_visible(&record.post, record.category.as_ref(), viewer, now) {
            return Err(DomainError::not_found("post", post_id));
        }
        require_text("text", &text)?;

        let comment = self
            .repos
            .comments
            .save(Comment::new(post_id, author_id, text, now))
            .await?;
        tracing::info!(comment_id = %comment.id, %post_id, "Comment added");
        Ok(comment)
    }

    /// Change the text of a comment. Only its author may do this.
    pub async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        viewer: &Viewer,
        text: String,
    ) -> Result<Comment, DomainError> {
        require_user(viewer)?;
        let mut comment = self.find_comment(post_id, comment_id).await?;
        assert_author(&comment, viewer)?;
        require_text("text", &text)?;

        comment.text = text;
        let comment = self.repos.comments.save(comment).await?;
        tracing::info!(%comment_id, %post_id, "Comment updated");
        Ok(comment)
    }

    /// Remove a comment. Only its author may do this.
    pub async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        viewer: &Viewer,
    ) -> Result<(), DomainError> {
        require_user(viewer)?;
        let comment = self.find_comment(post_id, comment_id).await?;
        assert_author(&comment, viewer)?;

        self.repos.comments.delete(comment_id).await?;
        tracing::info!(%comment_id, %post_id, "Comment deleted");
        Ok(())
    }

    /// Edit the viewer's own profile. A taken username surfaces as a
    /// store constraint violation.
    pub async fn update_profile(
        &self,
        viewer: &Viewer,
        draft: ProfileDraft,
    ) -> Result<User, DomainError> {
        let user_id = require_user(viewer)?;
        require_text("username", &draft.username)?;

        let mut user = self
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))?;
        user.apply(draft);

        let user = self.repos.users.save(user).await?;
        tracing::info!(%user_id, username = %user.username, "Profile updated");
        Ok(user)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    /// A comment addressed through its post; a comment under another post is not found.
    async fn find_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.repos
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }

    async fn check_draft(&self, draft: &PostDraft) -> Result<(), DomainError> {
        require_text("title", &draft.title)?;
        require_text("text", &draft.text)?;

        if let Some(category_id) = draft.category_id
            && self.repos.categories.find_by_id(category_id).await?.is_none()
        {
            return Err(DomainError::not_found("category", category_id));
        }
        if let Some(location_id) = draft.location_id
            && self.repos.locations.find_by_id(location_id).await?.is_none()
        {
            return Err(DomainError::not_found("location", location_id));
        }
        Ok(())
    }
}
