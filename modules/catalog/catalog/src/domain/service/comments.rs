use std::sync::Arc;

use catalog_sdk::{Comment, CommentPatch, NewComment, Page, PageRequest};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use yamdb_authz::{Action, PolicyEnforcer};
use yamdb_security::SecurityContext;

use super::resources;
use crate::domain::error::{DomainError, Violations};
use crate::domain::models::{NewCommentRecord, Owned};
use crate::domain::repos::{CommentsRepository, ReviewsRepository};
use crate::domain::validation;

/// Comments service. A comment is only reachable through its review, and
/// the review only through the title in the path.
pub struct CommentsService {
    reviews: Arc<dyn ReviewsRepository>,
    repo: Arc<dyn CommentsRepository>,
    enforcer: PolicyEnforcer,
}

impl CommentsService {
    pub fn new(
        reviews: Arc<dyn ReviewsRepository>,
        repo: Arc<dyn CommentsRepository>,
        enforcer: PolicyEnforcer,
    ) -> Self {
        Self {
            reviews,
            repo,
            enforcer,
        }
    }

    #[instrument(skip(self, ctx), fields(title_id = %title_id, review_id = %review_id))]
    pub async fn list(
        &self,
        ctx: &SecurityContext,
        title_id: Uuid,
        review_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError> {
        self.enforcer.check_class(ctx, &resources::COMMENT, Action::List)?;
        self.require_review(title_id, review_id).await?;

        let page = self.repo.list(review_id, page).await?;

        debug!("Listed {} of {} comments", page.results.len(), page.count);
        Ok(page)
    }

    #[instrument(skip(self, ctx), fields(review_id = %review_id, comment_id = %comment_id))]
    pub async fn get(
        &self,
        ctx: &SecurityContext,
        title_id: Uuid,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Comment, DomainError> {
        self.enforcer.check_class(ctx, &resources::COMMENT, Action::Get)?;
        Ok(self.load(title_id, review_id, comment_id).await?.item)
    }

    #[instrument(skip(self, ctx, new_comment), fields(title_id = %title_id, review_id = %review_id))]
    pub async fn create(
        &self,
        ctx: &SecurityContext,
        title_id: Uuid,
        review_id: Uuid,
        new_comment: NewComment,
    ) -> Result<Comment, DomainError> {
        info!("Creating comment");

        self.enforcer.check_class(ctx, &resources::COMMENT, Action::Create)?;
        let author = ctx.identity().ok_or(DomainError::Unauthenticated)?;

        self.require_review(title_id, review_id).await?;

        let mut v = Violations::new();
        validation::not_blank(&mut v, "text", &new_comment.text);
        v.finish()?;

        let id = Uuid::now_v7();
        self.repo
            .create(NewCommentRecord {
                id,
                review_id,
                author_id: author.user_id,
                text: new_comment.text,
                pub_date: OffsetDateTime::now_utc(),
            })
            .await?;

        info!(comment_id = %id, "Created comment");
        Ok(self.load(title_id, review_id, id).await?.item)
    }

    #[instrument(skip(self, ctx, patch), fields(review_id = %review_id, comment_id = %comment_id))]
    pub async fn update(
        &self,
        ctx: &SecurityContext,
        title_id: Uuid,
        review_id: Uuid,
        comment_id: Uuid,
        patch: CommentPatch,
    ) -> Result<Comment, DomainError> {
        info!("Updating comment");

        self.enforcer.check_class(ctx, &resources::COMMENT, Action::Update)?;
        let current = self.load(title_id, review_id, comment_id).await?;
        self.enforcer
            .check_object(ctx, &resources::COMMENT, Action::Update, current.owner_id)?;

        let Some(text) = patch.text else {
            return Ok(current.item);
        };
        let mut v = Violations::new();
        validation::not_blank(&mut v, "text", &text);
        v.finish()?;

        self.repo.update(comment_id, text).await?;

        info!("Updated comment");
        Ok(self.load(title_id, review_id, comment_id).await?.item)
    }

    #[instrument(skip(self, ctx), fields(review_id = %review_id, comment_id = %comment_id))]
    pub async fn delete(
        &self,
        ctx: &SecurityContext,
        title_id: Uuid,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), DomainError> {
        info!("Deleting comment");

        self.enforcer.check_class(ctx, &resources::COMMENT, Action::Delete)?;
        let current = self.load(title_id, review_id, comment_id).await?;
        self.enforcer
            .check_object(ctx, &resources::COMMENT, Action::Delete, current.owner_id)?;

        if !self.repo.delete(comment_id).await? {
            return Err(DomainError::not_found("comment", comment_id));
        }

        info!("Deleted comment");
        Ok(())
    }

    async fn require_review(&self, title_id: Uuid, review_id: Uuid) -> Result<(), DomainError> {
        match self.reviews.get(title_id, review_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("review", review_id)),
        }
    }

    async fn load(
        &self,
        title_id: Uuid,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Owned<Comment>, DomainError> {
        self.require_review(title_id, review_id).await?;
        self.repo
            .get(review_id, comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }
}
