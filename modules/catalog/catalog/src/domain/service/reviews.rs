use std::sync::Arc;

use catalog_sdk::{NewReview, Page, PageRequest, Review, ReviewPatch};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use yamdb_authz::{Action, PolicyEnforcer};
use yamdb_security::SecurityContext;

use super::resources;
use crate::domain::error::{DomainError, Violations};
use crate::domain::models::{NewReviewRecord, Owned};
use crate::domain::repos::{ReviewsRepository, TitlesRepository};
use crate::domain::validation;

/// Reviews service.
///
/// A user reviews a title at most once. The check here gives the common
/// case a clear error; the `(title_id, author_id)` unique index settles
/// concurrent attempts, and the repository reports the loser as the same
/// conflict.
pub struct ReviewsService {
    titles: Arc<dyn TitlesRepository>,
    repo: Arc<dyn ReviewsRepository>,
    enforcer: PolicyEnforcer,
}

impl ReviewsService {
    pub fn new(
        titles: Arc<dyn TitlesRepository>,
        repo: Arc<dyn ReviewsRepository>,
        enforcer: PolicyEnforcer,
    ) -> Self {
        Self {
            titles,
            repo,
            enforcer,
        }
    }

    #[instrument(skip(self, ctx), fields(title_id = %title_id))]
    pub async fn list(
        &self,
        ctx: &SecurityContext,
        title_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Review>, DomainError> {
        self.enforcer.check_class(ctx, &resources::REVIEW, Action::List)?;
        self.require_title(title_id).await?;

        let page = self.repo.list(title_id, page).await?;

        debug!("Listed {} of {} reviews", page.results.len(), page.count);
        Ok(page)
    }

    #[instrument(skip(self, ctx), fields(title_id = %title_id, review_id = %review_id))]
    pub async fn get(
        &self,
        ctx: &SecurityContext,
        title_id: Uuid,
        review_id: Uuid,
    ) -> Result<Review, DomainError> {
        self.enforcer.check_class(ctx, &resources::REVIEW, Action::Get)?;
        Ok(self.load(title_id, review_id).await?.item)
    }

    #[instrument(skip(self, ctx, new_review), fields(title_id = %title_id, score = new_review.score))]
    pub async fn create(
        &self,
        ctx: &SecurityContext,
        title_id: Uuid,
        new_review: NewReview,
    ) -> Result<Review, DomainError> {
        info!("Creating review");

        self.enforcer.check_class(ctx, &resources::REVIEW, Action::Create)?;
        let author = ctx.identity().ok_or(DomainError::Unauthenticated)?;

        self.require_title(title_id).await?;

        let mut v = Violations::new();
        validation::not_blank(&mut v, "text", &new_review.text);
        validation::score(&mut v, new_review.score);
        v.finish()?;

        if self.repo.exists_for_author(title_id, author.user_id).await? {
            return Err(DomainError::conflict("title", validation::DUPLICATE_REVIEW));
        }

        let id = Uuid::now_v7();
        self.repo
            .create(NewReviewRecord {
                id,
                title_id,
                author_id: author.user_id,
                text: new_review.text,
                score: new_review.score,
                pub_date: OffsetDateTime::now_utc(),
            })
            .await?;

        info!(review_id = %id, "Created review");
        Ok(self.load(title_id, id).await?.item)
    }

    #[instrument(skip(self, ctx, patch), fields(title_id = %title_id, review_id = %review_id))]
    pub async fn update(
        &self,
        ctx: &SecurityContext,
        title_id: Uuid,
        review_id: Uuid,
        patch: ReviewPatch,
    ) -> Result<Review, DomainError> {
        info!("Updating review");

        self.enforcer.check_class(ctx, &resources::REVIEW, Action::Update)?;
        let current = self.load(title_id, review_id).await?;
        self.enforcer
            .check_object(ctx, &resources::REVIEW, Action::Update, current.owner_id)?;

        let mut v = Violations::new();
        if let Some(text) = &patch.text {
            validation::not_blank(&mut v, "text", text);
        }
        if let Some(score) = patch.score {
            validation::score(&mut v, score);
        }
        v.finish()?;

        self.repo.update(review_id, patch.text, patch.score).await?;

        info!("Updated review");
        Ok(self.load(title_id, review_id).await?.item)
    }

    /// Comments on the review go with it.
    #[instrument(skip(self, ctx), fields(title_id = %title_id, review_id = %review_id))]
    pub async fn delete(
        &self,
        ctx: &SecurityContext,
        title_id: Uuid,
        review_id: Uuid,
    ) -> Result<(), DomainError> {
        info!("Deleting review");

        self.enforcer.check_class(ctx, &resources::REVIEW, Action::Delete)?;
        let current = self.load(title_id, review_id).await?;
        self.enforcer
            .check_object(ctx, &resources::REVIEW, Action::Delete, current.owner_id)?;

        if !self.repo.delete(review_id).await? {
            return Err(DomainError::not_found("review", review_id));
        }

        info!("Deleted review");
        Ok(())
    }

    async fn require_title(&self, title_id: Uuid) -> Result<(), DomainError> {
        if self.titles.exists(title_id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("title", title_id))
        }
    }

    async fn load(&self, title_id: Uuid, review_id: Uuid) -> Result<Owned<Review>, DomainError> {
        self.repo
            .get(title_id, review_id)
            .await?
            .ok_or_else(|| DomainError::not_found("review", review_id))
    }
}
