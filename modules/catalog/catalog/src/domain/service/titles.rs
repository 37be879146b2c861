use std::collections::HashMap;
use std::sync::Arc;

use catalog_sdk::{NewTitle, Page, PageRequest, Title, TitleFilter, TitlePatch};
use tracing::{debug, info, instrument};
use uuid::Uuid;
use yamdb_authz::{Action, PolicyEnforcer};
use yamdb_security::SecurityContext;

use super::resources;
use crate::domain::error::{DomainError, Violations};
use crate::domain::models::{NewTitleRecord, TitleChanges};
use crate::domain::repos::{TaxonomyRepository, TitlesRepository};
use crate::domain::validation;

/// Titles service. Reads carry the rating aggregated by storage.
pub struct TitlesService {
    repo: Arc<dyn TitlesRepository>,
    categories: Arc<dyn TaxonomyRepository>,
    genres: Arc<dyn TaxonomyRepository>,
    enforcer: PolicyEnforcer,
}

impl TitlesService {
    pub fn new(
        repo: Arc<dyn TitlesRepository>,
        categories: Arc<dyn TaxonomyRepository>,
        genres: Arc<dyn TaxonomyRepository>,
        enforcer: PolicyEnforcer,
    ) -> Self {
        Self {
            repo,
            categories,
            genres,
            enforcer,
        }
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &SecurityContext,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> Result<Page<Title>, DomainError> {
        self.enforcer.check_class(ctx, &resources::TITLE, Action::List)?;

        let page = self.repo.list(filter, page).await?;

        debug!("Listed {} of {} titles", page.results.len(), page.count);
        Ok(page)
    }

    #[instrument(skip(self, ctx), fields(title_id = %id))]
    pub async fn get(&self, ctx: &SecurityContext, id: Uuid) -> Result<Title, DomainError> {
        self.enforcer.check_class(ctx, &resources::TITLE, Action::Get)?;

        self.repo
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("title", id))
    }

    #[instrument(skip(self, ctx, new_title), fields(name = %new_title.name, year = new_title.year))]
    pub async fn create(
        &self,
        ctx: &SecurityContext,
        new_title: NewTitle,
    ) -> Result<Title, DomainError> {
        info!("Creating title");

        self.enforcer.check_class(ctx, &resources::TITLE, Action::Create)?;

        let mut v = Violations::new();
        validate_name(&mut v, &new_title.name);
        validation::year(&mut v, new_title.year);
        let category_id = self
            .resolve_category(&mut v, new_title.category.as_deref())
            .await?;
        let genre_ids = self.resolve_genres(&mut v, &new_title.genre).await?;
        v.finish()?;

        let id = Uuid::now_v7();
        self.repo
            .create(NewTitleRecord {
                id,
                name: new_title.name,
                year: new_title.year,
                description: new_title.description,
                category_id,
                genre_ids,
            })
            .await?;

        info!(title_id = %id, "Created title");
        self.reload(id).await
    }

    #[instrument(skip(self, ctx, patch), fields(title_id = %id))]
    pub async fn update(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        patch: TitlePatch,
    ) -> Result<Title, DomainError> {
        info!("Updating title");

        self.enforcer.check_class(ctx, &resources::TITLE, Action::Update)?;

        if !self.repo.exists(id).await? {
            return Err(DomainError::not_found("title", id));
        }

        let mut v = Violations::new();
        if let Some(name) = &patch.name {
            validate_name(&mut v, name);
        }
        if let Some(year) = patch.year {
            validation::year(&mut v, year);
        }
        let category_id = self
            .resolve_category(&mut v, patch.category.as_deref())
            .await?;
        let genre_ids = match &patch.genre {
            Some(slugs) => Some(self.resolve_genres(&mut v, slugs).await?),
            None => None,
        };
        v.finish()?;

        self.repo
            .update(
                id,
                TitleChanges {
                    name: patch.name,
                    year: patch.year,
                    description: patch.description,
                    category_id,
                    genre_ids,
                },
            )
            .await?;

        info!("Updated title");
        self.reload(id).await
    }

    /// Reviews and their comments go with the title.
    #[instrument(skip(self, ctx), fields(title_id = %id))]
    pub async fn delete(&self, ctx: &SecurityContext, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting title");

        self.enforcer.check_class(ctx, &resources::TITLE, Action::Delete)?;

        if !self.repo.delete(id).await? {
            return Err(DomainError::not_found("title", id));
        }

        info!("Deleted title");
        Ok(())
    }

    async fn reload(&self, id: Uuid) -> Result<Title, DomainError> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| DomainError::internal(format!("title {id} vanished after write")))
    }

    async fn resolve_category(
        &self,
        v: &mut Violations,
        slug: Option<&str>,
    ) -> Result<Option<Uuid>, DomainError> {
        let Some(slug) = slug else {
            return Ok(None);
        };
        let found = self.categories.resolve(&[slug.to_owned()]).await?;
        match found.first() {
            Some((_, id)) => Ok(Some(*id)),
            None => {
                v.push("category", format!("category '{slug}' does not exist"));
                Ok(None)
            }
        }
    }

    /// Resolve genre slugs in the given order, dropping duplicates.
    async fn resolve_genres(
        &self,
        v: &mut Violations,
        slugs: &[String],
    ) -> Result<Vec<Uuid>, DomainError> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }
        let known: HashMap<String, Uuid> = self.genres.resolve(slugs).await?.into_iter().collect();

        let mut ids = Vec::with_capacity(slugs.len());
        for slug in slugs {
            match known.get(slug) {
                Some(id) if !ids.contains(id) => ids.push(*id),
                Some(_) => {}
                None => v.push("genre", format!("genre '{slug}' does not exist")),
            }
        }
        Ok(ids)
    }
}

fn validate_name(v: &mut Violations, name: &str) {
    validation::not_blank(v, "name", name);
    validation::max_len(v, "name", name, validation::TITLE_NAME_MAX_LEN);
}
