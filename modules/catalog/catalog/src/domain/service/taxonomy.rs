use std::sync::Arc;

use catalog_sdk::{Page, PageRequest, Taxon};
use tracing::{debug, info, instrument};
use yamdb_authz::{Action, PolicyEnforcer, ResourceType};
use yamdb_security::SecurityContext;

use crate::domain::error::{DomainError, Violations};
use crate::domain::repos::TaxonomyRepository;
use crate::domain::validation;

/// Categories or genres, depending on the repository and resource it is
/// built with.
pub struct TaxonomyService {
    resource: ResourceType,
    entity: &'static str,
    repo: Arc<dyn TaxonomyRepository>,
    enforcer: PolicyEnforcer,
}

impl TaxonomyService {
    pub fn new(
        resource: ResourceType,
        entity: &'static str,
        repo: Arc<dyn TaxonomyRepository>,
        enforcer: PolicyEnforcer,
    ) -> Self {
        Self {
            resource,
            entity,
            repo,
            enforcer,
        }
    }

    #[instrument(skip(self, ctx), fields(entity = self.entity))]
    pub async fn list(
        &self,
        ctx: &SecurityContext,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Taxon>, DomainError> {
        self.enforcer.check_class(ctx, &self.resource, Action::List)?;

        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let page = self.repo.list(search, page).await?;

        debug!("Listed {} of {} {} entries", page.results.len(), page.count, self.entity);
        Ok(page)
    }

    #[instrument(skip(self, ctx), fields(entity = self.entity, slug = %taxon.slug))]
    pub async fn create(&self, ctx: &SecurityContext, taxon: Taxon) -> Result<Taxon, DomainError> {
        info!("Creating {}", self.entity);

        self.enforcer.check_class(ctx, &self.resource, Action::Create)?;

        let mut v = Violations::new();
        validation::not_blank(&mut v, "name", &taxon.name);
        validation::max_len(&mut v, "name", &taxon.name, validation::TAXON_NAME_MAX_LEN);
        validation::slug(&mut v, &taxon.slug);
        v.finish()?;

        self.repo.create(&taxon).await?;

        info!("Created {}", self.entity);
        Ok(taxon)
    }

    #[instrument(skip(self, ctx), fields(entity = self.entity))]
    pub async fn delete(&self, ctx: &SecurityContext, slug: &str) -> Result<(), DomainError> {
        info!("Deleting {}", self.entity);

        self.enforcer.check_class(ctx, &self.resource, Action::Delete)?;

        if !self.repo.delete(slug).await? {
            return Err(DomainError::not_found(self.entity, slug));
        }

        info!("Deleted {}", self.entity);
        Ok(())
    }
}
