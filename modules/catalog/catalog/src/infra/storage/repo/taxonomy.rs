use async_trait::async_trait;
use catalog_sdk::{Page, PageRequest, Taxon};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::{contains_folded, fold};
use crate::domain::error::DomainError;
use crate::domain::repos::TaxonomyRepository;
use crate::infra::storage::entity::{category, genre};
use crate::infra::storage::map_write_err;

/// Categories and genres have identical tables; one repository type each.
macro_rules! taxonomy_repository {
    ($(#[$meta:meta])* $name:ident, $entity:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            db: DatabaseConnection,
        }

        impl $name {
            #[must_use]
            pub fn new(db: DatabaseConnection) -> Self {
                Self { db }
            }
        }

        #[async_trait]
        impl TaxonomyRepository for $name {
            async fn list(
                &self,
                search: Option<&str>,
                page: PageRequest,
            ) -> Result<Page<Taxon>, DomainError> {
                let mut query = $entity::Entity::find();
                if let Some(search) = search {
                    query = query.filter(contains_folded($entity::Column::NameSearch, search));
                }

                let count = query.clone().count(&self.db).await?;
                let rows = query
                    .order_by_asc($entity::Column::Name)
                    .order_by_asc($entity::Column::Slug)
                    .offset(page.offset())
                    .limit(page.page_size)
                    .all(&self.db)
                    .await?;

                let results = rows
                    .into_iter()
                    .map(|m| Taxon {
                        name: m.name,
                        slug: m.slug,
                    })
                    .collect();
                Ok(Page::new(results, count, page))
            }

            async fn create(&self, taxon: &Taxon) -> Result<(), DomainError> {
                let row = $entity::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    name: Set(taxon.name.clone()),
                    name_search: Set(fold(&taxon.name)),
                    slug: Set(taxon.slug.clone()),
                };
                $entity::Entity::insert(row)
                    .exec_without_returning(&self.db)
                    .await
                    .map_err(|e| {
                        map_write_err(e, |_| {
                            DomainError::conflict(
                                "slug",
                                concat!("a ", $label, " with this slug already exists"),
                            )
                        })
                    })?;
                Ok(())
            }

            async fn delete(&self, slug: &str) -> Result<bool, DomainError> {
                let res = $entity::Entity::delete_many()
                    .filter($entity::Column::Slug.eq(slug))
                    .exec(&self.db)
                    .await?;
                Ok(res.rows_affected > 0)
            }

            async fn resolve(&self, slugs: &[String]) -> Result<Vec<(String, Uuid)>, DomainError> {
                if slugs.is_empty() {
                    return Ok(Vec::new());
                }
                let rows = $entity::Entity::find()
                    .filter($entity::Column::Slug.is_in(slugs.iter().map(String::as_str)))
                    .all(&self.db)
                    .await?;
                Ok(rows.into_iter().map(|m| (m.slug, m.id)).collect())
            }
        }
    };
}

taxonomy_repository!(
    /// `categories` table.
    OrmCategoriesRepository,
    category,
    "category"
);

taxonomy_repository!(
    /// `genres` table. Deleting a genre drops its title associations.
    OrmGenresRepository,
    genre,
    "genre"
);
