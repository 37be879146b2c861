use std::collections::HashMap;

use async_trait::async_trait;
use catalog_sdk::{Page, PageRequest, Taxon, Title, TitleFilter};
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{contains_folded, fold};
use crate::domain::error::DomainError;
use crate::domain::models::{NewTitleRecord, TitleChanges};
use crate::domain::repos::TitlesRepository;
use crate::infra::storage::entity::{category, genre, genre_title, review, title};

/// Titles with their genres, category and review-derived rating.
///
/// The rating is the mean review score, computed per read; a title with no
/// reviews has none.
#[derive(Clone)]
pub struct OrmTitlesRepository {
    db: DatabaseConnection,
}

impl OrmTitlesRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach ratings, genres and categories with one query each.
    async fn hydrate(&self, rows: Vec<title::Model>) -> Result<Vec<Title>, DomainError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|t| t.id).collect();

        let ratings: HashMap<Uuid, f64> = review::Entity::find()
            .select_only()
            .column(review::Column::TitleId)
            .expr_as(Func::avg(Expr::col(review::Column::Score)), "rating")
            .filter(review::Column::TitleId.is_in(ids.clone()))
            .group_by(review::Column::TitleId)
            .into_tuple::<(Uuid, f64)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        let mut genres: HashMap<Uuid, Vec<Taxon>> = HashMap::new();
        let links = genre_title::Entity::find()
            .filter(genre_title::Column::TitleId.is_in(ids))
            .find_also_related(genre::Entity)
            .order_by_asc(genre::Column::Name)
            .all(&self.db)
            .await?;
        for (link, found) in links {
            if let Some(g) = found {
                genres.entry(link.title_id).or_default().push(Taxon {
                    name: g.name,
                    slug: g.slug,
                });
            }
        }

        let category_ids: Vec<Uuid> = rows.iter().filter_map(|t| t.category_id).collect();
        let categories: HashMap<Uuid, Taxon> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            category::Entity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|c| {
                    (
                        c.id,
                        Taxon {
                            name: c.name,
                            slug: c.slug,
                        },
                    )
                })
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|t| Title {
                id: t.id,
                rating: ratings.get(&t.id).copied(),
                genre: genres.remove(&t.id).unwrap_or_default(),
                category: t.category_id.and_then(|id| categories.get(&id).cloned()),
                name: t.name,
                year: t.year,
                description: t.description,
            })
            .collect())
    }
}

fn filtered(filter: &TitleFilter) -> Select<title::Entity> {
    let mut query = title::Entity::find();

    if let Some(name) = filter.name.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(contains_folded((title::Entity, title::Column::NameSearch), name));
    }
    if let Some(year) = filter.year {
        query = query.filter(title::Column::Year.eq(year));
    }
    if let Some(slug) = filter.category.as_deref() {
        query = query.filter(
            title::Column::CategoryId.in_subquery(
                Query::select()
                    .column(category::Column::Id)
                    .from(category::Entity)
                    .and_where(Expr::col(category::Column::Slug).eq(slug))
                    .to_owned(),
            ),
        );
    }
    if let Some(slug) = filter.genre.as_deref() {
        query = query.filter(
            title::Column::Id.in_subquery(
                Query::select()
                    .column((genre_title::Entity, genre_title::Column::TitleId))
                    .from(genre_title::Entity)
                    .inner_join(
                        genre::Entity,
                        Expr::col((genre::Entity, genre::Column::Id))
                            .equals((genre_title::Entity, genre_title::Column::GenreId)),
                    )
                    .and_where(Expr::col((genre::Entity, genre::Column::Slug)).eq(slug))
                    .to_owned(),
            ),
        );
    }
    query
}

fn genre_links(title_id: Uuid, genre_ids: &[Uuid]) -> Vec<genre_title::ActiveModel> {
    genre_ids
        .iter()
        .map(|genre_id| genre_title::ActiveModel {
            id: Set(Uuid::now_v7()),
            title_id: Set(title_id),
            genre_id: Set(*genre_id),
        })
        .collect()
}

#[async_trait]
impl TitlesRepository for OrmTitlesRepository {
    async fn list(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> Result<Page<Title>, DomainError> {
        let query = filtered(filter);

        let count = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(title::Column::Year)
            .order_by_asc(title::Column::Name)
            .order_by_asc(title::Column::Id)
            .offset(page.offset())
            .limit(page.page_size)
            .all(&self.db)
            .await?;

        Ok(Page::new(self.hydrate(rows).await?, count, page))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Title>, DomainError> {
        let Some(row) = title::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![row]).await?.pop())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, DomainError> {
        let count = title::Entity::find_by_id(id).count(&self.db).await?;
        Ok(count > 0)
    }

    async fn create(&self, record: NewTitleRecord) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        title::Entity::insert(title::ActiveModel {
            id: Set(record.id),
            name_search: Set(fold(&record.name)),
            name: Set(record.name),
            year: Set(record.year),
            description: Set(record.description),
            category_id: Set(record.category_id),
        })
        .exec_without_returning(&txn)
        .await?;

        let links = genre_links(record.id, &record.genre_ids);
        if !links.is_empty() {
            genre_title::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, changes: TitleChanges) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        let Some(current) = title::Entity::find_by_id(id).one(&txn).await? else {
            return Err(DomainError::not_found("title", id));
        };
        let mut row = current.into_active_model();
        if let Some(name) = changes.name {
            row.name_search = Set(fold(&name));
            row.name = Set(name);
        }
        if let Some(year) = changes.year {
            row.year = Set(year);
        }
        if let Some(description) = changes.description {
            row.description = Set(Some(description));
        }
        if let Some(category_id) = changes.category_id {
            row.category_id = Set(Some(category_id));
        }
        if row.is_changed() {
            row.update(&txn).await?;
        }

        if let Some(genre_ids) = changes.genre_ids {
            genre_title::Entity::delete_many()
                .filter(genre_title::Column::TitleId.eq(id))
                .exec(&txn)
                .await?;
            let links = genre_links(id, &genre_ids);
            if !links.is_empty() {
                genre_title::Entity::insert_many(links)
                    .exec_without_returning(&txn)
                    .await?;
            }
        }

        txn.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let res = title::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
