use async_trait::async_trait;
use catalog_sdk::{Authored, Page, PageRequest, Review};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, Unchanged,
};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::{NewReviewRecord, Owned};
use crate::domain::repos::ReviewsRepository;
use crate::domain::validation;
use crate::infra::storage::entity::{review, user};
use crate::infra::storage::map_write_err;

#[derive(Clone)]
pub struct OrmReviewsRepository {
    db: DatabaseConnection,
}

impl OrmReviewsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_review(row: review::Model, author: Option<user::Model>) -> Result<Owned<Review>, DomainError> {
    let author = author
        .ok_or_else(|| DomainError::internal(format!("review {} has no author row", row.id)))?;
    Ok(Owned {
        owner_id: row.author_id,
        item: Review {
            id: row.id,
            title: row.title_id,
            score: row.score,
            authored: Authored {
                author: author.username,
                text: row.text,
                pub_date: row.pub_date,
            },
        },
    })
}

#[async_trait]
impl ReviewsRepository for OrmReviewsRepository {
    async fn list(&self, title_id: Uuid, page: PageRequest) -> Result<Page<Review>, DomainError> {
        let query = review::Entity::find().filter(review::Column::TitleId.eq(title_id));

        let count = query.clone().count(&self.db).await?;
        let rows = query
            .find_also_related(user::Entity)
            .order_by_desc(review::Column::PubDate)
            .order_by_desc(review::Column::Id)
            .offset(page.offset())
            .limit(page.page_size)
            .all(&self.db)
            .await?;

        let results = rows
            .into_iter()
            .map(|(row, author)| to_review(row, author).map(|owned| owned.item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(results, count, page))
    }

    async fn get(
        &self,
        title_id: Uuid,
        review_id: Uuid,
    ) -> Result<Option<Owned<Review>>, DomainError> {
        review::Entity::find_by_id(review_id)
            .filter(review::Column::TitleId.eq(title_id))
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?
            .map(|(row, author)| to_review(row, author))
            .transpose()
    }

    async fn exists_for_author(&self, title_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let count = review::Entity::find()
            .filter(review::Column::TitleId.eq(title_id))
            .filter(review::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn create(&self, record: NewReviewRecord) -> Result<(), DomainError> {
        let row = review::ActiveModel {
            id: Set(record.id),
            title_id: Set(record.title_id),
            author_id: Set(record.author_id),
            text: Set(record.text),
            score: Set(record.score),
            pub_date: Set(record.pub_date),
        };
        review::Entity::insert(row)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                map_write_err(e, |_| DomainError::conflict("title", validation::DUPLICATE_REVIEW))
            })?;
        Ok(())
    }

    async fn update(
        &self,
        review_id: Uuid,
        text: Option<String>,
        score: Option<i32>,
    ) -> Result<(), DomainError> {
        if text.is_none() && score.is_none() {
            return Ok(());
        }
        let mut row = review::ActiveModel {
            id: Unchanged(review_id),
            ..Default::default()
        };
        if let Some(text) = text {
            row.text = Set(text);
        }
        if let Some(score) = score {
            row.score = Set(score);
        }
        review::Entity::update(row).exec(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, review_id: Uuid) -> Result<bool, DomainError> {
        let res = review::Entity::delete_by_id(review_id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
