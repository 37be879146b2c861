use async_trait::async_trait;
use catalog_sdk::{Authored, Comment, Page, PageRequest};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, Unchanged,
};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::{NewCommentRecord, Owned};
use crate::domain::repos::CommentsRepository;
use crate::infra::storage::entity::{comment, user};

#[derive(Clone)]
pub struct OrmCommentsRepository {
    db: DatabaseConnection,
}

impl OrmCommentsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_comment(
    row: comment::Model,
    author: Option<user::Model>,
) -> Result<Owned<Comment>, DomainError> {
    let author = author
        .ok_or_else(|| DomainError::internal(format!("comment {} has no author row", row.id)))?;
    Ok(Owned {
        owner_id: row.author_id,
        item: Comment {
            id: row.id,
            review: row.review_id,
            authored: Authored {
                author: author.username,
                text: row.text,
                pub_date: row.pub_date,
            },
        },
    })
}

#[async_trait]
impl CommentsRepository for OrmCommentsRepository {
    async fn list(&self, review_id: Uuid, page: PageRequest) -> Result<Page<Comment>, DomainError> {
        let query = comment::Entity::find().filter(comment::Column::ReviewId.eq(review_id));

        let count = query.clone().count(&self.db).await?;
        let rows = query
            .find_also_related(user::Entity)
            .order_by_desc(comment::Column::PubDate)
            .order_by_desc(comment::Column::Id)
            .offset(page.offset())
            .limit(page.page_size)
            .all(&self.db)
            .await?;

        let results = rows
            .into_iter()
            .map(|(row, author)| to_comment(row, author).map(|owned| owned.item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(results, count, page))
    }

    async fn get(
        &self,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Owned<Comment>>, DomainError> {
        comment::Entity::find_by_id(comment_id)
            .filter(comment::Column::ReviewId.eq(review_id))
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?
            .map(|(row, author)| to_comment(row, author))
            .transpose()
    }

    async fn create(&self, record: NewCommentRecord) -> Result<(), DomainError> {
        let row = comment::ActiveModel {
            id: Set(record.id),
            review_id: Set(record.review_id),
            author_id: Set(record.author_id),
            text: Set(record.text),
            pub_date: Set(record.pub_date),
        };
        comment::Entity::insert(row)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn update(&self, comment_id: Uuid, text: String) -> Result<(), DomainError> {
        let row = comment::ActiveModel {
            id: Unchanged(comment_id),
            text: Set(text),
            ..Default::default()
        };
        comment::Entity::update(row).exec(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, comment_id: Uuid) -> Result<bool, DomainError> {
        let res = comment::Entity::delete_by_id(comment_id)
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
