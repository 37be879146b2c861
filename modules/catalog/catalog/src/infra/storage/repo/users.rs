use async_trait::async_trait;
use catalog_sdk::{Page, PageRequest};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, Unchanged,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::UserRecord;
use crate::domain::repos::UsersRepository;
use crate::domain::service::{EMAIL_TAKEN, USERNAME_TAKEN};
use crate::infra::storage::entity::user;
use crate::infra::storage::map_write_err;

#[derive(Clone)]
pub struct OrmUsersRepository {
    db: DatabaseConnection,
}

impl OrmUsersRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_record(row: user::Model) -> Result<UserRecord, DomainError> {
    let role = row
        .role
        .parse()
        .map_err(|e| DomainError::internal(format!("user {}: {e}", row.id)))?;
    Ok(UserRecord {
        id: row.id,
        username: row.username,
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        bio: row.bio,
        role,
        is_superuser: row.is_superuser,
        last_login: row.last_login,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// The driver message names the violated index or column.
fn taken(message: &str) -> DomainError {
    if message.contains("email") {
        DomainError::conflict("email", EMAIL_TAKEN)
    } else {
        DomainError::conflict("username", USERNAME_TAKEN)
    }
}

#[async_trait]
impl UsersRepository for OrmUsersRepository {
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<UserRecord>, DomainError> {
        let mut query = user::Entity::find();
        if let Some(username) = search {
            query = query.filter(user::Column::Username.eq(username));
        }

        let count = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_asc(user::Column::Username)
            .offset(page.offset())
            .limit(page.page_size)
            .all(&self.db)
            .await?;

        let results = rows.into_iter().map(to_record).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(results, count, page))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(to_record)
            .transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DomainError> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .map(to_record)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .map(to_record)
            .transpose()
    }

    async fn insert(&self, record: &UserRecord) -> Result<(), DomainError> {
        let row = user::ActiveModel {
            id: Set(record.id),
            username: Set(record.username.clone()),
            email: Set(record.email.clone()),
            first_name: Set(record.first_name.clone()),
            last_name: Set(record.last_name.clone()),
            bio: Set(record.bio.clone()),
            role: Set(record.role.as_str().to_owned()),
            is_superuser: Set(record.is_superuser),
            last_login: Set(record.last_login),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        };
        user::Entity::insert(row)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| map_write_err(e, taken))?;
        Ok(())
    }

    async fn update(&self, record: &UserRecord) -> Result<(), DomainError> {
        let row = user::ActiveModel {
            id: Unchanged(record.id),
            username: Set(record.username.clone()),
            email: Set(record.email.clone()),
            first_name: Set(record.first_name.clone()),
            last_name: Set(record.last_name.clone()),
            bio: Set(record.bio.clone()),
            role: Set(record.role.as_str().to_owned()),
            is_superuser: Set(record.is_superuser),
            last_login: Set(record.last_login),
            created_at: Unchanged(record.created_at),
            updated_at: Set(record.updated_at),
        };
        let res = user::Entity::update_many()
            .set(row)
            .filter(user::Column::Id.eq(record.id))
            .exec(&self.db)
            .await
            .map_err(|e| map_write_err(e, taken))?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found("user", &record.username));
        }
        Ok(())
    }

    async fn stamp_login(
        &self,
        id: Uuid,
        previous: Option<OffsetDateTime>,
        at: OffsetDateTime,
    ) -> Result<bool, DomainError> {
        let unchanged = match previous {
            Some(previous) => user::Column::LastLogin.eq(previous),
            None => user::Column::LastLogin.is_null(),
        };
        let res = user::Entity::update_many()
            .col_expr(user::Column::LastLogin, Expr::value(at))
            .filter(user::Column::Id.eq(id))
            .filter(unchanged)
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let res = user::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
