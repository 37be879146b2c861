//! Repository ports. Implemented over `SeaORM` in `infra::storage::repo`.
//!
//! Write methods map storage unique-index violations to
//! [`DomainError::Conflict`] naming the colliding field; every other storage
//! failure surfaces as [`DomainError::Database`].

use async_trait::async_trait;
use catalog_sdk::{Comment, Page, PageRequest, Review, Taxon, Title, TitleFilter};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::{
    NewCommentRecord, NewReviewRecord, NewTitleRecord, Owned, TitleChanges, UserRecord,
};

/// Categories and genres share this shape; one implementation per table.
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// Ordered by name; `search` is a case-insensitive name substring.
    async fn list(&self, search: Option<&str>, page: PageRequest)
    -> Result<Page<Taxon>, DomainError>;

    async fn create(&self, taxon: &Taxon) -> Result<(), DomainError>;

    /// Returns `false` when no row has that slug.
    async fn delete(&self, slug: &str) -> Result<bool, DomainError>;

    /// Resolve slugs to ids. Unknown slugs are absent from the result.
    async fn resolve(&self, slugs: &[String]) -> Result<Vec<(String, Uuid)>, DomainError>;
}

#[async_trait]
pub trait TitlesRepository: Send + Sync {
    /// Filtered page ordered by year desc, name asc, id asc, with ratings.
    async fn list(&self, filter: &TitleFilter, page: PageRequest)
    -> Result<Page<Title>, DomainError>;

    async fn get(&self, id: Uuid) -> Result<Option<Title>, DomainError>;

    async fn exists(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Insert the title and its genre associations atomically.
    async fn create(&self, record: NewTitleRecord) -> Result<(), DomainError>;

    async fn update(&self, id: Uuid, changes: TitleChanges) -> Result<(), DomainError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait ReviewsRepository: Send + Sync {
    /// Reviews of a title, newest first.
    async fn list(&self, title_id: Uuid, page: PageRequest) -> Result<Page<Review>, DomainError>;

    /// Review by id, only if it belongs to `title_id`.
    async fn get(&self, title_id: Uuid, review_id: Uuid)
    -> Result<Option<Owned<Review>>, DomainError>;

    async fn exists_for_author(&self, title_id: Uuid, author_id: Uuid)
    -> Result<bool, DomainError>;

    /// A second review by the same author for the same title fails with
    /// [`DomainError::Conflict`].
    async fn create(&self, record: NewReviewRecord) -> Result<(), DomainError>;

    async fn update(
        &self,
        review_id: Uuid,
        text: Option<String>,
        score: Option<i32>,
    ) -> Result<(), DomainError>;

    async fn delete(&self, review_id: Uuid) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait CommentsRepository: Send + Sync {
    async fn list(&self, review_id: Uuid, page: PageRequest)
    -> Result<Page<Comment>, DomainError>;

    async fn get(
        &self,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Owned<Comment>>, DomainError>;

    async fn create(&self, record: NewCommentRecord) -> Result<(), DomainError>;

    async fn update(&self, comment_id: Uuid, text: String) -> Result<(), DomainError>;

    async fn delete(&self, comment_id: Uuid) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Ordered by username; `search` matches the username exactly.
    async fn list(&self, search: Option<&str>, page: PageRequest)
    -> Result<Page<UserRecord>, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError>;

    async fn insert(&self, user: &UserRecord) -> Result<(), DomainError>;

    /// Overwrite every mutable column of an existing row.
    async fn update(&self, user: &UserRecord) -> Result<(), DomainError>;

    /// Set `last_login` to `at` only while it still equals `previous`.
    /// Returns `false` if the row is gone or another login stamped it first.
    async fn stamp_login(
        &self,
        id: Uuid,
        previous: Option<OffsetDateTime>,
        at: OffsetDateTime,
    ) -> Result<bool, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}
