//! `SeaORM` storage: entities, migrations and repository implementations.

use sea_orm::{DbErr, SqlErr};

use crate::domain::error::DomainError;

pub mod entity;
pub mod migrations;
pub mod repo;

pub use repo::{
    OrmCategoriesRepository, OrmCommentsRepository, OrmGenresRepository, OrmReviewsRepository,
    OrmTitlesRepository, OrmUsersRepository,
};

/// Map a unique-index violation through `on_unique`; any other failure
/// becomes [`DomainError::Database`]. The closure gets the driver message,
/// which names the violated columns.
pub(crate) fn map_write_err(err: DbErr, on_unique: impl FnOnce(&str) -> DomainError) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => on_unique(&message),
        _ => DomainError::from(err),
    }
}
