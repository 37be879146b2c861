//! Repository implementations over a shared `DatabaseConnection`.

use sea_orm::sea_query::{Expr, IntoColumnRef, LikeExpr, SimpleExpr};

mod comments;
mod reviews;
mod taxonomy;
mod titles;
mod users;

pub use comments::OrmCommentsRepository;
pub use reviews::OrmReviewsRepository;
pub use taxonomy::{OrmCategoriesRepository, OrmGenresRepository};
pub use titles::OrmTitlesRepository;
pub use users::OrmUsersRepository;

/// Search form of a display name. Folding happens here rather than in SQL:
/// SQLite's `lower()` only folds ASCII.
fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// `col LIKE '%needle%'` against a column holding [`fold`]ed values, with
/// the needle's wildcards escaped.
fn contains_folded(col: impl IntoColumnRef, needle: &str) -> SimpleExpr {
    let escaped = fold(needle)
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::col(col).like(LikeExpr::new(format!("%{escaped}%")).escape('\\'))
}
