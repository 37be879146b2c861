//! Storage-facing records that carry more than the SDK models expose
//! (owner ids, superuser flag, login timestamps).

use catalog_sdk::User;
use time::OffsetDateTime;
use uuid::Uuid;
use yamdb_security::{Identity, Role};

/// Full account row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
    pub is_superuser: bool,
    pub last_login: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl UserRecord {
    /// Fresh account with empty profile fields.
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role,
            is_superuser: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Per-request capability snapshot.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.username.clone(), self.role).with_superuser(self.is_superuser)
    }

    #[must_use]
    pub fn to_public(&self) -> User {
        User {
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            bio: self.bio.clone(),
            role: self.role,
        }
    }
}

/// A loaded item together with the id of the user who wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owned<T> {
    pub owner_id: Uuid,
    pub item: T,
}

/// Title row to insert; taxonomy already resolved to ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTitleRecord {
    pub id: Uuid,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub genre_ids: Vec<Uuid>,
}

/// Columns to change on a title. `None` leaves a column untouched;
/// `genre_ids: Some(..)` replaces the whole association set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub genre_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReviewRecord {
    pub id: Uuid,
    pub title_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub score: i32,
    pub pub_date: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommentRecord {
    pub id: Uuid,
    pub review_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub pub_date: OffsetDateTime,
}
