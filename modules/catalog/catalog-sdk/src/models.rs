use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use yamdb_security::Role;

/// A named, slugged classification. The slug is the external identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxon {
    pub name: String,
    pub slug: String,
}

/// Single-valued classification of a title.
pub type Category = Taxon;

/// Multi-valued classification of a title.
pub type Genre = Taxon;

/// A cataloged work as returned to readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub id: Uuid,
    pub name: String,
    pub year: i32,
    /// Mean of the title's review scores; `None` while there are no reviews.
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<Genre>,
    pub category: Option<Category>,
}

/// Data for creating a title. Category and genres are referenced by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub genre: Vec<String>,
    pub category: Option<String>,
}

/// Partial update of a title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitlePatch {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub category: Option<String>,
}

/// Fields shared by reviews and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authored {
    /// Author's username.
    pub author: String,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub pub_date: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    /// Id of the reviewed title.
    pub title: Uuid,
    pub score: i32,
    #[serde(flatten)]
    pub authored: Authored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub text: String,
    pub score: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub text: Option<String>,
    pub score: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    /// Id of the parent review.
    pub review: Uuid,
    #[serde(flatten)]
    pub authored: Authored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPatch {
    pub text: Option<String>,
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

/// Account created by an admin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

/// Partial update of an account by an admin; may change the role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

/// Partial update of the caller's own account. Has no role field: the role
/// of a self-updated account is always retained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

impl From<ProfilePatch> for UserPatch {
    fn from(p: ProfilePatch) -> Self {
        Self {
            username: p.username,
            email: p.email,
            first_name: p.first_name,
            last_name: p.last_name,
            bio: p.bio,
            role: None,
        }
    }
}

/// Registration request; echoed back on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUp {
    pub email: String,
    pub username: String,
}

/// Confirmation code exchange request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

/// Issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn title_without_reviews_serializes_null_rating() {
        let title = Title {
            id: Uuid::nil(),
            name: "Dune".to_owned(),
            year: 1965,
            rating: None,
            description: None,
            genre: vec![],
            category: None,
        };
        let json = serde_json::to_value(&title).unwrap();
        assert!(json["rating"].is_null());
    }

    #[test]
    fn review_flattens_authored_fields() {
        let review = Review {
            id: Uuid::nil(),
            title: Uuid::nil(),
            score: 7,
            authored: Authored {
                author: "alice".to_owned(),
                text: "solid".to_owned(),
                pub_date: OffsetDateTime::UNIX_EPOCH,
            },
        };
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["author"], "alice");
        assert_eq!(json["text"], "solid");
        assert_eq!(json["pub_date"], "1970-01-01T00:00:00Z");
        assert!(json.get("authored").is_none());
    }
}
