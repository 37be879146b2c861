//! Request bodies and query strings.
//!
//! Bodies take every field as optional so a missing field is reported
//! alongside the other field errors instead of failing deserialization.

use catalog_sdk::{
    CommentPatch, NewComment, NewReview, NewTitle, NewUser, ProfilePatch, ReviewPatch, SignUp,
    Taxon, TitleFilter, TitlePatch, TokenRequest, UserPatch,
};
use serde::Deserialize;
use yamdb_security::Role;

use crate::domain::error::{DomainError, Violations};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignUpBody {
    pub email: Option<String>,
    pub username: Option<String>,
}

impl SignUpBody {
    /// # Errors
    ///
    /// [`DomainError::Validation`] for missing fields.
    pub fn into_request(self) -> Result<SignUp, DomainError> {
        let mut v = Violations::new();
        let email = v.required("email", self.email);
        let username = v.required("username", self.username);
        v.finish()?;
        Ok(SignUp {
            email: email.unwrap_or_default(),
            username: username.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenBody {
    pub username: Option<String>,
    pub confirmation_code: Option<String>,
}

impl TokenBody {
    /// # Errors
    ///
    /// [`DomainError::Validation`] for missing fields.
    pub fn into_request(self) -> Result<TokenRequest, DomainError> {
        let mut v = Violations::new();
        let username = v.required("username", self.username);
        let confirmation_code = v.required("confirmation_code", self.confirmation_code);
        v.finish()?;
        Ok(TokenRequest {
            username: username.unwrap_or_default(),
            confirmation_code: confirmation_code.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaxonBody {
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl TaxonBody {
    /// # Errors
    ///
    /// [`DomainError::Validation`] for missing fields.
    pub fn into_taxon(self) -> Result<Taxon, DomainError> {
        let mut v = Violations::new();
        let name = v.required("name", self.name);
        let slug = v.required("slug", self.slug);
        v.finish()?;
        Ok(Taxon {
            name: name.unwrap_or_default(),
            slug: slug.unwrap_or_default(),
        })
    }
}

/// Title write body. `category` is a slug, `genre` a list of slugs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TitleBody {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub category: Option<String>,
}

impl TitleBody {
    /// # Errors
    ///
    /// [`DomainError::Validation`] when `name` or `year` is missing.
    pub fn into_new(self) -> Result<NewTitle, DomainError> {
        let mut v = Violations::new();
        let name = v.required("name", self.name);
        let year = v.required("year", self.year);
        v.finish()?;
        Ok(NewTitle {
            name: name.unwrap_or_default(),
            year: year.unwrap_or_default(),
            description: self.description,
            genre: self.genre.unwrap_or_default(),
            category: self.category,
        })
    }

    #[must_use]
    pub fn into_patch(self) -> TitlePatch {
        TitlePatch {
            name: self.name,
            year: self.year,
            description: self.description,
            genre: self.genre,
            category: self.category,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewBody {
    pub text: Option<String>,
    pub score: Option<i32>,
}

impl ReviewBody {
    /// # Errors
    ///
    /// [`DomainError::Validation`] for missing fields.
    pub fn into_new(self) -> Result<NewReview, DomainError> {
        let mut v = Violations::new();
        let text = v.required("text", self.text);
        let score = v.required("score", self.score);
        v.finish()?;
        Ok(NewReview {
            text: text.unwrap_or_default(),
            score: score.unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn into_patch(self) -> ReviewPatch {
        ReviewPatch {
            text: self.text,
            score: self.score,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentBody {
    pub text: Option<String>,
}

impl CommentBody {
    /// # Errors
    ///
    /// [`DomainError::Validation`] when `text` is missing.
    pub fn into_new(self) -> Result<NewComment, DomainError> {
        let mut v = Violations::new();
        let text = v.required("text", self.text);
        v.finish()?;
        Ok(NewComment {
            text: text.unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn into_patch(self) -> CommentPatch {
        CommentPatch { text: self.text }
    }
}

/// Admin-side user body. `role` arrives as text so an unknown role is a
/// field error rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

impl UserBody {
    /// # Errors
    ///
    /// [`DomainError::Validation`] for missing `username`/`email` or an
    /// unknown role.
    pub fn into_new(self) -> Result<NewUser, DomainError> {
        let mut v = Violations::new();
        let username = v.required("username", self.username);
        let email = v.required("email", self.email);
        let role = parse_role(&mut v, self.role.as_deref());
        v.finish()?;
        Ok(NewUser {
            username: username.unwrap_or_default(),
            email: email.unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            bio: self.bio.unwrap_or_default(),
            role: role.unwrap_or_default(),
        })
    }

    /// # Errors
    ///
    /// [`DomainError::Validation`] for an unknown role.
    pub fn into_patch(self) -> Result<UserPatch, DomainError> {
        let mut v = Violations::new();
        let role = parse_role(&mut v, self.role.as_deref());
        v.finish()?;
        Ok(UserPatch {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role,
        })
    }
}

fn parse_role(v: &mut Violations, role: Option<&str>) -> Option<Role> {
    let role = role?;
    match role.parse() {
        Ok(role) => Some(role),
        Err(e) => {
            v.push("role", e.to_string());
            None
        }
    }
}

/// Self-profile body. Any `role` sent by the caller is dropped here.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

impl From<ProfileBody> for ProfilePatch {
    fn from(body: ProfileBody) -> Self {
        Self {
            username: body.username,
            email: body.email,
            first_name: body.first_name,
            last_name: body.last_name,
            bio: body.bio,
        }
    }
}

/// `?page=&page_size=&search=`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search: Option<String>,
}

/// Title list query: paging plus the conjunctive filters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TitleListParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
}

impl TitleListParams {
    #[must_use]
    pub fn filter(&self) -> TitleFilter {
        TitleFilter {
            name: self.name.clone(),
            category: self.category.clone(),
            genre: self.genre.clone(),
            year: self.year,
        }
    }
}
