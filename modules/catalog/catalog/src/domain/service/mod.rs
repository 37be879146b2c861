//! Domain service layer - business logic and rules.
//!
//! ## Architecture
//!
//! One service per resource:
//! - `taxonomy` - categories and genres (one service type, two instances)
//! - `titles` - titles with derived rating
//! - `reviews` - reviews, one per author per title
//! - `comments` - comments on reviews
//! - `users` - admin user management and the caller's own profile
//! - `registration` - sign-up and confirmation-code exchange
//!
//! ## Layering Rules
//!
//! The domain layer:
//! - **MAY** import: `catalog_sdk` (contract types), `auth` (token signing), repository ports
//! - **MUST NOT** import: `api::*` (one-way dependency: API → Domain)
//!
//! ## Security
//!
//! Every operation consults the [`PolicyEnforcer`](yamdb_authz::PolicyEnforcer)
//! with the resource descriptor from [`resources`]:
//! 1. Class-level check before anything is loaded
//! 2. Object-level check once the target and its author are known (reviews, comments)
//!
//! Anonymous callers get `Unauthenticated`, authenticated callers lacking
//! capability get `Forbidden`.

use catalog_sdk::PageRequest;

use crate::config::CatalogConfig;

mod comments;
mod registration;
mod reviews;
mod taxonomy;
mod titles;
mod users;

#[cfg(test)]
mod tests_catalog;

#[cfg(test)]
mod tests_accounts;

pub use comments::CommentsService;
pub use registration::{CONFIRMATION_SUBJECT, RegistrationService};
pub use reviews::ReviewsService;
pub use taxonomy::TaxonomyService;
pub use titles::TitlesService;
pub use users::{EMAIL_TAKEN, USERNAME_TAKEN, UsersService};

/// Resource descriptors and the policy attached to each.
pub mod resources {
    use yamdb_authz::{Policy, ResourceType};

    pub const CATEGORY: ResourceType = ResourceType {
        name: "catalog.category",
        policy: Policy::AdminOrReadOnly,
    };

    pub const GENRE: ResourceType = ResourceType {
        name: "catalog.genre",
        policy: Policy::AdminOrReadOnly,
    };

    pub const TITLE: ResourceType = ResourceType {
        name: "catalog.title",
        policy: Policy::AdminOrReadOnly,
    };

    pub const REVIEW: ResourceType = ResourceType {
        name: "catalog.review",
        policy: Policy::AuthorStaffOrReadOnly,
    };

    pub const COMMENT: ResourceType = ResourceType {
        name: "catalog.comment",
        policy: Policy::AuthorStaffOrReadOnly,
    };

    pub const USER: ResourceType = ResourceType {
        name: "catalog.user",
        policy: Policy::AdminOnlyWithSelfProfile,
    };
}

/// Configuration for the domain services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from(&CatalogConfig::default())
    }
}

impl From<&CatalogConfig> for ServiceConfig {
    fn from(cfg: &CatalogConfig) -> Self {
        Self {
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
        }
    }
}

impl ServiceConfig {
    #[must_use]
    pub fn page_request(&self, page: Option<u64>, page_size: Option<u64>) -> PageRequest {
        PageRequest::new(page, page_size, self.default_page_size, self.max_page_size)
    }
}
