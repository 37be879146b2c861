//! YaMDb catalog module.
//!
//! Titles, their categories and genres, user accounts, and the reviews and
//! comments users write about titles, served as a REST API under `/api/v1`.
//!
//! ## Layout
//!
//! - `config` - module configuration (auth, mail, pagination)
//! - `domain` - services, repository ports, validation and errors
//! - `auth` - access tokens, confirmation codes and request authentication
//! - `infra` - `SeaORM` storage and the log-backed mail sender
//! - `api::rest` - axum router, handlers, problem responses
//! - `module` - wiring of the above into a [`CatalogModule`]
//!
//! Every mutating call goes through the [`PolicyEnforcer`](yamdb_authz::PolicyEnforcer)
//! before it touches storage.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

#[doc(hidden)]
pub mod test_support;

pub use config::{AuthConfig, CatalogConfig, ConfigError, MailConfig};
pub use domain::error::DomainError;
pub use domain::ports::{MailError, MailMessage, MailSender};
pub use infra::mail::LogMailSender;
pub use infra::storage::migrations::Migrator;
pub use module::{AppServices, CatalogModule};
