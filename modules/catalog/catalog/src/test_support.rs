#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Shared fixtures for unit and HTTP tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use secrecy::SecretString;
use yamdb_security::{Role, SecurityContext};

use crate::auth::TokenIssuer;
use crate::config::{AuthConfig, CatalogConfig, MailConfig};
use crate::domain::models::UserRecord;
use crate::domain::ports::{MailError, MailMessage, MailSender};
use crate::domain::repos::UsersRepository;
use crate::infra::storage::OrmUsersRepository;
use crate::infra::storage::migrations::Migrator;
use crate::module::CatalogModule;

pub const TEST_SECRET: &str = "test-secret-0123456789abcdef-0123456789";
pub const TEST_ISSUER: &str = "yamdb-test";

/// Create an in-memory database with the schema applied.
pub async fn inmem_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

#[must_use]
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        token_secret: Some(SecretString::from(TEST_SECRET.to_owned())),
        issuer: TEST_ISSUER.to_owned(),
        ..AuthConfig::default()
    }
}

#[must_use]
pub fn test_catalog_config() -> CatalogConfig {
    CatalogConfig::default()
}

/// Module over `db` with test auth settings.
#[must_use]
pub fn build_module(db: DatabaseConnection, mailer: Arc<dyn MailSender>) -> CatalogModule {
    CatalogModule::new(
        db,
        &test_auth_config(),
        &MailConfig::default(),
        &test_catalog_config(),
        mailer,
    )
    .expect("Failed to build catalog module")
}

/// Issuer matching [`test_auth_config`].
#[must_use]
pub fn test_token_issuer() -> TokenIssuer {
    TokenIssuer::new(
        TEST_SECRET.as_bytes(),
        TEST_ISSUER,
        Duration::from_secs(3600),
    )
}

/// `Authorization` header value for `user`.
#[must_use]
pub fn bearer_for(user: &UserRecord) -> String {
    let token = test_token_issuer()
        .issue(user.id, &user.username)
        .expect("Failed to issue token");
    format!("Bearer {token}")
}

pub async fn seed_user(db: &DatabaseConnection, username: &str, role: Role) -> UserRecord {
    let record = UserRecord::new(username, format!("{username}@example.com"), role);
    OrmUsersRepository::new(db.clone())
        .insert(&record)
        .await
        .expect("Failed to seed user");
    record
}

pub async fn seed_superuser(db: &DatabaseConnection, username: &str) -> UserRecord {
    let mut record = UserRecord::new(username, format!("{username}@example.com"), Role::User);
    record.is_superuser = true;
    OrmUsersRepository::new(db.clone())
        .insert(&record)
        .await
        .expect("Failed to seed superuser");
    record
}

#[must_use]
pub fn ctx_for(user: &UserRecord) -> SecurityContext {
    SecurityContext::authenticated(user.identity())
}

#[must_use]
pub fn ctx_anonymous() -> SecurityContext {
    SecurityContext::anonymous()
}

/// Keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingMailSender {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingMailSender {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[must_use]
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().clone()
    }

    /// Confirmation code from the most recent message to `to`.
    #[must_use]
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .iter()
            .rev()
            .find(|m| m.to == to)
            .and_then(|m| m.body.rsplit(' ').next().map(str::to_owned))
    }
}

#[async_trait]
impl MailSender for RecordingMailSender {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        self.sent.lock().push(message);
        Ok(())
    }
}

/// Always fails, for best-effort delivery checks.
pub struct FailingMailSender;

#[async_trait]
impl MailSender for FailingMailSender {
    async fn send(&self, _message: MailMessage) -> Result<(), MailError> {
        Err(MailError("smtp relay unreachable".to_owned()))
    }
}
