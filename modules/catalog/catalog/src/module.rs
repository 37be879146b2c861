//! Wiring: repositories, auth collaborators and services behind one handle.

use std::sync::Arc;

use axum::Router;
use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use yamdb_authz::PolicyEnforcer;

use crate::auth::{Authenticator, ConfirmationCodes, TokenIssuer};
use crate::config::{AuthConfig, CatalogConfig, ConfigError, MailConfig};
use crate::domain::ports::MailSender;
use crate::domain::repos::{ReviewsRepository, TitlesRepository, UsersRepository};
use crate::domain::service::{
    CommentsService, RegistrationService, ReviewsService, ServiceConfig, TaxonomyService,
    TitlesService, UsersService, resources,
};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{
    OrmCategoriesRepository, OrmCommentsRepository, OrmGenresRepository, OrmReviewsRepository,
    OrmTitlesRepository, OrmUsersRepository,
};

/// Every service the REST layer calls, shared as router state.
pub struct AppServices {
    pub categories: TaxonomyService,
    pub genres: TaxonomyService,
    pub titles: TitlesService,
    pub reviews: ReviewsService,
    pub comments: CommentsService,
    pub users: UsersService,
    pub registration: RegistrationService,
    pub authenticator: Authenticator,
    pub config: ServiceConfig,
}

/// The catalog module: owns the database handle and the service graph.
pub struct CatalogModule {
    db: DatabaseConnection,
    services: Arc<AppServices>,
}

impl CatalogModule {
    /// # Errors
    ///
    /// [`ConfigError`] if the token secret is missing or too short, or the
    /// page size settings are inconsistent.
    pub fn new(
        db: DatabaseConnection,
        auth: &AuthConfig,
        mail: &MailConfig,
        catalog: &CatalogConfig,
        mailer: Arc<dyn MailSender>,
    ) -> Result<Self, ConfigError> {
        catalog.validate()?;
        let secret = auth.secret_bytes()?;

        let tokens = Arc::new(TokenIssuer::new(
            secret,
            auth.issuer.clone(),
            auth.access_token_ttl,
        ));
        let codes = ConfirmationCodes::new(secret, auth.confirmation_code_ttl)
            .map_err(|_| ConfigError::InvalidCodeKey)?;

        let users: Arc<dyn UsersRepository> = Arc::new(OrmUsersRepository::new(db.clone()));
        let titles: Arc<dyn TitlesRepository> = Arc::new(OrmTitlesRepository::new(db.clone()));
        let reviews: Arc<dyn ReviewsRepository> =
            Arc::new(OrmReviewsRepository::new(db.clone()));
        let categories = Arc::new(OrmCategoriesRepository::new(db.clone()));
        let genres = Arc::new(OrmGenresRepository::new(db.clone()));
        let comments = Arc::new(OrmCommentsRepository::new(db.clone()));

        let enforcer = PolicyEnforcer;
        let services = AppServices {
            categories: TaxonomyService::new(
                resources::CATEGORY,
                "category",
                categories.clone(),
                enforcer,
            ),
            genres: TaxonomyService::new(resources::GENRE, "genre", genres.clone(), enforcer),
            titles: TitlesService::new(Arc::clone(&titles), categories, genres, enforcer),
            reviews: ReviewsService::new(titles, Arc::clone(&reviews), enforcer),
            comments: CommentsService::new(reviews, comments, enforcer),
            users: UsersService::new(Arc::clone(&users), enforcer),
            registration: RegistrationService::new(
                Arc::clone(&users),
                codes,
                Arc::clone(&tokens),
                mailer,
                mail.from.clone(),
            ),
            authenticator: Authenticator::new(tokens, users),
            config: ServiceConfig::from(catalog),
        };

        Ok(Self {
            db,
            services: Arc::new(services),
        })
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// The underlying [`DbErr`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), DbErr> {
        Migrator::up(&self.db, None).await?;
        info!("Catalog schema is up to date");
        Ok(())
    }

    #[must_use]
    pub fn router(&self) -> Router {
        crate::api::rest::router(Arc::clone(&self.services))
    }

    #[must_use]
    pub fn services(&self) -> &Arc<AppServices> {
        &self.services
    }
}
