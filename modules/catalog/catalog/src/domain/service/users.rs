use std::sync::Arc;

use catalog_sdk::{NewUser, Page, PageRequest, ProfilePatch, User, UserPatch};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use yamdb_authz::{Action, PolicyEnforcer};
use yamdb_security::{Role, SecurityContext};

use super::resources;
use crate::domain::error::{DomainError, Violations};
use crate::domain::models::UserRecord;
use crate::domain::repos::UsersRepository;
use crate::domain::validation;

pub const USERNAME_TAKEN: &str = "a user with this username already exists";
pub const EMAIL_TAKEN: &str = "a user with this email already exists";

/// User management for admins plus the caller's own profile.
///
/// The superuser flag is never writable here; it is only set by
/// [`UsersService::bootstrap_superuser`].
pub struct UsersService {
    repo: Arc<dyn UsersRepository>,
    enforcer: PolicyEnforcer,
}

impl UsersService {
    pub fn new(repo: Arc<dyn UsersRepository>, enforcer: PolicyEnforcer) -> Self {
        Self { repo, enforcer }
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &SecurityContext,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<User>, DomainError> {
        self.enforcer.check_class(ctx, &resources::USER, Action::List)?;

        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let page = self.repo.list(search, page).await?;

        debug!("Listed {} of {} users", page.results.len(), page.count);
        Ok(page.map(|u| u.to_public()))
    }

    #[instrument(skip(self, ctx, new_user), fields(username = %new_user.username))]
    pub async fn create(&self, ctx: &SecurityContext, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating user");

        self.enforcer.check_class(ctx, &resources::USER, Action::Create)?;

        let mut v = Violations::new();
        validation::username(&mut v, &new_user.username);
        validation::email(&mut v, &new_user.email);
        validate_profile(&mut v, &new_user.first_name, &new_user.last_name);
        v.finish()?;

        self.ensure_available(&new_user.username, &new_user.email, None)
            .await?;

        let mut record = UserRecord::new(new_user.username, new_user.email, new_user.role);
        record.first_name = new_user.first_name;
        record.last_name = new_user.last_name;
        record.bio = new_user.bio;
        self.repo.insert(&record).await?;

        info!(user_id = %record.id, "Created user");
        Ok(record.to_public())
    }

    #[instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &SecurityContext, username: &str) -> Result<User, DomainError> {
        self.enforcer.check_class(ctx, &resources::USER, Action::Get)?;
        Ok(self.load(username).await?.to_public())
    }

    #[instrument(skip(self, ctx, patch))]
    pub async fn update(
        &self,
        ctx: &SecurityContext,
        username: &str,
        patch: UserPatch,
    ) -> Result<User, DomainError> {
        info!("Updating user");

        self.enforcer.check_class(ctx, &resources::USER, Action::Update)?;
        let current = self.load(username).await?;

        let updated = self.apply(current, patch).await?;

        info!("Updated user");
        Ok(updated.to_public())
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &SecurityContext, username: &str) -> Result<(), DomainError> {
        info!("Deleting user");

        self.enforcer.check_class(ctx, &resources::USER, Action::Delete)?;
        let current = self.load(username).await?;

        if !self.repo.delete(current.id).await? {
            return Err(DomainError::not_found("user", username));
        }

        info!(user_id = %current.id, "Deleted user");
        Ok(())
    }

    /// The caller's own account.
    #[instrument(skip(self, ctx))]
    pub async fn me(&self, ctx: &SecurityContext) -> Result<User, DomainError> {
        let identity = self
            .enforcer
            .check_own_profile(ctx, &resources::USER, Action::Get)?;

        self.repo
            .find_by_id(identity.user_id)
            .await?
            .map(|u| u.to_public())
            .ok_or_else(|| DomainError::not_found("user", &identity.username))
    }

    /// Update the caller's own account. The role is kept as stored no
    /// matter what the caller asked for.
    #[instrument(skip(self, ctx, patch))]
    pub async fn update_me(
        &self,
        ctx: &SecurityContext,
        patch: ProfilePatch,
    ) -> Result<User, DomainError> {
        info!("Updating own profile");

        let identity = self
            .enforcer
            .check_own_profile(ctx, &resources::USER, Action::Update)?;
        let current = self
            .repo
            .find_by_id(identity.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", &identity.username))?;

        let updated = self.apply(current, UserPatch::from(patch)).await?;

        info!("Updated own profile");
        Ok(updated.to_public())
    }

    /// Create or promote a superuser admin outside of any request. Used by
    /// the server's `--create-admin` flag.
    ///
    /// # Errors
    ///
    /// [`DomainError::Validation`] for malformed input,
    /// [`DomainError::Conflict`] if the email belongs to another account.
    #[instrument(skip(self))]
    pub async fn bootstrap_superuser(
        &self,
        username: &str,
        email: &str,
    ) -> Result<User, DomainError> {
        let mut v = Violations::new();
        validation::username(&mut v, username);
        validation::email(&mut v, email);
        v.finish()?;

        if let Some(mut existing) = self.repo.find_by_username(username).await? {
            existing.role = Role::Admin;
            existing.is_superuser = true;
            existing.updated_at = OffsetDateTime::now_utc();
            self.repo.update(&existing).await?;
            info!(user_id = %existing.id, "Promoted existing user to superuser");
            return Ok(existing.to_public());
        }

        self.ensure_available(username, email, None).await?;

        let mut record = UserRecord::new(username, email, Role::Admin);
        record.is_superuser = true;
        self.repo.insert(&record).await?;

        info!(user_id = %record.id, "Created superuser");
        Ok(record.to_public())
    }

    async fn load(&self, username: &str) -> Result<UserRecord, DomainError> {
        self.repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))
    }

    async fn apply(
        &self,
        mut record: UserRecord,
        patch: UserPatch,
    ) -> Result<UserRecord, DomainError> {
        let mut v = Violations::new();
        if let Some(username) = &patch.username {
            validation::username(&mut v, username);
        }
        if let Some(email) = &patch.email {
            validation::email(&mut v, email);
        }
        validate_profile(
            &mut v,
            patch.first_name.as_deref().unwrap_or_default(),
            patch.last_name.as_deref().unwrap_or_default(),
        );
        v.finish()?;

        let new_username = patch.username.filter(|u| *u != record.username);
        let new_email = patch.email.filter(|e| *e != record.email);
        self.ensure_available(
            new_username.as_deref().unwrap_or_default(),
            new_email.as_deref().unwrap_or_default(),
            Some(&record),
        )
        .await?;

        if let Some(username) = new_username {
            record.username = username;
        }
        if let Some(email) = new_email {
            record.email = email;
        }
        if let Some(first_name) = patch.first_name {
            record.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            record.last_name = last_name;
        }
        if let Some(bio) = patch.bio {
            record.bio = bio;
        }
        if let Some(role) = patch.role {
            record.role = role;
        }
        record.updated_at = OffsetDateTime::now_utc();

        self.repo.update(&record).await?;
        Ok(record)
    }

    /// Reject a username or email already held by an account other than
    /// `owner`. Empty values are skipped.
    async fn ensure_available(
        &self,
        username: &str,
        email: &str,
        owner: Option<&UserRecord>,
    ) -> Result<(), DomainError> {
        let is_other = |found: &UserRecord| owner.is_none_or(|o| o.id != found.id);

        if !username.is_empty()
            && let Some(found) = self.repo.find_by_username(username).await?
            && is_other(&found)
        {
            return Err(DomainError::conflict("username", USERNAME_TAKEN));
        }
        if !email.is_empty()
            && let Some(found) = self.repo.find_by_email(email).await?
            && is_other(&found)
        {
            return Err(DomainError::conflict("email", EMAIL_TAKEN));
        }
        Ok(())
    }
}

fn validate_profile(v: &mut Violations, first_name: &str, last_name: &str) {
    validation::max_len(v, "first_name", first_name, validation::PERSON_NAME_MAX_LEN);
    validation::max_len(v, "last_name", last_name, validation::PERSON_NAME_MAX_LEN);
}
