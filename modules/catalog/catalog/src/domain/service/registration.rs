use std::sync::Arc;

use catalog_sdk::{AccessToken, SignUp, TokenRequest};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use yamdb_security::Role;

use super::users::{EMAIL_TAKEN, USERNAME_TAKEN};
use crate::auth::{ConfirmationCodes, TokenIssuer};
use crate::domain::error::{DomainError, Violations};
use crate::domain::models::UserRecord;
use crate::domain::ports::{MailMessage, MailSender};
use crate::domain::repos::UsersRepository;
use crate::domain::validation;

pub const CONFIRMATION_SUBJECT: &str = "Confirmation code";

/// Public sign-up and confirmation-code exchange.
pub struct RegistrationService {
    users: Arc<dyn UsersRepository>,
    codes: ConfirmationCodes,
    tokens: Arc<TokenIssuer>,
    mailer: Arc<dyn MailSender>,
    mail_from: String,
}

impl RegistrationService {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        codes: ConfirmationCodes,
        tokens: Arc<TokenIssuer>,
        mailer: Arc<dyn MailSender>,
        mail_from: String,
    ) -> Self {
        Self {
            users,
            codes,
            tokens,
            mailer,
            mail_from,
        }
    }

    /// Register `(username, email)` or re-send a code to an account that
    /// already has exactly that pair. A new code is mailed either way.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Validation`] for malformed or reserved values
    /// - [`DomainError::Conflict`] on `username` when the username belongs to
    ///   an account with another email, on `email` when the email belongs to
    ///   an account with another username
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn sign_up(&self, request: SignUp) -> Result<SignUp, DomainError> {
        info!("Sign-up requested");

        let mut v = Violations::new();
        validation::username(&mut v, &request.username);
        validation::email(&mut v, &request.email);
        v.finish()?;

        let user = match self.users.find_by_username(&request.username).await? {
            Some(existing) if existing.email == request.email => existing,
            Some(_) => return Err(DomainError::conflict("username", USERNAME_TAKEN)),
            None => {
                if self.users.find_by_email(&request.email).await?.is_some() {
                    return Err(DomainError::conflict("email", EMAIL_TAKEN));
                }
                let record = UserRecord::new(&request.username, &request.email, Role::User);
                self.users.insert(&record).await?;
                info!(user_id = %record.id, "Registered new user");
                record
            }
        };

        self.send_code(&user).await;
        Ok(request)
    }

    /// Exchange a confirmation code for an access token. The code is spent:
    /// the login stamp written here invalidates it, and the stamp only lands
    /// if no other exchange stamped the account since the code was checked.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidConfirmationCode`] for an unknown username and
    /// for a wrong, expired or spent code alike.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn obtain_token(&self, request: TokenRequest) -> Result<AccessToken, DomainError> {
        let mut v = Violations::new();
        validation::not_blank(&mut v, "username", &request.username);
        validation::not_blank(&mut v, "confirmation_code", &request.confirmation_code);
        v.finish()?;

        let Some(user) = self.users.find_by_username(&request.username).await? else {
            info!("Token refused");
            return Err(DomainError::InvalidConfirmationCode);
        };
        if !self.codes.check(&user, &request.confirmation_code) {
            info!("Token refused");
            return Err(DomainError::InvalidConfirmationCode);
        }

        let stamped = self
            .users
            .stamp_login(user.id, user.last_login, OffsetDateTime::now_utc())
            .await?;
        if !stamped {
            info!("Token refused, code already spent");
            return Err(DomainError::InvalidConfirmationCode);
        }
        let token = self
            .tokens
            .issue(user.id, &user.username)
            .map_err(|e| DomainError::internal(e.to_string()))?;

        info!(user_id = %user.id, "Token issued");
        Ok(AccessToken { token })
    }

    async fn send_code(&self, user: &UserRecord) {
        let message = MailMessage {
            from: self.mail_from.clone(),
            to: user.email.clone(),
            subject: CONFIRMATION_SUBJECT.to_owned(),
            body: format!("Your confirmation code: {}", self.codes.make(user)),
        };
        if let Err(e) = self.mailer.send(message).await {
            warn!(error = %e, user_id = %user.id, "Confirmation mail delivery failed (continuing)");
        }
    }
}
