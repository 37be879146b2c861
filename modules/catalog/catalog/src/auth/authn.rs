use std::sync::Arc;

use yamdb_security::SecurityContext;

use crate::auth::tokens::TokenIssuer;
use crate::domain::error::DomainError;
use crate::domain::repos::UsersRepository;

/// Resolves a bearer token into a [`SecurityContext`].
///
/// The identity snapshot is reloaded from storage for every request, so a
/// role change or account deletion takes effect on the caller's next
/// request rather than when their token expires.
pub struct Authenticator {
    tokens: Arc<TokenIssuer>,
    users: Arc<dyn UsersRepository>,
}

impl Authenticator {
    pub fn new(tokens: Arc<TokenIssuer>, users: Arc<dyn UsersRepository>) -> Self {
        Self { tokens, users }
    }

    /// # Errors
    ///
    /// [`DomainError::Unauthenticated`] for an invalid or expired token or a
    /// token whose subject no longer exists; [`DomainError::Database`] on
    /// storage failure.
    pub async fn authenticate(&self, token: &str) -> Result<SecurityContext, DomainError> {
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            DomainError::Unauthenticated
        })?;

        let Some(user) = self.users.find_by_id(claims.sub).await? else {
            tracing::debug!(subject = %claims.sub, "token subject no longer exists");
            return Err(DomainError::Unauthenticated);
        };

        Ok(SecurityContext::authenticated(user.identity()))
    }
}
