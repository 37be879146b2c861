use uuid::Uuid;

use crate::identity::{Identity, Role};

/// Security context attached to every request.
///
/// Either anonymous (no credentials were presented) or authenticated with an
/// [`Identity`] snapshot loaded from storage when the request arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    identity: Option<Identity>,
}

impl SecurityContext {
    /// Context for a caller that presented no credentials.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    #[must_use]
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub fn subject_id(&self) -> Option<Uuid> {
        self.identity.as_ref().map(|i| i.user_id)
    }
}

/// Builder used mostly by tests and the authentication middleware.
#[derive(Debug, Clone, Default)]
pub struct SecurityContextBuilder {
    subject_id: Option<Uuid>,
    username: Option<String>,
    role: Role,
    is_superuser: bool,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn subject_id(mut self, id: Uuid) -> Self {
        self.subject_id = Some(id);
        self
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    /// Builds an authenticated context. A missing subject id yields an
    /// anonymous context.
    #[must_use]
    pub fn build(self) -> SecurityContext {
        let Some(user_id) = self.subject_id else {
            return SecurityContext::anonymous();
        };
        let identity = Identity::new(user_id, self.username.unwrap_or_default(), self.role)
            .with_superuser(self.is_superuser);
        SecurityContext::authenticated(identity)
    }
}
