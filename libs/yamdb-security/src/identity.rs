//! Account roles and the capability evaluator.
//!
//! Every permission fact in the system is derived here. Policy code asks an
//! [`Identity`] whether it `is_admin()` instead of inspecting `role` and the
//! superuser flag separately.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Moderator, Role::Admin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the known role names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}', expected one of: user, moderator, admin")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseRoleError(s.to_owned()))
    }
}

/// Snapshot of the authenticated account, taken once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    /// Superuser accounts hold admin capability regardless of `role`.
    #[serde(default)]
    pub is_superuser: bool,
}

impl Identity {
    #[must_use]
    pub fn new(user_id: Uuid, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            is_superuser: false,
        }
    }

    #[must_use]
    pub fn with_superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    #[must_use]
    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }

    /// Admin capability: either the admin role or the superuser flag.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }

    /// Moderators and admins may act on content they do not own.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.is_moderator() || self.is_admin()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity::new(Uuid::new_v4(), "someone", role)
    }

    #[test]
    fn plain_user_has_no_elevated_capabilities() {
        let id = identity(Role::User);
        assert!(id.is_user());
        assert!(!id.is_moderator());
        assert!(!id.is_admin());
        assert!(!id.is_staff());
    }

    #[test]
    fn moderator_is_staff_but_not_admin() {
        let id = identity(Role::Moderator);
        assert!(id.is_moderator());
        assert!(!id.is_admin());
        assert!(id.is_staff());
    }

    #[test]
    fn admin_role_grants_admin() {
        assert!(identity(Role::Admin).is_admin());
    }

    #[test]
    fn superuser_flag_grants_admin_for_any_role() {
        for role in Role::ALL {
            let id = identity(role).with_superuser(true);
            assert!(id.is_admin(), "superuser with role {role} must be admin");
        }
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(
            "root".parse::<Role>().unwrap_err().to_string(),
            "unknown role 'root', expected one of: user, moderator, admin"
        );
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Moderator).unwrap();
        assert_eq!(json, "\"moderator\"");
    }
}
