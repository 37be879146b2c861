//! Policy variants and the decision function.
//!
//! ## Decision matrix
//!
//! | policy | safe action | mutating action, class tier | mutating action, object tier |
//! |--------|-------------|-----------------------------|------------------------------|
//! | `AdminOrReadOnly` | allow | admin | admin |
//! | `AuthorStaffOrReadOnly` | allow | authenticated | author, moderator or admin |
//! | `AdminOnlyWithSelfProfile` | admin | admin | admin |
//!
//! The own-profile tier of `AdminOnlyWithSelfProfile` only needs an
//! authenticated caller. Whenever a check needs a caller and there is none,
//! the decision is [`Decision::Unauthenticated`], never [`Decision::Forbidden`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use yamdb_security::Identity;

/// Operation being attempted on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Read-only actions (`GET`/`HEAD`/`OPTIONS` in HTTP terms).
    #[must_use]
    pub const fn is_safe(self) -> bool {
        matches!(self, Action::List | Action::Get)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Get => "get",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named access policy attached to a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Taxonomy and catalog resources: anyone reads, admins write.
    AdminOrReadOnly,
    /// Authored content: anyone reads, authenticated users create, the
    /// author or staff modify.
    AuthorStaffOrReadOnly,
    /// User management: admins only, except each caller's own profile.
    AdminOnlyWithSelfProfile,
}

/// Static descriptor for a resource type and the policy guarding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceType {
    /// Dotted resource type name (e.g. `"catalog.review"`).
    pub name: &'static str,
    pub policy: Policy,
}

/// Which tier of the policy is being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Before the target is loaded.
    Class,
    /// After the target is loaded; carries the target's owner.
    Object { owner_id: Uuid },
    /// The caller's own account record.
    OwnProfile,
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Unauthenticated,
    Forbidden,
}

impl Decision {
    fn from_grant(granted: bool) -> Self {
        if granted {
            Decision::Allow
        } else {
            Decision::Forbidden
        }
    }
}

/// Evaluate `policy` for `caller` attempting `action` at `tier`.
#[must_use]
pub fn decide(policy: Policy, caller: Option<&Identity>, action: Action, tier: Tier) -> Decision {
    let open_read = action.is_safe() && policy != Policy::AdminOnlyWithSelfProfile;
    if open_read {
        return Decision::Allow;
    }

    let Some(caller) = caller else {
        return Decision::Unauthenticated;
    };

    match (policy, tier) {
        (Policy::AdminOrReadOnly, _) => Decision::from_grant(caller.is_admin()),
        (Policy::AuthorStaffOrReadOnly, Tier::Class | Tier::OwnProfile) => Decision::Allow,
        (Policy::AuthorStaffOrReadOnly, Tier::Object { owner_id }) => {
            Decision::from_grant(owner_id == caller.user_id || caller.is_staff())
        }
        (Policy::AdminOnlyWithSelfProfile, Tier::OwnProfile) => Decision::Allow,
        (Policy::AdminOnlyWithSelfProfile, Tier::Class | Tier::Object { .. }) => {
            Decision::from_grant(caller.is_admin())
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use yamdb_security::Role;

    const MUTATIONS: [Action; 3] = [Action::Create, Action::Update, Action::Delete];

    fn caller(role: Role) -> Identity {
        Identity::new(Uuid::new_v4(), "caller", role)
    }

    #[test]
    fn admin_or_read_only_reads_are_open() {
        for action in [Action::List, Action::Get] {
            assert_eq!(
                decide(Policy::AdminOrReadOnly, None, action, Tier::Class),
                Decision::Allow
            );
        }
    }

    #[test]
    fn admin_or_read_only_mutations_require_admin() {
        for action in MUTATIONS {
            assert_eq!(
                decide(Policy::AdminOrReadOnly, None, action, Tier::Class),
                Decision::Unauthenticated
            );
            for role in [Role::User, Role::Moderator] {
                assert_eq!(
                    decide(Policy::AdminOrReadOnly, Some(&caller(role)), action, Tier::Class),
                    Decision::Forbidden
                );
            }
            assert_eq!(
                decide(
                    Policy::AdminOrReadOnly,
                    Some(&caller(Role::Admin)),
                    action,
                    Tier::Class
                ),
                Decision::Allow
            );
        }
    }

    #[test]
    fn superuser_passes_admin_checks_with_user_role() {
        let su = caller(Role::User).with_superuser(true);
        assert_eq!(
            decide(Policy::AdminOrReadOnly, Some(&su), Action::Delete, Tier::Class),
            Decision::Allow
        );
        assert_eq!(
            decide(Policy::AdminOnlyWithSelfProfile, Some(&su), Action::List, Tier::Class),
            Decision::Allow
        );
    }

    #[test]
    fn authored_content_class_tier_needs_authentication_only() {
        assert_eq!(
            decide(Policy::AuthorStaffOrReadOnly, None, Action::Create, Tier::Class),
            Decision::Unauthenticated
        );
        assert_eq!(
            decide(
                Policy::AuthorStaffOrReadOnly,
                Some(&caller(Role::User)),
                Action::Create,
                Tier::Class
            ),
            Decision::Allow
        );
    }

    #[test]
    fn authored_content_object_tier_is_author_or_staff() {
        let author = caller(Role::User);
        let stranger = caller(Role::User);
        let tier = Tier::Object {
            owner_id: author.user_id,
        };

        for action in [Action::Update, Action::Delete] {
            let d = |who: &Identity| decide(Policy::AuthorStaffOrReadOnly, Some(who), action, tier);
            assert_eq!(d(&author), Decision::Allow);
            assert_eq!(d(&stranger), Decision::Forbidden);
            assert_eq!(d(&caller(Role::Moderator)), Decision::Allow);
            assert_eq!(d(&caller(Role::Admin)), Decision::Allow);
            assert_eq!(d(&caller(Role::User).with_superuser(true)), Decision::Allow);
        }
    }

    #[test]
    fn user_management_is_closed_even_for_reads() {
        assert_eq!(
            decide(Policy::AdminOnlyWithSelfProfile, None, Action::List, Tier::Class),
            Decision::Unauthenticated
        );
        assert_eq!(
            decide(
                Policy::AdminOnlyWithSelfProfile,
                Some(&caller(Role::Moderator)),
                Action::Get,
                Tier::Class
            ),
            Decision::Forbidden
        );
    }

    #[test]
    fn own_profile_requires_only_authentication() {
        assert_eq!(
            decide(Policy::AdminOnlyWithSelfProfile, None, Action::Get, Tier::OwnProfile),
            Decision::Unauthenticated
        );
        assert_eq!(
            decide(
                Policy::AdminOnlyWithSelfProfile,
                Some(&caller(Role::User)),
                Action::Update,
                Tier::OwnProfile
            ),
            Decision::Allow
        );
    }
}
