//! Policy Enforcement Point (`PEP`) object.
//!
//! [`PolicyEnforcer`] is the single dispatcher every service consults before
//! touching storage. Services call [`PolicyEnforcer::check_class`] before
//! loading anything, and [`PolicyEnforcer::check_object`] once the target is
//! loaded and its owner is known.

use uuid::Uuid;
use yamdb_security::{Identity, SecurityContext};

use crate::policy::{Action, Decision, ResourceType, Tier, decide};

/// Error from the PEP enforcement flow.
///
/// The two variants must stay distinguishable: callers translate them to
/// `401` and `403` respectively.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnforcerError {
    /// A caller is required but none was authenticated.
    #[error("authentication credentials were not provided")]
    Unauthenticated,

    /// The authenticated caller is not allowed to perform the action.
    #[error("not allowed to {action} {resource}")]
    Forbidden {
        resource: &'static str,
        action: Action,
    },
}

/// Policy Enforcement Point.
///
/// Stateless and `Copy`; construct once during service init and keep a copy
/// in each service. The resource type is supplied per call via a
/// [`ResourceType`] descriptor, so one enforcer serves every resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEnforcer;

impl PolicyEnforcer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Class-level check, evaluated before the target is loaded.
    ///
    /// # Errors
    ///
    /// - [`EnforcerError::Unauthenticated`] if the action needs a caller and there is none
    /// - [`EnforcerError::Forbidden`] if the caller's capabilities are insufficient
    pub fn check_class(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceType,
        action: Action,
    ) -> Result<(), EnforcerError> {
        self.enforce(ctx, resource, action, Tier::Class)
    }

    /// Object-level check, evaluated after the target is loaded.
    ///
    /// # Errors
    ///
    /// Same as [`PolicyEnforcer::check_class`].
    pub fn check_object(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceType,
        action: Action,
        owner_id: Uuid,
    ) -> Result<(), EnforcerError> {
        self.enforce(ctx, resource, action, Tier::Object { owner_id })
    }

    /// Check access to the caller's own account record and return the
    /// caller's identity.
    ///
    /// # Errors
    ///
    /// Same as [`PolicyEnforcer::check_class`].
    pub fn check_own_profile<'a>(
        &self,
        ctx: &'a SecurityContext,
        resource: &ResourceType,
        action: Action,
    ) -> Result<&'a Identity, EnforcerError> {
        self.enforce(ctx, resource, action, Tier::OwnProfile)?;
        ctx.identity().ok_or(EnforcerError::Unauthenticated)
    }

    #[allow(clippy::unused_self)]
    fn enforce(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceType,
        action: Action,
        tier: Tier,
    ) -> Result<(), EnforcerError> {
        match decide(resource.policy, ctx.identity(), action, tier) {
            Decision::Allow => Ok(()),
            Decision::Unauthenticated => {
                tracing::debug!(
                    resource = resource.name,
                    %action,
                    "rejected anonymous caller"
                );
                Err(EnforcerError::Unauthenticated)
            }
            Decision::Forbidden => {
                tracing::debug!(
                    resource = resource.name,
                    %action,
                    subject_id = ?ctx.subject_id(),
                    "access denied by policy"
                );
                Err(EnforcerError::Forbidden {
                    resource: resource.name,
                    action,
                })
            }
        }
    }
}
