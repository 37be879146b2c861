#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! YaMDb access control.
//!
//! This crate provides the policy model consulted before every operation:
//!
//! - [`Policy`] - the named policy variants attached to resource types
//! - [`ResourceType`] - static descriptor binding a resource name to its policy
//! - [`Action`] - the operation being attempted
//! - [`PolicyEnforcer`] - the single dispatcher (PEP) evaluating class- and
//!   object-level checks
//! - [`EnforcerError`] - unauthenticated vs forbidden outcomes
//!
//! ## Usage
//!
//! ```
//! use yamdb_authz::{Action, Policy, PolicyEnforcer, ResourceType};
//! use yamdb_security::SecurityContext;
//!
//! const TITLE: ResourceType = ResourceType {
//!     name: "catalog.title",
//!     policy: Policy::AdminOrReadOnly,
//! };
//!
//! let enforcer = PolicyEnforcer::new();
//! let ctx = SecurityContext::anonymous();
//! assert!(enforcer.check_class(&ctx, &TITLE, Action::List).is_ok());
//! assert!(enforcer.check_class(&ctx, &TITLE, Action::Create).is_err());
//! ```

pub mod enforcer;
pub mod policy;

pub use enforcer::{EnforcerError, PolicyEnforcer};
pub use policy::{Action, Decision, Policy, ResourceType, Tier, decide};
