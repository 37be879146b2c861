#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Security primitives shared by every YaMDb crate.
//!
//! - [`Role`] - the closed set of account roles
//! - [`Identity`] - immutable per-request snapshot of the calling account
//! - [`SecurityContext`] - anonymous or authenticated request context

pub mod context;
pub mod identity;

pub use context::{SecurityContext, SecurityContextBuilder};
pub use identity::{Identity, ParseRoleError, Role};
