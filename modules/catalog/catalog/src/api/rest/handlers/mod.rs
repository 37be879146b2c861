//! Route handlers. Each one extracts, calls a single service operation and
//! picks the status code.

pub mod auth;
pub mod comments;
pub mod reviews;
pub mod taxonomy;
pub mod titles;
pub mod users;
