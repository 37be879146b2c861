//! Access tokens, confirmation codes and bearer authentication.

pub mod authn;
pub mod confirmation;
pub mod tokens;

pub use authn::Authenticator;
pub use confirmation::ConfirmationCodes;
pub use tokens::{Claims, TokenError, TokenIssuer};
