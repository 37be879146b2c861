use std::fmt;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

const ACCESS_TOKEN_TYPE: &str = "access";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token is not an access token")]
    WrongType,

    #[error("token lifetime is out of range")]
    Lifetime,
}

/// Claims of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub token_type: String,
}

/// Issues and verifies HS256 bearer tokens.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Self {
        let issuer = issuer.into();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            issuer,
            ttl,
        }
    }

    /// # Errors
    ///
    /// [`TokenError::Signing`] if encoding fails.
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, username, OffsetDateTime::now_utc())
    }

    /// # Errors
    ///
    /// Same as [`TokenIssuer::issue`].
    pub fn issue_at(
        &self,
        user_id: Uuid,
        username: &str,
        now: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let ttl = time::Duration::try_from(self.ttl).map_err(|_| TokenError::Lifetime)?;
        let claims = Claims {
            sub: user_id,
            username: username.to_owned(),
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
            iss: self.issuer.clone(),
            token_type: ACCESS_TOKEN_TYPE.to_owned(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Check signature, issuer, expiry and token type.
    ///
    /// # Errors
    ///
    /// [`TokenError::Invalid`] or [`TokenError::WrongType`].
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(TokenError::Invalid)?;
        if data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(TokenError::WrongType);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, "yamdb", Duration::from_secs(3600))
    }

    #[test]
    fn issued_token_verifies_with_subject_and_username() {
        let id = Uuid::now_v7();
        let token = issuer().issue(id, "alice").unwrap();
        let claims = issuer().verify(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, "yamdb");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = OffsetDateTime::now_utc() - time::Duration::days(2);
        let token = issuer().issue_at(Uuid::now_v7(), "alice", issued).unwrap();
        assert!(matches!(issuer().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let other = TokenIssuer::new(
            b"another-secret-another-secret-xx",
            "yamdb",
            Duration::from_secs(60),
        );
        let token = other.issue(Uuid::now_v7(), "mallory").unwrap();
        assert!(matches!(issuer().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn token_from_another_issuer_is_rejected() {
        let other = TokenIssuer::new(SECRET, "elsewhere", Duration::from_secs(60));
        let token = other.issue(Uuid::now_v7(), "alice").unwrap();
        assert!(issuer().verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(issuer().verify("not.a.token").is_err());
    }

    #[test]
    fn debug_does_not_leak_keys() {
        let rendered = format!("{:?}", issuer());
        assert!(rendered.contains("yamdb"));
        assert!(!rendered.contains("0123456789abcdef"));
    }
}
