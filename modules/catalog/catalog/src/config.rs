use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Minimum accepted length of the token signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("auth.token_secret is not set")]
    MissingTokenSecret,

    #[error("auth.token_secret must be at least {MIN_SECRET_LEN} bytes long")]
    WeakTokenSecret,

    #[error("auth.token_secret cannot key the confirmation code MAC")]
    InvalidCodeKey,

    #[error("catalog.default_page_size ({default}) must be between 1 and max_page_size ({max})")]
    InvalidPageSize { default: u64, max: u64 },
}

/// Token and confirmation code settings.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC key for access tokens and confirmation codes. Required.
    pub token_secret: Option<SecretString>,

    /// Lifetime of an issued access token.
    #[serde(with = "duration_str")]
    pub access_token_ttl: Duration,

    /// How long a mailed confirmation code stays valid.
    #[serde(with = "duration_str")]
    pub confirmation_code_ttl: Duration,

    /// `iss` claim of issued tokens.
    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: None,
            access_token_ttl: Duration::from_secs(24 * 60 * 60),
            confirmation_code_ttl: Duration::from_secs(3 * 24 * 60 * 60),
            issuer: "yamdb".to_owned(),
        }
    }
}

impl AuthConfig {
    /// Raw signing secret bytes.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingTokenSecret`] if unset, [`ConfigError::WeakTokenSecret`]
    /// if shorter than [`MIN_SECRET_LEN`].
    pub fn secret_bytes(&self) -> Result<&[u8], ConfigError> {
        let secret = self
            .token_secret
            .as_ref()
            .ok_or(ConfigError::MissingTokenSecret)?
            .expose_secret()
            .as_bytes();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakTokenSecret);
        }
        Ok(secret)
    }
}

/// Outgoing mail settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailConfig {
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: "noreply@yamdb.local".to_owned(),
        }
    }
}

/// Catalog listing settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl CatalogConfig {
    /// # Errors
    ///
    /// [`ConfigError::InvalidPageSize`] if the default page size is zero or
    /// above the maximum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::InvalidPageSize {
                default: self.default_page_size,
                max: self.max_page_size,
            });
        }
        Ok(())
    }
}

/// `humantime` strings ("15m", "1day") for `Duration` fields.
mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
