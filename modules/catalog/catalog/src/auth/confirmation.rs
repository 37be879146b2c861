//! State-bound confirmation codes.
//!
//! A code is `<issued-at, hex>-<HMAC-SHA256, hex>` where the MAC covers the
//! issue time and a fingerprint of the account: id, username, email, role,
//! superuser flag and last login. Any change to those fields, including the
//! `last_login` stamp written by a successful token exchange, invalidates
//! every outstanding code. Nothing is stored server-side.

use std::time::Duration;

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::OffsetDateTime;

use crate::domain::models::UserRecord;

type HmacSha256 = Hmac<Sha256>;

const KEY_SALT: &[u8] = b"yamdb.confirmation-code";

pub struct ConfirmationCodes {
    keyed: HmacSha256,
    ttl: Duration,
}

impl std::fmt::Debug for ConfirmationCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationCodes")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ConfirmationCodes {
    /// Keys the MAC with a salted copy of `secret` so codes and access
    /// tokens never share a key.
    ///
    /// # Errors
    ///
    /// [`InvalidLength`] if the key is rejected by the MAC.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, InvalidLength> {
        let mut key = Vec::with_capacity(KEY_SALT.len() + secret.len());
        key.extend_from_slice(KEY_SALT);
        key.extend_from_slice(secret);
        Ok(Self {
            keyed: HmacSha256::new_from_slice(&key)?,
            ttl,
        })
    }

    #[must_use]
    pub fn make(&self, user: &UserRecord) -> String {
        self.make_at(user, OffsetDateTime::now_utc())
    }

    #[must_use]
    pub fn make_at(&self, user: &UserRecord, now: OffsetDateTime) -> String {
        let issued = now.unix_timestamp();
        let tag = self.mac(user, issued).finalize().into_bytes();
        format!("{issued:x}-{}", hex::encode(tag))
    }

    #[must_use]
    pub fn check(&self, user: &UserRecord, code: &str) -> bool {
        self.check_at(user, code, OffsetDateTime::now_utc())
    }

    #[must_use]
    pub fn check_at(&self, user: &UserRecord, code: &str, now: OffsetDateTime) -> bool {
        let Some((issued, tag)) = code.split_once('-') else {
            return false;
        };
        let Ok(issued) = i64::from_str_radix(issued, 16) else {
            return false;
        };
        let Ok(tag) = hex::decode(tag) else {
            return false;
        };

        let age = now.unix_timestamp().saturating_sub(issued);
        let max_age = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        if age < 0 || age > max_age {
            return false;
        }

        self.mac(user, issued).verify_slice(&tag).is_ok()
    }

    fn mac(&self, user: &UserRecord, issued: i64) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        let last_login = user
            .last_login
            .map(|t| t.unix_timestamp_nanos().to_string())
            .unwrap_or_default();
        for part in [
            user.id.to_string(),
            user.username.clone(),
            user.email.clone(),
            user.role.to_string(),
            user.is_superuser.to_string(),
            last_login,
            issued.to_string(),
        ] {
            mac.update(part.as_bytes());
            mac.update(b"\x1f");
        }
        mac
    }
}
