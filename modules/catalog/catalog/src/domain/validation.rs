//! Field rules shared by services.

use std::sync::LazyLock;

use regex::Regex;
use time::OffsetDateTime;

use crate::domain::error::Violations;

pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PERSON_NAME_MAX_LEN: usize = 150;
pub const TITLE_NAME_MAX_LEN: usize = 256;
pub const TAXON_NAME_MAX_LEN: usize = 256;
pub const SLUG_MAX_LEN: usize = 50;
pub const SCORE_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

pub const DUPLICATE_REVIEW: &str = "you have already reviewed this title";

/// Path segment of the self-profile endpoint; never a valid username.
pub const RESERVED_USERNAME: &str = "me";

#[allow(clippy::expect_used)]
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

#[allow(clippy::expect_used)]
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"));

pub fn username(v: &mut Violations, value: &str) {
    if value.is_empty() {
        v.push("username", "this field may not be blank");
        return;
    }
    if value.chars().count() > USERNAME_MAX_LEN {
        v.push(
            "username",
            format!("ensure this field has no more than {USERNAME_MAX_LEN} characters"),
        );
    }
    if !USERNAME_RE.is_match(value) {
        v.push(
            "username",
            "may contain only letters, digits and the characters . @ + - _",
        );
    }
    if value == RESERVED_USERNAME {
        v.push("username", format!("'{RESERVED_USERNAME}' cannot be used as a username"));
    }
}

/// Deliberately loose: a single `@` with non-empty local part and a domain
/// containing a dot. Deliverability is the mailer's problem.
pub fn email(v: &mut Violations, value: &str) {
    if value.is_empty() {
        v.push("email", "this field may not be blank");
        return;
    }
    if value.chars().count() > EMAIL_MAX_LEN {
        v.push(
            "email",
            format!("ensure this field has no more than {EMAIL_MAX_LEN} characters"),
        );
    }
    let well_formed = value
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        });
    if !well_formed || value.chars().any(char::is_whitespace) {
        v.push("email", "enter a valid email address");
    }
}

pub fn max_len(v: &mut Violations, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        v.push(field, format!("ensure this field has no more than {max} characters"));
    }
}

pub fn not_blank(v: &mut Violations, field: &str, value: &str) {
    if value.trim().is_empty() {
        v.push(field, "this field may not be blank");
    }
}

pub fn slug(v: &mut Violations, value: &str) {
    if value.is_empty() {
        v.push("slug", "this field may not be blank");
        return;
    }
    max_len(v, "slug", value, SLUG_MAX_LEN);
    if !SLUG_RE.is_match(value) {
        v.push("slug", "enter a valid slug of letters, numbers, underscores or hyphens");
    }
}

pub fn score(v: &mut Violations, value: i32) {
    if !SCORE_RANGE.contains(&value) {
        v.push(
            "score",
            format!(
                "must be between {} and {}",
                SCORE_RANGE.start(),
                SCORE_RANGE.end()
            ),
        );
    }
}

/// Release year may not be in the future, judged at validation time.
pub fn year(v: &mut Violations, value: i32) {
    let current = OffsetDateTime::now_utc().year();
    if value > current {
        v.push("year", format!("cannot be later than the current year ({current})"));
    }
}
