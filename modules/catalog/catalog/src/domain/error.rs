use std::collections::BTreeMap;
use std::fmt;

use sea_orm::DbErr;
use yamdb_authz::EnforcerError;

/// Field name to list of reasons.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Errors produced by the catalog domain services.
///
/// Converted into problem responses at the REST boundary; see
/// `api::rest::error`.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("validation failed: {}", summarize(.0))]
    Validation(FieldErrors),

    #[error("authentication credentials were not provided")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{field}: {message}")]
    Conflict { field: &'static str, message: String },

    /// Unknown user or wrong, expired or already used code. Deliberately
    /// indistinguishable.
    #[error("invalid confirmation code")]
    InvalidConfirmationCode,

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![reason.into()]);
        Self::Validation(errors)
    }

    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(field: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            field,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, reasons)| format!("{field}: {}", reasons.join("; ")))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<EnforcerError> for DomainError {
    fn from(err: EnforcerError) -> Self {
        match err {
            EnforcerError::Unauthenticated => Self::Unauthenticated,
            forbidden @ EnforcerError::Forbidden { .. } => Self::Forbidden(forbidden.to_string()),
        }
    }
}

impl From<DbErr> for DomainError {
    fn from(err: DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Collects per-field validation failures and reports them together.
#[derive(Debug, Default)]
pub struct Violations(FieldErrors);

impl Violations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, reason: impl Into<String>) {
        self.0.entry(field.to_owned()).or_default().push(reason.into());
    }

    /// Unwrap a required field, recording a violation when it is absent.
    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.push(field, "this field is required");
        }
        value
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// # Errors
    ///
    /// [`DomainError::Validation`] carrying every recorded violation.
    pub fn finish(self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.0))
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use yamdb_authz::Action;

    #[test]
    fn enforcer_errors_keep_their_kind() {
        assert!(matches!(
            DomainError::from(EnforcerError::Unauthenticated),
            DomainError::Unauthenticated
        ));
        let err = DomainError::from(EnforcerError::Forbidden {
            resource: "catalog.title",
            action: Action::Create,
        });
        match err {
            DomainError::Forbidden(msg) => assert_eq!(msg, "not allowed to create catalog.title"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn violations_accumulate_per_field() {
        let mut v = Violations::new();
        v.push("score", "must be between 1 and 10");
        assert_eq!(v.required::<String>("text", None), None);
        v.push("score", "must be an integer");

        let Err(DomainError::Validation(errors)) = v.finish() else {
            panic!("expected validation error");
        };
        assert_eq!(errors["score"].len(), 2);
        assert_eq!(errors["text"], vec!["this field is required".to_owned()]);
    }

    #[test]
    fn empty_violations_pass() {
        assert!(Violations::new().finish().is_ok());
    }
}
