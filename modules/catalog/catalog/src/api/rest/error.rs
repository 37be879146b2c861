//! Problem responses (`application/problem+json`).

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::error::{DomainError, FieldErrors};

const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";
const PROBLEM_BASE: &str = "https://yamdb.local/problems/";

/// Problem details body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Field name to reasons; present for validation failures and conflicts.
    #[serde(default, skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
}

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError {
    problem: Problem,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn new(status: StatusCode, kind: &str, title: &str, detail: Option<String>) -> Self {
        Self {
            problem: Problem {
                problem_type: format!("{PROBLEM_BASE}{kind}"),
                title: title.to_owned(),
                status: status.as_u16(),
                detail,
                errors: FieldErrors::new(),
            },
        }
    }

    fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.problem.errors = errors;
        self
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "bad-request",
            "Bad Request",
            Some(detail.into()),
        )
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "not-found",
            "Not Found",
            Some(detail.into()),
        )
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[must_use]
    pub fn problem(&self) -> &Problem {
        &self.problem
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => Self::new(
                StatusCode::BAD_REQUEST,
                "validation-error",
                "Validation Error",
                Some("one or more fields are invalid".to_owned()),
            )
            .with_errors(errors),
            DomainError::InvalidConfirmationCode => {
                let mut errors = FieldErrors::new();
                errors.insert(
                    "confirmation_code".to_owned(),
                    vec![DomainError::InvalidConfirmationCode.to_string()],
                );
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "validation-error",
                    "Validation Error",
                    Some(DomainError::InvalidConfirmationCode.to_string()),
                )
                .with_errors(errors)
            }
            DomainError::Unauthenticated => Self::new(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized",
                Some(DomainError::Unauthenticated.to_string()),
            ),
            DomainError::Forbidden(detail) => {
                Self::new(StatusCode::FORBIDDEN, "forbidden", "Forbidden", Some(detail))
            }
            DomainError::NotFound { entity, .. } => Self::not_found(format!("{entity} not found")),
            DomainError::Conflict { field, message } => {
                let mut errors = FieldErrors::new();
                errors.insert(field.to_owned(), vec![message.clone()]);
                Self::new(StatusCode::CONFLICT, "conflict", "Conflict", Some(message))
                    .with_errors(errors)
            }
            DomainError::Database(msg) | DomainError::Internal(msg) => {
                error!(error = %msg, "Request failed with an internal error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal Server Error",
                    None,
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection, "Rejected request body");
        let status = rejection.status();
        let mut err = Self::bad_request(rejection.body_text());
        if status == StatusCode::UNSUPPORTED_MEDIA_TYPE {
            err.problem.status = status.as_u16();
            err.problem.title = "Unsupported Media Type".to_owned();
        }
        err
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!(error = %rejection, "Rejected query string");
        Self::bad_request(rejection.body_text())
    }
}

/// Unparseable path ids cannot name an existing resource.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        debug!(error = %rejection, "Rejected path");
        Self::not_found("resource not found")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(self.problem)).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PROBLEM_CONTENT_TYPE),
        );
        if status == StatusCode::UNAUTHORIZED {
            headers.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn conflict_names_the_field() {
        let err = ApiError::from(DomainError::conflict("email", "taken"));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.problem().errors["email"], vec!["taken".to_owned()]);
    }

    #[test]
    fn invalid_code_is_a_field_error() {
        let err = ApiError::from(DomainError::InvalidConfirmationCode);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.problem().errors.contains_key("confirmation_code"));
    }

    #[test]
    fn internal_detail_is_hidden() {
        let err = ApiError::from(DomainError::Database("disk I/O error".to_owned()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.problem().detail, None);
    }

    #[test]
    fn unauthorized_carries_challenge() {
        let response = ApiError::from(DomainError::Unauthenticated).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE),
            Some(&HeaderValue::from_static("Bearer"))
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static(PROBLEM_CONTENT_TYPE))
        );
    }
}
