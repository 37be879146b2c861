use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::HeaderMap;
use yamdb_security::SecurityContext;

use super::error::ApiError;
use crate::module::AppServices;

/// Put a [`SecurityContext`] into the request extensions.
///
/// No `Authorization: Bearer` header means an anonymous context; policy
/// decides later whether that is enough. A bearer token that does not
/// verify is rejected here with 401.
pub async fn authn_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = match extract_bearer_token(req.headers()) {
        None => SecurityContext::anonymous(),
        Some(token) => match services.authenticator.authenticate(token).await {
            Ok(ctx) => ctx,
            Err(err) => return ApiError::from(err).into_response(),
        },
    };

    req.extensions_mut().insert(ctx);
    next.run(req).await
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
}
