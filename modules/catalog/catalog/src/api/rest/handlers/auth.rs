use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use catalog_sdk::{AccessToken, SignUp};

use crate::api::rest::dto::{SignUpBody, TokenBody};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::ApiJson;
use crate::module::AppServices;

/// `POST /auth/signup/`
pub async fn sign_up(
    State(svc): State<Arc<AppServices>>,
    ApiJson(body): ApiJson<SignUpBody>,
) -> ApiResult<Json<SignUp>> {
    let request = body.into_request()?;
    Ok(Json(svc.registration.sign_up(request).await?))
}

/// `POST /auth/token/`
pub async fn token(
    State(svc): State<Arc<AppServices>>,
    ApiJson(body): ApiJson<TokenBody>,
) -> ApiResult<Json<AccessToken>> {
    let request = body.into_request()?;
    Ok(Json(svc.registration.obtain_token(request).await?))
}
