use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, State};
use catalog_sdk::{Page, ProfilePatch, User};
use http::StatusCode;
use yamdb_security::SecurityContext;

use crate::api::rest::dto::{ListParams, ProfileBody, UserBody};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::module::AppServices;

pub async fn list_users(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Page<User>>> {
    let page = svc.config.page_request(params.page, params.page_size);
    Ok(Json(
        svc.users.list(&ctx, params.search.as_deref(), page).await?,
    ))
}

pub async fn create_user(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiJson(body): ApiJson<UserBody>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let created = svc.users.create(&ctx, body.into_new()?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_user(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath(username): ApiPath<String>,
) -> ApiResult<Json<User>> {
    Ok(Json(svc.users.get(&ctx, &username).await?))
}

pub async fn update_user(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath(username): ApiPath<String>,
    ApiJson(body): ApiJson<UserBody>,
) -> ApiResult<Json<User>> {
    Ok(Json(
        svc.users
            .update(&ctx, &username, body.into_patch()?)
            .await?,
    ))
}

pub async fn delete_user(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath(username): ApiPath<String>,
) -> ApiResult<StatusCode> {
    svc.users.delete(&ctx, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /users/me/`
pub async fn me(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
) -> ApiResult<Json<User>> {
    Ok(Json(svc.users.me(&ctx).await?))
}

/// `PATCH /users/me/`
pub async fn update_me(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiJson(body): ApiJson<ProfileBody>,
) -> ApiResult<Json<User>> {
    Ok(Json(
        svc.users
            .update_me(&ctx, ProfilePatch::from(body))
            .await?,
    ))
}
