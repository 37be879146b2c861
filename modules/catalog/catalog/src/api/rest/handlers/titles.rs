use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, State};
use catalog_sdk::{Page, Title};
use http::StatusCode;
use uuid::Uuid;
use yamdb_security::SecurityContext;

use crate::api::rest::dto::{TitleBody, TitleListParams};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::module::AppServices;

pub async fn list_titles(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiQuery(params): ApiQuery<TitleListParams>,
) -> ApiResult<Json<Page<Title>>> {
    let page = svc.config.page_request(params.page, params.page_size);
    Ok(Json(svc.titles.list(&ctx, &params.filter(), page).await?))
}

pub async fn create_title(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiJson(body): ApiJson<TitleBody>,
) -> ApiResult<(StatusCode, Json<Title>)> {
    let created = svc.titles.create(&ctx, body.into_new()?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_title(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath(title_id): ApiPath<Uuid>,
) -> ApiResult<Json<Title>> {
    Ok(Json(svc.titles.get(&ctx, title_id).await?))
}

pub async fn update_title(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath(title_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<TitleBody>,
) -> ApiResult<Json<Title>> {
    Ok(Json(
        svc.titles
            .update(&ctx, title_id, body.into_patch())
            .await?,
    ))
}

pub async fn delete_title(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath(title_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    svc.titles.delete(&ctx, title_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
