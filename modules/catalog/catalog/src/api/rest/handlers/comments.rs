use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, State};
use catalog_sdk::{Comment, Page};
use http::StatusCode;
use uuid::Uuid;
use yamdb_security::SecurityContext;

use crate::api::rest::dto::{CommentBody, ListParams};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::module::AppServices;

pub async fn list_comments(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath((title_id, review_id)): ApiPath<(Uuid, Uuid)>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Page<Comment>>> {
    let page = svc.config.page_request(params.page, params.page_size);
    Ok(Json(
        svc.comments.list(&ctx, title_id, review_id, page).await?,
    ))
}

pub async fn create_comment(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath((title_id, review_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<CommentBody>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let created = svc
        .comments
        .create(&ctx, title_id, review_id, body.into_new()?)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_comment(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(
        svc.comments
            .get(&ctx, title_id, review_id, comment_id)
            .await?,
    ))
}

pub async fn update_comment(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(Uuid, Uuid, Uuid)>,
    ApiJson(body): ApiJson<CommentBody>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(
        svc.comments
            .update(&ctx, title_id, review_id, comment_id, body.into_patch())
            .await?,
    ))
}

pub async fn delete_comment(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    svc.comments
        .delete(&ctx, title_id, review_id, comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
