use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, State};
use catalog_sdk::{Page, Review};
use http::StatusCode;
use uuid::Uuid;
use yamdb_security::SecurityContext;

use crate::api::rest::dto::{ListParams, ReviewBody};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::module::AppServices;

pub async fn list_reviews(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath(title_id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Page<Review>>> {
    let page = svc.config.page_request(params.page, params.page_size);
    Ok(Json(svc.reviews.list(&ctx, title_id, page).await?))
}

pub async fn create_review(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath(title_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ReviewBody>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let created = svc.reviews.create(&ctx, title_id, body.into_new()?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_review(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath((title_id, review_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Review>> {
    Ok(Json(svc.reviews.get(&ctx, title_id, review_id).await?))
}

pub async fn update_review(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath((title_id, review_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<ReviewBody>,
) -> ApiResult<Json<Review>> {
    Ok(Json(
        svc.reviews
            .update(&ctx, title_id, review_id, body.into_patch())
            .await?,
    ))
}

pub async fn delete_review(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath((title_id, review_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    svc.reviews.delete(&ctx, title_id, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
