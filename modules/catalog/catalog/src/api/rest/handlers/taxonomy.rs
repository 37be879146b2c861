//! `/categories/` and `/genres/`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, State};
use catalog_sdk::{Page, Taxon};
use http::StatusCode;
use yamdb_security::SecurityContext;

use crate::api::rest::dto::{ListParams, TaxonBody};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::domain::service::{ServiceConfig, TaxonomyService};
use crate::module::AppServices;

async fn list(
    svc: &TaxonomyService,
    config: ServiceConfig,
    ctx: &SecurityContext,
    params: &ListParams,
) -> ApiResult<Json<Page<Taxon>>> {
    let page = config.page_request(params.page, params.page_size);
    Ok(Json(svc.list(ctx, params.search.as_deref(), page).await?))
}

async fn create(
    svc: &TaxonomyService,
    ctx: &SecurityContext,
    body: TaxonBody,
) -> ApiResult<(StatusCode, Json<Taxon>)> {
    let created = svc.create(ctx, body.into_taxon()?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_categories(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Page<Taxon>>> {
    list(&svc.categories, svc.config, &ctx, &params).await
}

pub async fn create_category(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiJson(body): ApiJson<TaxonBody>,
) -> ApiResult<(StatusCode, Json<Taxon>)> {
    create(&svc.categories, &ctx, body).await
}

pub async fn delete_category(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<StatusCode> {
    svc.categories.delete(&ctx, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_genres(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Page<Taxon>>> {
    list(&svc.genres, svc.config, &ctx, &params).await
}

pub async fn create_genre(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiJson(body): ApiJson<TaxonBody>,
) -> ApiResult<(StatusCode, Json<Taxon>)> {
    create(&svc.genres, &ctx, body).await
}

pub async fn delete_genre(
    State(svc): State<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<StatusCode> {
    svc.genres.delete(&ctx, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
