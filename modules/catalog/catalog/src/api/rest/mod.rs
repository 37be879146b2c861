//! REST surface under `/api/v1`.

use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};

use crate::module::AppServices;

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use error::ApiError;
use handlers::{auth, comments, reviews, taxonomy, titles, users};

pub const API_PREFIX: &str = "/api/v1";

/// Build the catalog router. Every route runs behind the authentication
/// middleware; anonymous requests reach the handlers and are judged by
/// policy there.
pub fn router(services: Arc<AppServices>) -> Router {
    let api = Router::new()
        .route("/auth/signup/", post(auth::sign_up))
        .route("/auth/token/", post(auth::token))
        .route(
            "/categories/",
            get(taxonomy::list_categories).post(taxonomy::create_category),
        )
        .route("/categories/{slug}/", delete(taxonomy::delete_category))
        .route(
            "/genres/",
            get(taxonomy::list_genres).post(taxonomy::create_genre),
        )
        .route("/genres/{slug}/", delete(taxonomy::delete_genre))
        .route(
            "/titles/",
            get(titles::list_titles).post(titles::create_title),
        )
        .route(
            "/titles/{title_id}/",
            get(titles::get_title)
                .patch(titles::update_title)
                .delete(titles::delete_title),
        )
        .route(
            "/titles/{title_id}/reviews/",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/",
            get(reviews::get_review)
                .patch(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/",
            get(comments::get_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route("/users/", get(users::list_users).post(users::create_user))
        .route("/users/me/", get(users::me).patch(users::update_me))
        .route(
            "/users/{username}/",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route_layer(from_fn_with_state(
            Arc::clone(&services),
            middleware::authn_middleware,
        ))
        .with_state(services);

    Router::new()
        .nest(API_PREFIX, api)
        .fallback(|| async { ApiError::not_found("no such endpoint") })
}
