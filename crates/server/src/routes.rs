pub mod items;
pub mod users;

use std::any::Any;

use axum::{
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::crud::{Resource, Variant};

use crate::errors::{ApiError, ErrorStyle};
use crate::metrics;
use crate::openapi;
use crate::state::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router for the configured variant: the
/// variant's CRUD routes plus health, metrics, docs and the shared layers.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let variant = state.variant();
    let crud = match state {
        ServerState::Items(s) => items::router(s),
        ServerState::Users(s) => users::router(s),
    };
    compose(crud, variant, cors)
}

/// Wrap a variant's routes with the public routes, both fallbacks and the
/// shared layers.
fn compose(crud: Router, variant: Variant, cors: CorsLayer) -> Router {
    let style = ErrorStyle::for_variant(variant);

    // Public routes (health + metrics)
    let mut public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics::metrics));
    if variant.resource() == Resource::Items {
        public = public.route("/api-docs/openapi.json", get(openapi::openapi_json));
    }

    // Compose
    crud.merge(public)
        .fallback(move || async move { ApiError::unknown_route(style) })
        .method_not_allowed_fallback(move || async move { ApiError::method_not_allowed(style) })
        .layer(CatchPanicLayer::custom(move |_panic: Box<dyn Any + Send + 'static>| panic_response(style)))
        .layer(middleware::from_fn_with_state(variant, metrics::track_requests))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}

/// A handler panicked: answer 500 in the variant's error layout.
fn panic_response(style: ErrorStyle) -> Response {
    ApiError::internal(style).into_response()
}
