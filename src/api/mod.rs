//! # HTTP API
//!
//! REST/JSON surface under `/api`, plus `/health` and static `/uploads`.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer → body limit → authenticate → Handler
//! ```
//!
//! `authenticate` only rejects requests that carry a bad token; handlers that
//! need a caller extract [`auth::CurrentUser`], which turns a missing one into 401.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::state::AppState;

/// Largest accepted JSON body.
pub const MAX_JSON_BYTES: usize = 2 * 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::crops::router())
        .merge(routes::orders::router())
        .merge(routes::subsidies::router())
        .merge(routes::verifications::router())
        .merge(routes::notifications::router())
        .merge(routes::complaints::router())
        .merge(routes::feedback::router())
        .merge(routes::courses::router())
        .merge(routes::education::router())
        .merge(routes::ledger::router())
        .merge(routes::search::router())
        .merge(routes::admin::router())
        .layer(from_fn_with_state(state.clone(), auth::authenticate));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest_service("/uploads", ServeDir::new(&state.upload_dir))
        .merge(api)
        .layer(DefaultBodyLimit::max(MAX_JSON_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
