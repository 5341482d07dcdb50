//! Order placement and lifecycle.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::auth::{CurrentUser, require_role};
use crate::api::error::ApiError;
use crate::api::extractors::{extract_json, extract_query};
use crate::api::state::AppState;
use crate::core::order::{self, PlaceOrder};
use crate::entities::{OrderModel, OrderStatus, Role};

/// Requested status change.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// Target status
    pub status: OrderStatus,
}

/// `?status=` filter for the admin listing.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    /// Only orders in this status
    pub status: Option<OrderStatus>,
}

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_all).post(place_order))
        .route("/api/orders/mine", get(my_orders))
        .route("/api/orders/sales", get(my_sales))
        .route("/api/orders/:id", get(get_order))
        .route("/api/orders/:id/status", patch(update_status))
}

/// POST /api/orders (buyer)
async fn place_order(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    body: Result<Json<PlaceOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderModel>), ApiError> {
    require_role(&me, &[Role::Buyer])?;
    let req = extract_json(body)?;
    let placed = order::place_order(&state.db, me.id, req).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

/// GET /api/orders (admin)
async fn list_all(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    query: Result<Query<OrderQuery>, QueryRejection>,
) -> Result<Json<Vec<OrderModel>>, ApiError> {
    require_role(&me, &[Role::Admin])?;
    let query = extract_query(query)?;
    Ok(Json(order::list_all(&state.db, query.status).await?))
}

/// GET /api/orders/mine (buyer)
async fn my_orders(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<Vec<OrderModel>>, ApiError> {
    require_role(&me, &[Role::Buyer])?;
    Ok(Json(order::list_for_buyer(&state.db, me.id).await?))
}

/// GET /api/orders/sales (farmer)
async fn my_sales(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<Vec<OrderModel>>, ApiError> {
    require_role(&me, &[Role::Farmer])?;
    Ok(Json(order::list_for_farmer(&state.db, me.id).await?))
}

/// GET /api/orders/:id (participants and admins)
async fn get_order(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderModel>, ApiError> {
    Ok(Json(order::get_order_for(&state.db, id, &me).await?))
}

/// PATCH /api/orders/:id/status
async fn update_status(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<OrderModel>, ApiError> {
    let req = extract_json(body)?;
    Ok(Json(order::update_status(&state.db, id, &me, req.status).await?))
}
