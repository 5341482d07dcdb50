//! Complaints: any user files, admins handle.

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
use crate::core::complaint::{self, ComplaintInput, ComplaintUpdate};
use crate::entities::{ComplaintModel, ComplaintStatus, Role};

/// `?status=` filter for the admin listing.
#[derive(Debug, Default, Deserialize)]
pub struct ComplaintQuery {
    /// Only complaints in this status
    pub status: Option<ComplaintStatus>,
}

/// Build the complaints router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/complaints", get(list_all).post(file))
        .route("/api/complaints/mine", get(mine))
        .route("/api/complaints/:id", patch(update))
}

/// POST /api/complaints
async fn file(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    body: Result<Json<ComplaintInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ComplaintModel>), ApiError> {
    let input = extract_json(body)?;
    let filed = complaint::file_complaint(&state.db, me.id, input).await?;
    Ok((StatusCode::CREATED, Json(filed)))
}

/// GET /api/complaints/mine
async fn mine(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<Vec<ComplaintModel>>, ApiError> {
    Ok(Json(complaint::list_for_user(&state.db, me.id).await?))
}

/// GET /api/complaints (admin)
async fn list_all(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    query: Result<Query<ComplaintQuery>, QueryRejection>,
) -> Result<Json<Vec<ComplaintModel>>, ApiError> {
    require_role(&me, &[Role::Admin])?;
    let query = extract_query(query)?;
    Ok(Json(complaint::list_all(&state.db, query.status).await?))
}

/// PATCH /api/complaints/:id (admin)
async fn update(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    body: Result<Json<ComplaintUpdate>, JsonRejection>,
) -> Result<Json<ComplaintModel>, ApiError> {
    require_role(&me, &[Role::Admin])?;
    let update = extract_json(body)?;
    Ok(Json(complaint::update_complaint(&state.db, id, update).await?))
}
