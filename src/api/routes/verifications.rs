//! Identity verification requests and admin review.

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
use crate::core::verification::{self, VerificationRequest, VerificationReview};
use crate::entities::{ReviewStatus, Role, VerificationModel};

/// `?status=` filter; defaults to pending.
#[derive(Debug, Default, Deserialize)]
pub struct VerificationQuery {
    /// Status to list; `PENDING` when absent
    pub status: Option<ReviewStatus>,
}

/// Build the verifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/verifications", get(list).post(submit))
        .route("/api/verifications/mine", get(mine))
        .route("/api/verifications/:id/review", patch(review))
}

/// POST /api/verifications
async fn submit(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    body: Result<Json<VerificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VerificationModel>), ApiError> {
    require_role(&me, &[Role::Farmer, Role::Buyer])?;
    let req = extract_json(body)?;
    let created = verification::submit(&state.db, me.id, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/verifications/mine
async fn mine(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<Vec<VerificationModel>>, ApiError> {
    Ok(Json(verification::list_for_user(&state.db, me.id).await?))
}

/// GET /api/verifications (admin)
async fn list(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    query: Result<Query<VerificationQuery>, QueryRejection>,
) -> Result<Json<Vec<VerificationModel>>, ApiError> {
    require_role(&me, &[Role::Admin])?;
    let status = extract_query(query)?.status.unwrap_or(ReviewStatus::Pending);
    Ok(Json(verification::list_by_status(&state.db, Some(status)).await?))
}

/// PATCH /api/verifications/:id/review (admin)
async fn review(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    body: Result<Json<VerificationReview>, JsonRejection>,
) -> Result<Json<VerificationModel>, ApiError> {
    require_role(&me, &[Role::Admin])?;
    let decision = extract_json(body)?;
    Ok(Json(verification::review(&state.db, id, me.id, decision).await?))
}
