//! Platform feedback.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::{CurrentUser, require_role};
use crate::api::error::ApiError;
use crate::api::extractors::extract_json;
use crate::api::state::AppState;
use crate::core::feedback::{self, FeedbackInput};
use crate::entities::{FeedbackModel, Role};

/// Build the feedback router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/feedback", get(list).post(submit))
}

/// POST /api/feedback
async fn submit(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    body: Result<Json<FeedbackInput>, JsonRejection>,
) -> Result<(StatusCode, Json<FeedbackModel>), ApiError> {
    let input = extract_json(body)?;
    let saved = feedback::submit_feedback(&state.db, me.id, input).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/feedback (admin)
async fn list(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<Vec<FeedbackModel>>, ApiError> {
    require_role(&me, &[Role::Admin])?;
    Ok(Json(feedback::list_feedback(&state.db).await?))
}
