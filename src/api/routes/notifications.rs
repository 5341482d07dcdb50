//! The caller's notification inbox.

use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Serialize;

use crate::api::auth::CurrentUser;
use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::core::notification;
use crate::entities::NotificationModel;

/// Unread counter.
#[derive(Debug, Serialize)]
pub struct UnreadCount {
    /// Notifications not yet read
    pub unread: u64,
}

/// Result of marking everything read.
#[derive(Debug, Serialize)]
pub struct MarkedCount {
    /// Notifications that changed
    pub updated: u64,
}

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(list))
        .route("/api/notifications/unread-count", get(unread_count))
        .route("/api/notifications/read-all", patch(mark_all_read))
        .route("/api/notifications/:id/read", patch(mark_read))
}

/// GET /api/notifications
async fn list(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<Vec<NotificationModel>>, ApiError> {
    Ok(Json(notification::list_for_user(&state.db, me.id).await?))
}

/// GET /api/notifications/unread-count
async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<UnreadCount>, ApiError> {
    let unread = notification::unread_count(&state.db, me.id).await?;
    Ok(Json(UnreadCount { unread }))
}

/// PATCH /api/notifications/:id/read
async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<NotificationModel>, ApiError> {
    Ok(Json(notification::mark_read(&state.db, me.id, id).await?))
}

/// PATCH /api/notifications/read-all
async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<MarkedCount>, ApiError> {
    let updated = notification::mark_all_read(&state.db, me.id).await?;
    Ok(Json(MarkedCount { updated }))
}
