//! Admin dashboard.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::{CurrentUser, require_role};
use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::core::stats::{self, PlatformStats};
use crate::entities::Role;

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/stats", get(platform_stats))
}

/// GET /api/admin/stats (admin)
async fn platform_stats(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<PlatformStats>, ApiError> {
    require_role(&me, &[Role::Admin])?;
    Ok(Json(stats::platform_stats(&state.db).await?))
}
