//! Profile edits and the admin user directory.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::auth::{CurrentUser, require_role};
use crate::api::error::ApiError;
use crate::api::extractors::{extract_json, extract_query};
use crate::api::state::AppState;
use crate::core::user::{self, ProfileUpdate};
use crate::entities::{Role, UserModel};

/// `?role=` filter for the directory.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    /// Only users with this role
    pub role: Option<Role>,
}

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/me", put(update_me))
        .route("/api/users/:id", get(get_user))
}

/// PUT /api/users/me
async fn update_me(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<UserModel>, ApiError> {
    let update = extract_json(body)?;
    Ok(Json(user::update_profile(&state.db, me.id, update).await?))
}

/// GET /api/users (admin)
async fn list_users(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<Vec<UserModel>>, ApiError> {
    require_role(&me, &[Role::Admin])?;
    let query = extract_query(query)?;
    Ok(Json(user::list_users(&state.db, query.role).await?))
}

/// GET /api/users/:id (admin)
async fn get_user(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<UserModel>, ApiError> {
    require_role(&me, &[Role::Admin])?;
    user::get_user_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {id}")))
}
