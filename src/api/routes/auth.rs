//! Registration, login and the current-user probe.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::auth::CurrentUser;
use crate::api::error::ApiError;
use crate::api::extractors::extract_json;
use crate::api::state::AppState;
use crate::core::user::{self, NewUser};
use crate::entities::UserModel;

/// Login credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Token plus the user it was issued for.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token
    pub token: String,
    /// The account
    pub user: UserModel,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let input = extract_json(body)?;
    let created = user::register(&state.db, input).await?;
    let token = state.tokens.issue(&created)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: created,
        }),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let req = extract_json(body)?;
    let found = user::authenticate(&state.db, &req.email, &req.password).await?;
    let token = state.tokens.issue(&found)?;
    tracing::info!(user_id = found.id, "User logged in");
    Ok(Json(AuthResponse { token, user: found }))
}

/// GET /api/auth/me
async fn me(CurrentUser(me): CurrentUser) -> Json<UserModel> {
    Json(me)
}
