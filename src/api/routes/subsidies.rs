//! Subsidy programs and applications.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::auth::{CurrentUser, require_role};
use crate::api::error::ApiError;
use crate::api::extractors::{extract_json, extract_query};
use crate::api::state::AppState;
use crate::core::subsidy::{self, ApplicationReview, SubsidyInput, SubsidyUpdate};
use crate::entities::{ReviewStatus, Role, SubsidyApplicationModel, SubsidyModel};

const MANAGERS: [Role; 2] = [Role::GovOfficial, Role::Admin];

/// Body of an application.
#[derive(Debug, Default, Deserialize)]
pub struct ApplyRequest {
    /// Optional note for the reviewer
    #[serde(default)]
    pub note: Option<String>,
}

/// `?status=` filter for application listings.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationQuery {
    /// Only applications in this status
    pub status: Option<ReviewStatus>,
}

/// Build the subsidies router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/subsidies", get(list_subsidies).post(create_subsidy))
        .route(
            "/api/subsidies/applications",
            get(list_all_applications),
        )
        .route("/api/subsidies/applications/mine", get(my_applications))
        .route(
            "/api/subsidies/applications/:id/review",
            patch(review_application),
        )
        .route(
            "/api/subsidies/:id",
            get(get_subsidy).put(update_subsidy).delete(deactivate_subsidy),
        )
        .route("/api/subsidies/:id/apply", post(apply))
        .route("/api/subsidies/:id/applications", get(list_applications))
}

/// GET /api/subsidies. Farmers and buyers see active programs only.
async fn list_subsidies(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<Vec<SubsidyModel>>, ApiError> {
    let active_only = !MANAGERS.contains(&me.role);
    Ok(Json(subsidy::list_subsidies(&state.db, active_only).await?))
}

/// GET /api/subsidies/:id
async fn get_subsidy(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<SubsidyModel>, ApiError> {
    let found = subsidy::get_subsidy_by_id(&state.db, id)
        .await?
        .filter(|s| s.is_active || MANAGERS.contains(&me.role))
        .ok_or_else(|| ApiError::NotFound(format!("subsidy not found: {id}")))?;
    Ok(Json(found))
}

/// POST /api/subsidies (official, admin)
async fn create_subsidy(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    body: Result<Json<SubsidyInput>, JsonRejection>,
) -> Result<(StatusCode, Json<SubsidyModel>), ApiError> {
    require_role(&me, &MANAGERS)?;
    let input = extract_json(body)?;
    let created = subsidy::create_subsidy(&state.db, me.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/subsidies/:id (official, admin)
async fn update_subsidy(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    body: Result<Json<SubsidyUpdate>, JsonRejection>,
) -> Result<Json<SubsidyModel>, ApiError> {
    require_role(&me, &MANAGERS)?;
    let update = extract_json(body)?;
    Ok(Json(subsidy::update_subsidy(&state.db, id, update).await?))
}

/// DELETE /api/subsidies/:id (official, admin). Deactivates; nothing is removed.
async fn deactivate_subsidy(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<SubsidyModel>, ApiError> {
    require_role(&me, &MANAGERS)?;
    Ok(Json(subsidy::deactivate_subsidy(&state.db, id).await?))
}

/// POST /api/subsidies/:id/apply (farmer)
async fn apply(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    body: Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubsidyApplicationModel>), ApiError> {
    require_role(&me, &[Role::Farmer])?;
    let req = extract_json(body)?;
    let application = subsidy::apply(&state.db, me.id, id, req.note).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/subsidies/applications/mine (farmer)
async fn my_applications(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<Vec<SubsidyApplicationModel>>, ApiError> {
    require_role(&me, &[Role::Farmer])?;
    Ok(Json(
        subsidy::list_applications_for_farmer(&state.db, me.id).await?,
    ))
}

/// GET /api/subsidies/applications (official, admin)
async fn list_all_applications(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    query: Result<Query<ApplicationQuery>, QueryRejection>,
) -> Result<Json<Vec<SubsidyApplicationModel>>, ApiError> {
    require_role(&me, &MANAGERS)?;
    let query = extract_query(query)?;
    Ok(Json(
        subsidy::list_applications(&state.db, None, query.status).await?,
    ))
}

/// GET /api/subsidies/:id/applications (official, admin)
async fn list_applications(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    query: Result<Query<ApplicationQuery>, QueryRejection>,
) -> Result<Json<Vec<SubsidyApplicationModel>>, ApiError> {
    require_role(&me, &MANAGERS)?;
    let query = extract_query(query)?;
    Ok(Json(
        subsidy::list_applications(&state.db, Some(id), query.status).await?,
    ))
}

/// PATCH /api/subsidies/applications/:id/review (official, admin)
async fn review_application(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    body: Result<Json<ApplicationReview>, JsonRejection>,
) -> Result<Json<SubsidyApplicationModel>, ApiError> {
    require_role(&me, &MANAGERS)?;
    let review = extract_json(body)?;
    Ok(Json(
        subsidy::review_application(&state.db, id, me.id, review).await?,
    ))
}
