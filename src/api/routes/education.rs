//! Educational content. Reading is public; admins publish.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::auth::{CurrentUser, require_role};
use crate::api::error::ApiError;
use crate::api::extractors::{extract_json, extract_query};
use crate::api::state::AppState;
use crate::core::education::{self, ContentInput, ContentUpdate};
use crate::entities::{ContentType, EducationContentModel, Role};

/// `?type=` filter.
#[derive(Debug, Default, Deserialize)]
pub struct ContentQuery {
    /// Only this kind of material
    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,
}

/// Build the education router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/education", get(list).post(create))
        .route("/api/education/:id", get(get_one).put(update).delete(remove))
}

/// GET /api/education
async fn list(
    State(state): State<AppState>,
    query: Result<Query<ContentQuery>, QueryRejection>,
) -> Result<Json<Vec<EducationContentModel>>, ApiError> {
    let query = extract_query(query)?;
    Ok(Json(education::list_content(&state.db, query.content_type).await?))
}

/// GET /api/education/:id
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EducationContentModel>, ApiError> {
    Ok(Json(education::get_content(&state.db, id).await?))
}

/// POST /api/education (admin)
async fn create(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    body: Result<Json<ContentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<EducationContentModel>), ApiError> {
    require_role(&me, &[Role::Admin])?;
    let input = extract_json(body)?;
    let created = education::create_content(&state.db, me.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/education/:id (admin)
async fn update(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    body: Result<Json<ContentUpdate>, JsonRejection>,
) -> Result<Json<EducationContentModel>, ApiError> {
    require_role(&me, &[Role::Admin])?;
    let update = extract_json(body)?;
    Ok(Json(education::update_content(&state.db, id, update).await?))
}

/// DELETE /api/education/:id (admin)
async fn remove(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_role(&me, &[Role::Admin])?;
    education::delete_content(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
