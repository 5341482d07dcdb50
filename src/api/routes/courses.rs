//! Training courses and lessons. Reading is public; admins manage content
//! and also see unpublished courses.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::auth::{CurrentUser, require_role};
use crate::api::error::ApiError;
use crate::api::extractors::extract_json;
use crate::api::state::AppState;
use crate::core::course::{self, CourseInput, CourseUpdate, CourseWithLessons, LessonInput};
use crate::entities::{CourseModel, LessonModel, Role};

/// Build the courses router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/courses", get(list).post(create))
        .route("/api/courses/:id", get(get_one).put(update).delete(remove))
        .route("/api/courses/:id/lessons", post(add_lesson))
        .route("/api/courses/:id/lessons/:lesson_id", delete(remove_lesson))
}

fn sees_drafts(caller: Option<&CurrentUser>) -> bool {
    caller.is_some_and(|CurrentUser(u)| u.role == Role::Admin)
}

/// GET /api/courses
async fn list(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
) -> Result<Json<Vec<CourseModel>>, ApiError> {
    let courses = course::list_courses(&state.db, sees_drafts(caller.as_ref())).await?;
    Ok(Json(courses))
}

/// GET /api/courses/:id
async fn get_one(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<CourseWithLessons>, ApiError> {
    let found = course::get_course(&state.db, id, sees_drafts(caller.as_ref())).await?;
    Ok(Json(found))
}

/// POST /api/courses (admin)
async fn create(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    body: Result<Json<CourseInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CourseModel>), ApiError> {
    require_role(&me, &[Role::Admin])?;
    let input = extract_json(body)?;
    let created = course::create_course(&state.db, me.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/courses/:id (admin)
async fn update(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    body: Result<Json<CourseUpdate>, JsonRejection>,
) -> Result<Json<CourseModel>, ApiError> {
    require_role(&me, &[Role::Admin])?;
    let update = extract_json(body)?;
    Ok(Json(course::update_course(&state.db, id, update).await?))
}

/// DELETE /api/courses/:id (admin)
async fn remove(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_role(&me, &[Role::Admin])?;
    course::delete_course(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/courses/:id/lessons (admin)
async fn add_lesson(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    body: Result<Json<LessonInput>, JsonRejection>,
) -> Result<(StatusCode, Json<LessonModel>), ApiError> {
    require_role(&me, &[Role::Admin])?;
    let input = extract_json(body)?;
    let created = course::add_lesson(&state.db, id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/courses/:id/lessons/:lesson_id (admin)
async fn remove_lesson(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path((id, lesson_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    require_role(&me, &[Role::Admin])?;
    course::delete_lesson(&state.db, id, lesson_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
