//! Crop listings: marketplace browsing, farmer inventory, admin overrides and
//! image upload.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::auth::{CurrentUser, require_role};
use crate::api::error::ApiError;
use crate::api::extractors::{extract_json, extract_query};
use crate::api::state::AppState;
use crate::core::crop::{self, CropFilter, CropInput, CropUpdate};
use crate::entities::{CropModel, Role};

/// Largest accepted image upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// File extensions accepted for crop images.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Admin visibility override.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    /// Whether buyers can see the crop
    pub is_listed: bool,
}

/// Build the crops router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/crops", get(list_crops).post(create_crop))
        .route("/api/crops/mine", get(my_crops))
        .route(
            "/api/crops/:id",
            get(get_crop).put(update_crop).delete(delete_crop),
        )
        .route("/api/crops/:id/listing", patch(set_listing))
        .route(
            "/api/crops/:id/image",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
}

fn is_admin(user: Option<&CurrentUser>) -> bool {
    user.is_some_and(|CurrentUser(u)| u.role == Role::Admin)
}

/// GET /api/crops
async fn list_crops(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
    query: Result<Query<CropFilter>, QueryRejection>,
) -> Result<Json<Vec<CropModel>>, ApiError> {
    let mut filter = extract_query(query)?;
    filter.include_unlisted = filter.include_unlisted && is_admin(caller.as_ref());
    Ok(Json(crop::list_crops(&state.db, &filter).await?))
}

/// GET /api/crops/:id
///
/// Hidden crops are only visible to their farmer and to admins.
async fn get_crop(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<CropModel>, ApiError> {
    let found = crop::get_crop_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("crop not found: {id}")))?;
    let visible = found.is_listed
        || is_admin(caller.as_ref())
        || caller.as_ref().is_some_and(|CurrentUser(u)| u.id == found.farmer_id);
    if !visible {
        return Err(ApiError::NotFound(format!("crop not found: {id}")));
    }
    Ok(Json(found))
}

/// POST /api/crops (farmer)
async fn create_crop(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    body: Result<Json<CropInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CropModel>), ApiError> {
    require_role(&me, &[Role::Farmer])?;
    let input = extract_json(body)?;
    let created = crop::create_crop(&state.db, me.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/crops/mine (farmer)
async fn my_crops(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<Vec<CropModel>>, ApiError> {
    require_role(&me, &[Role::Farmer])?;
    Ok(Json(crop::list_farmer_crops(&state.db, me.id).await?))
}

/// PUT /api/crops/:id (owning farmer)
async fn update_crop(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    body: Result<Json<CropUpdate>, JsonRejection>,
) -> Result<Json<CropModel>, ApiError> {
    require_role(&me, &[Role::Farmer])?;
    let update = extract_json(body)?;
    Ok(Json(crop::update_crop(&state.db, id, me.id, update).await?))
}

/// DELETE /api/crops/:id (owning farmer or admin)
async fn delete_crop(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_role(&me, &[Role::Farmer, Role::Admin])?;
    let owner = (me.role == Role::Farmer).then_some(me.id);
    crop::delete_crop(&state.db, id, owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/crops/:id/listing (admin)
async fn set_listing(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    body: Result<Json<ListingRequest>, JsonRejection>,
) -> Result<Json<CropModel>, ApiError> {
    require_role(&me, &[Role::Admin])?;
    let req = extract_json(body)?;
    Ok(Json(crop::set_listed(&state.db, id, req.is_listed).await?))
}

/// Lower-cased extension of `file_name` if it is an accepted image type.
fn image_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

fn multipart_error(err: &axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!("Images are limited to {MAX_IMAGE_BYTES} bytes"))
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

/// POST /api/crops/:id/image (owning farmer, multipart field `image`)
async fn upload_image(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<CropModel>, ApiError> {
    require_role(&me, &[Role::Farmer])?;
    crop::get_owned_crop(&state.db, id, me.id).await?;

    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(&e))? {
        if field.name() != Some("image") {
            continue;
        }
        let content_type_ok = field
            .content_type()
            .is_some_and(|ct| ct.starts_with("image/"));
        let ext = field
            .file_name()
            .and_then(image_extension)
            .filter(|_| content_type_ok)
            .ok_or_else(|| {
                ApiError::Validation(format!(
                    "Only image files are accepted ({})",
                    IMAGE_EXTENSIONS.join(", ")
                ))
            })?;
        let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
        if bytes.is_empty() {
            return Err(ApiError::Validation("Uploaded file is empty".into()));
        }

        let file_name = format!(
            "crop-{id}-{}.{ext}",
            chrono::Utc::now().timestamp_millis()
        );
        tokio::fs::create_dir_all(&state.upload_dir)
            .await
            .map_err(crate::errors::Error::from)?;
        tokio::fs::write(state.upload_dir.join(&file_name), &bytes)
            .await
            .map_err(crate::errors::Error::from)?;
        tracing::info!(crop_id = id, file = %file_name, size = bytes.len(), "Stored crop image");

        let updated =
            crop::set_image_url(&state.db, id, me.id, format!("/uploads/{file_name}")).await?;
        return Ok(Json(updated));
    }

    Err(ApiError::Validation("Multipart field `image` is required".into()))
}
