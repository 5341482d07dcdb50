//! # Request Extractors
//!
//! Helpers that turn axum's JSON and query rejections into [`ApiError`]s, so
//! malformed input gets the same error body as everything else.

use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;

use crate::api::error::ApiError;

/// Extract a JSON body, mapping deserialization errors to [`ApiError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., ApiError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    result.map(|Json(v)| v).map_err(|err| {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    })
}

/// Extract query parameters, mapping parse errors to [`ApiError::BadRequest`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| ApiError::BadRequest(err.body_text()))
}
