//! # Authentication & Authorization
//!
//! [`authenticate`] runs in front of every `/api` route. When an
//! `Authorization` header is present it must carry a live bearer token for an
//! existing user, otherwise the request stops with 401. The loaded user is put
//! into the request extensions, where the [`CurrentUser`] extractor finds it.
//! Handlers that need a caller take `CurrentUser` (401 when absent) and gate
//! roles with [`require_role`] (403).

use axum::extract::{Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::auth::extract_bearer;
use crate::core::user::get_user_by_id;
use crate::entities::{Role, UserModel};

/// The authenticated caller, freshly loaded from the database.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserModel);

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))
    }
}

/// Rejects callers whose role is not in `allowed`.
pub fn require_role(user: &UserModel, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "This action is not available to role {:?}",
            user.role
        )))
    }
}

/// Validates the bearer token, if any, and attaches the caller.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().ok().map(str::to_owned));
    let Some(header_value) = header_value else {
        return Ok(next.run(request).await);
    };

    let token = extract_bearer(header_value.as_deref()).ok_or_else(|| {
        tracing::warn!("authentication failed: malformed authorization header");
        ApiError::Unauthorized("Authorization header must use the Bearer scheme".into())
    })?;

    let claims = state.tokens.verify(token).inspect_err(|e| {
        tracing::warn!(reason = %e, "authentication failed: invalid bearer token");
    })?;
    let user_id = claims.user_id()?;
    let user = get_user_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".into()))?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::VerificationStatus;

    fn user_with(role: Role) -> UserModel {
        let now = chrono::Utc::now();
        UserModel {
            id: 1,
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
            password_hash: String::new(),
            role,
            phone: None,
            location: None,
            verification_status: VerificationStatus::Unverified,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_require_role() {
        let farmer = user_with(Role::Farmer);
        assert!(require_role(&farmer, &[Role::Farmer, Role::Admin]).is_ok());

        let err = require_role(&farmer, &[Role::Admin]).unwrap_err();
        assert_eq!(err.status_and_code().1, "FORBIDDEN");
    }
}
