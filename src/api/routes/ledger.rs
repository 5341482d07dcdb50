//! Read access to the audit ledger.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::auth::{CurrentUser, require_role};
use crate::api::error::ApiError;
use crate::api::extractors::extract_query;
use crate::api::state::AppState;
use crate::core::ledger::{self, ChainReport};
use crate::entities::{LedgerEntryModel, Role};

const AUDITORS: [Role; 2] = [Role::Admin, Role::GovOfficial];

/// `?eventType=` filter.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    /// Only entries of this event type
    pub event_type: Option<String>,
}

/// Build the ledger router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ledger", get(list))
        .route("/api/ledger/verify", get(verify))
}

/// GET /api/ledger (admin, official)
async fn list(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    query: Result<Query<LedgerQuery>, QueryRejection>,
) -> Result<Json<Vec<LedgerEntryModel>>, ApiError> {
    require_role(&me, &AUDITORS)?;
    let query = extract_query(query)?;
    let entries = ledger::list_entries(&state.db, query.event_type.as_deref()).await?;
    Ok(Json(entries))
}

/// GET /api/ledger/verify (admin, official)
async fn verify(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<ChainReport>, ApiError> {
    require_role(&me, &AUDITORS)?;
    Ok(Json(ledger::verify_chain(&state.db).await?))
}
