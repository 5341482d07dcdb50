//! Public search.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::extractors::extract_query;
use crate::api::state::AppState;
use crate::core::search::{self, SearchResults};

/// `?q=` parameter.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Text to look for
    #[serde(default)]
    pub q: String,
}

/// Build the search router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/search", get(run))
}

/// GET /api/search?q=
async fn run(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResults>, ApiError> {
    let query = extract_query(query)?;
    Ok(Json(search::search(&state.db, &query.q).await?))
}
