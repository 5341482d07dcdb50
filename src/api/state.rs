//! Shared application state handed to every handler.

use crate::auth::TokenService;
use sea_orm::DatabaseConnection;
use std::{path::PathBuf, sync::Arc};

/// Cloned into each request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database pool
    pub db: Arc<DatabaseConnection>,
    /// Bearer token issuer and verifier
    pub tokens: TokenService,
    /// Directory crop images are written to and served from
    pub upload_dir: PathBuf,
}

impl AppState {
    /// Bundles the pieces built in `main`.
    #[must_use]
    pub fn new(db: DatabaseConnection, tokens: TokenService, upload_dir: PathBuf) -> Self {
        Self {
            db: Arc::new(db),
            tokens,
            upload_dir,
        }
    }
}
