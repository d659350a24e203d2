use std::sync::Arc;

use apportal_appredict::api::ApPredictApi;
use apportal_db::media::MediaStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: apportal_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Filesystem store for uploaded PK-data files.
    pub media: Arc<MediaStore>,
    /// Client for the external Ap Predict simulation engine.
    pub appredict: Arc<ApPredictApi>,
}
