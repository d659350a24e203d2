//! Route definitions for the read-only catalog resources backing the
//! create form.

use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Catalog routes, mounted directly under `/api/v1`.
///
/// ```text
/// GET /cellml-models   -> list_cellml_models
/// GET /ion-currents    -> list_ion_currents
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cellml-models", get(catalog::list_cellml_models))
        .route("/ion-currents", get(catalog::list_ion_currents))
}
