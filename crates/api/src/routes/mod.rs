pub mod catalog;
pub mod health;
pub mod simulations;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /cellml-models                   cell models visible to the caller (GET)
/// /ion-currents                    ion current catalog (GET)
///
/// /simulations                     list, create
/// /simulations/status              batch status poll (?ids=1,2&force=true)
/// /simulations/{id}                get, update, delete
/// /simulations/{id}/template       create-form prefill (GET)
/// /simulations/{id}/restart        relaunch (POST)
/// /simulations/{id}/data           chart-ready result series (GET)
/// /simulations/{id}/spreadsheet    workbook as JSON or CSV (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Read-only catalogs backing the create form.
        .merge(catalog::router())
        // Simulation CRUD and orchestration endpoints.
        .nest("/simulations", simulations::router())
}
