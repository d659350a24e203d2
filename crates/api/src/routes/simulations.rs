//! Route definitions for the `/simulations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::simulation;
use crate::state::AppState;

/// Routes mounted at `/simulations`.
///
/// `/status` is registered as a static segment, which axum matches ahead
/// of the `/{id}` capture, so `GET /simulations/status` never parses
/// "status" as an id.
///
/// ```text
/// GET    /                     -> list
/// POST   /                     -> create
/// GET    /status               -> status (batch poll)
/// GET    /{id}                 -> get_by_id
/// PUT    /{id}                 -> update
/// DELETE /{id}                 -> delete
/// GET    /{id}/template        -> template
/// POST   /{id}/restart         -> restart
/// GET    /{id}/data            -> data
/// GET    /{id}/spreadsheet     -> spreadsheet
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(simulation::list).post(simulation::create))
        .route("/status", get(simulation::status))
        .route(
            "/{id}",
            get(simulation::get_by_id)
                .put(simulation::update)
                .delete(simulation::delete),
        )
        .route("/{id}/template", get(simulation::template))
        .route("/{id}/restart", post(simulation::restart))
        .route("/{id}/data", get(simulation::data))
        .route("/{id}/spreadsheet", get(simulation::spreadsheet))
}
