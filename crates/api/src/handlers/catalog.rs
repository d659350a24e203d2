//! Handlers for the read-only reference catalog (cell models, ion currents).

use apportal_db::models::cell_model::{CellmlModel, IonCurrent};
use apportal_db::repositories::{CellModelRepo, IonCurrentRepo};
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/cellml-models
///
/// Predefined models plus the caller's own uploads (admins see everything).
pub async fn list_cellml_models(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CellmlModel>>>> {
    let models = CellModelRepo::list_visible(&state.pool, user.id, user.is_admin).await?;
    Ok(Json(DataResponse { data: models }))
}

/// GET /api/v1/ion-currents
pub async fn list_ion_currents(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<IonCurrent>>>> {
    let currents = IonCurrentRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: currents }))
}
