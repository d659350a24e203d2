//! Simulation launch.
//!
//! Resets the row to its freshly-started state, persists that, and only
//! then POSTs the payload: a crash mid-call leaves a consistent
//! just-restarted record. Engine refusals are recorded on the row;
//! infrastructure failures (database, media) propagate to the caller.

use apportal_appredict::api::ApPredictApi;
use apportal_core::status::initial_progress;
use apportal_core::types::DbId;
use apportal_db::media::MediaStore;
use apportal_db::models::cell_model::CellmlModel;
use apportal_db::repositories::cell_model_repo::CellModelRepo;
use apportal_db::repositories::simulation_repo::SimulationRepo;
use apportal_db::models::simulation::Simulation;
use sqlx::PgPool;

use crate::error::PipelineError;
use crate::payload::{build_launch_payload, ModelSource};

/// Launch (or relaunch) a simulation run.
///
/// Returns the reloaded row; its status tells the caller whether the
/// engine accepted the run (`INITIALISING`) or refused it (`FAILED`,
/// with the reason in `api_errors`).
pub async fn start_simulation(
    pool: &PgPool,
    media: &MediaStore,
    api: &ApPredictApi,
    id: DbId,
) -> Result<Simulation, PipelineError> {
    let simulation = SimulationRepo::find_by_id(pool, id)
        .await?
        .ok_or(PipelineError::NotFound(id))?;
    let model = CellModelRepo::find_by_id(pool, simulation.model_id)
        .await?
        .ok_or(PipelineError::ModelNotFound(simulation.model_id))?;

    let simulation =
        SimulationRepo::reset_for_launch(pool, id, initial_progress(model.uses_uploaded_cellml()))
            .await?
            .ok_or(PipelineError::NotFound(id))?;

    let source = model_source(media, &model).await?;
    let ion_params = SimulationRepo::ion_params_view(pool, id).await?;
    let points: Vec<f64> = SimulationRepo::concentration_points(pool, id)
        .await?
        .iter()
        .map(|p| p.concentration)
        .collect();
    let pk_data = match &simulation.pk_data_file {
        Some(name) => Some(media.read(name).await?),
        None => None,
    };

    let payload = build_launch_payload(&simulation, &source, &ion_params, &points, pk_data.as_deref())?;

    match api.launch(&payload).await {
        Ok(call_id) => {
            tracing::info!(simulation_id = id, call_id = %call_id, "Simulation launched");
            SimulationRepo::mark_launched(pool, id, &call_id).await?;
        }
        Err(e) => {
            tracing::warn!(simulation_id = id, error = %e, "Simulation launch failed");
            SimulationRepo::mark_failed(pool, id, &e.to_string()).await?;
        }
    }

    SimulationRepo::find_by_id(pool, id)
        .await?
        .ok_or(PipelineError::NotFound(id))
}

/// Resolve which model text/id goes into the payload, reading uploaded
/// CellML from the media store.
async fn model_source(media: &MediaStore, model: &CellmlModel) -> Result<ModelSource, PipelineError> {
    if let Some(engine_id) = model.ap_predict_model_id {
        return Ok(ModelSource::Catalog(engine_id));
    }
    match &model.cellml_file {
        Some(name) => Ok(ModelSource::Cellml(media.read(name).await?)),
        None => Err(PipelineError::Inconsistent(format!(
            "cell model {} has neither an engine model id nor a CellML file",
            model.id
        ))),
    }
}
