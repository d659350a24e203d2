//! Handlers for the `/simulations` resource.
//!
//! Simulations are private to their author (admins see everything), so every
//! handler resolves the record first and checks the ownership predicate
//! before acting. Creation and restart await the engine launch, so the
//! response always carries the post-launch record.

use apportal_core::auth::{can_edit, can_view, can_view_model, RequestUser};
use apportal_core::charts::{chart_data, ChartData};
use apportal_core::concentration::ConcentrationMode;
use apportal_core::naming::unique_title;
use apportal_core::pk_data::validate_pk_data;
use apportal_core::types::DbId;
use apportal_core::units::{ConcentrationUnit, IonCurrentType};
use apportal_core::workbook::{
    build_workbook, workbook_to_csv, IonCurrentSummary, SimulationSummary,
};
use apportal_db::models::cell_model::CellmlModel;
use apportal_db::models::simulation::{
    CreateIonCurrentParam, CreateSimulation, Simulation, SimulationIonCurrentParam,
};
use apportal_db::repositories::{CellModelRepo, IonCurrentRepo, SimulationRepo};
use apportal_pipeline::launcher::start_simulation;
use apportal_pipeline::poller::{refresh_status, StatusRow};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{parse_id_list, PaginationParams, SpreadsheetParams, StatusParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Intermediate point count stored when range mode omits one.
const DEFAULT_INTERMEDIATE_POINTS: i32 = 4;

// ---------------------------------------------------------------------------
// Input DTOs
// ---------------------------------------------------------------------------

/// Body of `POST /simulations`. Numeric bounds follow the submission form.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSimulationInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub notes: String,
    pub model_id: DbId,
    /// Pacing frequency in Hz.
    #[validate(range(min = 0.05, max = 5.0))]
    pub pacing_frequency: f64,
    /// Maximum pacing time in minutes.
    #[validate(range(min = 0.0, max = 120.0))]
    pub maximum_pacing_time: f64,
    pub ion_current_type: String,
    pub ion_units: String,
    pub pk_or_concs: String,
    #[validate(range(min = 0.0))]
    pub minimum_concentration: Option<f64>,
    pub maximum_concentration: Option<f64>,
    #[validate(range(min = 0, max = 10))]
    pub intermediate_point_count: Option<i32>,
    #[serde(default = "default_log_scale")]
    pub intermediate_point_log_scale: bool,
    /// Raw TSV text for pharmacokinetics mode; stored to the media
    /// directory, not the database.
    pub pk_data: Option<String>,
    #[serde(default)]
    pub ion_currents: Vec<IonCurrentInput>,
    #[serde(default)]
    pub concentration_points: Vec<f64>,
}

fn default_log_scale() -> bool {
    true
}

/// One configured ion current in a create request.
#[derive(Debug, Deserialize, Validate)]
pub struct IonCurrentInput {
    pub ion_current_id: DbId,
    /// Potency value in the simulation's `ion_units`.
    pub current: f64,
    #[validate(range(min = 0.1, max = 5.0))]
    pub hill_coefficient: f64,
    #[validate(range(min = 0.0))]
    pub saturation_level: f64,
    #[validate(range(min = 0.0, max = 2.0))]
    pub spread_of_uncertainty: Option<f64>,
}

/// Body of `PUT /simulations/{id}`: only title and notes stay editable
/// once a simulation has been submitted.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSimulationInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// A simulation with its child rows, as returned by the detail endpoints.
#[derive(Debug, Serialize)]
pub struct SimulationDetail {
    #[serde(flatten)]
    pub simulation: Simulation,
    pub ion_currents: Vec<SimulationIonCurrentParam>,
    pub concentration_points: Vec<f64>,
}

/// Create-form prefill copied from an existing simulation.
///
/// PK-data files are never copied; a pharmacokinetics-mode template needs a
/// fresh upload.
#[derive(Debug, Serialize)]
pub struct SimulationTemplate {
    /// Suggested title, de-duplicated against the caller's existing titles.
    pub title: String,
    pub notes: String,
    pub model_id: DbId,
    pub pacing_frequency: f64,
    pub maximum_pacing_time: f64,
    pub ion_current_type: String,
    pub ion_units: String,
    pub pk_or_concs: String,
    pub minimum_concentration: Option<f64>,
    pub maximum_concentration: Option<f64>,
    pub intermediate_point_count: Option<i32>,
    pub intermediate_point_log_scale: bool,
    pub ion_currents: Vec<TemplateIonCurrent>,
    pub concentration_points: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct TemplateIonCurrent {
    pub ion_current_id: DbId,
    pub current: f64,
    pub hill_coefficient: f64,
    pub saturation_level: f64,
    pub spread_of_uncertainty: Option<f64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/simulations
pub async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Simulation>>>> {
    let simulations =
        SimulationRepo::list_by_author(&state.pool, user.id, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: simulations }))
}

/// POST /api/v1/simulations
///
/// Validates, persists the simulation with its children in one transaction,
/// then launches against the engine. The launch is awaited, so the 201
/// response carries the post-launch record (INITIALISING on success, FAILED
/// with a stored message if the engine refused the run).
pub async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSimulationInput>,
) -> AppResult<(StatusCode, Json<DataResponse<SimulationDetail>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    for current in &input.ion_currents {
        current
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
    }
    validate_units(&input)?;
    let mode = validate_concentrations(&input)?;

    let model = CellModelRepo::find_by_id(&state.pool, input.model_id)
        .await?
        .ok_or(AppError::NotFound { entity: "CellmlModel", id: input.model_id })?;
    if !can_view_model(model.predefined, model.author_id, &user) {
        return Err(AppError::Forbidden(
            "Cell model is not available to this user".into(),
        ));
    }

    let known_currents = IonCurrentRepo::list_all(&state.pool).await?;
    if let Some(unknown) = input
        .ion_currents
        .iter()
        .find(|c| !known_currents.iter().any(|k| k.id == c.ion_current_id))
    {
        return Err(AppError::BadRequest(format!(
            "Unknown ion current id: {}",
            unknown.ion_current_id
        )));
    }

    // PK text goes to the media store; the record keeps only the name.
    let pk_data_file = match (&input.pk_data, mode) {
        (Some(text), ConcentrationMode::Pharmacokinetics) => {
            Some(state.media.save_pk_data(text).await?)
        }
        _ => None,
    };

    // Fields belonging to the other concentration modes are stored empty
    // regardless of what the request carried.
    let (minimum, maximum, count) = match mode {
        ConcentrationMode::Range => (
            input.minimum_concentration,
            input.maximum_concentration,
            Some(
                input
                    .intermediate_point_count
                    .unwrap_or(DEFAULT_INTERMEDIATE_POINTS),
            ),
        ),
        _ => (None, None, None),
    };
    let concentration_points = match mode {
        ConcentrationMode::Points => input.concentration_points.clone(),
        _ => Vec::new(),
    };

    let create = CreateSimulation {
        title: input.title.clone(),
        notes: input.notes.clone(),
        model_id: input.model_id,
        pacing_frequency: input.pacing_frequency,
        maximum_pacing_time: input.maximum_pacing_time,
        ion_current_type: input.ion_current_type.clone(),
        ion_units: input.ion_units.clone(),
        pk_or_concs: input.pk_or_concs.clone(),
        minimum_concentration: minimum,
        maximum_concentration: maximum,
        intermediate_point_count: count,
        intermediate_point_log_scale: input.intermediate_point_log_scale,
        pk_data_file,
        ion_currents: input
            .ion_currents
            .iter()
            .map(|c| CreateIonCurrentParam {
                ion_current_id: c.ion_current_id,
                current: c.current,
                hill_coefficient: c.hill_coefficient,
                saturation_level: c.saturation_level,
                spread_of_uncertainty: c.spread_of_uncertainty,
            })
            .collect(),
        concentration_points,
    };

    let simulation = SimulationRepo::create(&state.pool, user.id, &create).await?;
    tracing::info!(
        simulation_id = simulation.id,
        author_id = user.id,
        title = %simulation.title,
        "Simulation created"
    );

    let launched =
        start_simulation(&state.pool, &state.media, &state.appredict, simulation.id).await?;

    let detail = load_detail(&state, launched).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/simulations/{id}
pub async fn get_by_id(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SimulationDetail>>> {
    let simulation = find_visible(&state, &user, id).await?;
    let detail = load_detail(&state, simulation).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/simulations/{id}
pub async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSimulationInput>,
) -> AppResult<Json<DataResponse<SimulationDetail>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let simulation = find_editable(&state, &user, id).await?;
    let updated =
        SimulationRepo::update_title_notes(&state.pool, simulation.id, &input.title, &input.notes)
            .await?
            .ok_or(AppError::NotFound { entity: "Simulation", id })?;
    let detail = load_detail(&state, updated).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/v1/simulations/{id}
pub async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let simulation = find_editable(&state, &user, id).await?;
    let deleted = SimulationRepo::delete_with_media(&state.pool, &state.media, simulation.id).await?;
    if deleted {
        tracing::info!(simulation_id = id, user_id = user.id, "Simulation deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound { entity: "Simulation", id })
    }
}

/// GET /api/v1/simulations/{id}/template
///
/// Create-form prefill based on an existing simulation, with a suggested
/// title that does not collide with the caller's titles.
pub async fn template(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SimulationTemplate>>> {
    let simulation = find_visible(&state, &user, id).await?;
    let titles = SimulationRepo::titles_by_author(&state.pool, user.id).await?;
    let ion_currents = SimulationRepo::ion_params(&state.pool, simulation.id).await?;
    let points = SimulationRepo::concentration_points(&state.pool, simulation.id).await?;

    let template = SimulationTemplate {
        title: unique_title(&simulation.title, &titles),
        notes: simulation.notes,
        model_id: simulation.model_id,
        pacing_frequency: simulation.pacing_frequency,
        maximum_pacing_time: simulation.maximum_pacing_time,
        ion_current_type: simulation.ion_current_type,
        ion_units: simulation.ion_units,
        pk_or_concs: simulation.pk_or_concs,
        minimum_concentration: simulation.minimum_concentration,
        maximum_concentration: simulation.maximum_concentration,
        intermediate_point_count: simulation.intermediate_point_count,
        intermediate_point_log_scale: simulation.intermediate_point_log_scale,
        ion_currents: ion_currents
            .into_iter()
            .map(|p| TemplateIonCurrent {
                ion_current_id: p.ion_current_id,
                current: p.current,
                hill_coefficient: p.hill_coefficient,
                saturation_level: p.saturation_level,
                spread_of_uncertainty: p.spread_of_uncertainty,
            })
            .collect(),
        concentration_points: points.into_iter().map(|p| p.concentration).collect(),
    };
    Ok(Json(DataResponse { data: template }))
}

/// POST /api/v1/simulations/{id}/restart
///
/// The one non-monotonic transition: any state back to a fresh launch.
pub async fn restart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SimulationDetail>>> {
    let simulation = find_editable(&state, &user, id).await?;
    let relaunched =
        start_simulation(&state.pool, &state.media, &state.appredict, simulation.id).await?;
    tracing::info!(simulation_id = relaunched.id, user_id = user.id, "Simulation restarted");
    let detail = load_detail(&state, relaunched).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/simulations/status?ids=1,2,3&force=false
///
/// Poll batch entry point: refreshes every owned, non-terminal simulation
/// among `ids` against the engine (terminal ones too when `force` is set)
/// and returns the resulting status rows. Ids the caller does not own are
/// silently skipped.
pub async fn status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> AppResult<Json<DataResponse<Vec<StatusRow>>>> {
    let ids = parse_id_list(params.ids.as_deref().unwrap_or("")).map_err(AppError::BadRequest)?;
    let rows = refresh_status(
        &state.pool,
        &state.appredict,
        user.id,
        &ids,
        params.force,
        state.config.ap_predict.status_timeout_secs,
    )
    .await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/simulations/{id}/data
///
/// Chart-ready series for the result page.
pub async fn data(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ChartData>>> {
    let simulation = find_visible(&state, &user, id).await?;
    let chart = chart_data(
        simulation.voltage_results.as_ref(),
        simulation.q_net.as_ref(),
        simulation.voltage_traces.as_ref(),
    );
    Ok(Json(DataResponse { data: chart }))
}

/// GET /api/v1/simulations/{id}/spreadsheet
///
/// The five-sheet workbook as JSON, or as CSV with `?format=csv`.
pub async fn spreadsheet(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<SpreadsheetParams>,
) -> AppResult<Response> {
    let simulation = find_visible(&state, &user, id).await?;
    let model = CellModelRepo::find_by_id(&state.pool, simulation.model_id)
        .await?
        .ok_or(AppError::NotFound { entity: "CellmlModel", id: simulation.model_id })?;
    let ion_rows = SimulationRepo::ion_params_view(&state.pool, simulation.id).await?;
    let point_rows = SimulationRepo::concentration_points(&state.pool, simulation.id).await?;
    let points: Vec<f64> = point_rows.iter().map(|p| p.concentration).collect();

    let model_name = model_display_name(&model);
    let summary = SimulationSummary {
        title: &simulation.title,
        notes: &simulation.notes,
        model_name: &model_name,
        pacing_frequency: simulation.pacing_frequency,
        maximum_pacing_time: simulation.maximum_pacing_time,
        ion_current_type: &simulation.ion_current_type,
        ion_units: &simulation.ion_units,
        concentration_detail: concentration_detail(&simulation, &points),
        ion_currents: ion_rows
            .iter()
            .map(|row| IonCurrentSummary {
                name: &row.ion_current_name,
                value: row.current,
                hill_coefficient: row.hill_coefficient,
                saturation_level: row.saturation_level,
                spread_of_uncertainty: row.spread_of_uncertainty,
            })
            .collect(),
    };

    let workbook = build_workbook(
        &summary,
        simulation.voltage_results.as_ref(),
        simulation.q_net.as_ref(),
        simulation.voltage_traces.as_ref(),
        simulation.pkpd_results.as_ref(),
    );

    match params.format.as_deref() {
        Some("csv") => {
            let rendered = workbook_to_csv(&workbook)?;
            let headers = [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"simulation_{}.csv\"", simulation.id),
                ),
            ];
            Ok((headers, rendered).into_response())
        }
        Some(other) => Err(AppError::BadRequest(format!(
            "Unknown spreadsheet format: {other}"
        ))),
        None => Ok(Json(DataResponse { data: workbook }).into_response()),
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

async fn find_visible(
    state: &AppState,
    user: &RequestUser,
    id: DbId,
) -> AppResult<Simulation> {
    let simulation = SimulationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound { entity: "Simulation", id })?;
    if !can_view(simulation.author_id, user) {
        return Err(AppError::Forbidden(
            "Simulation is only visible to its author".into(),
        ));
    }
    Ok(simulation)
}

async fn find_editable(
    state: &AppState,
    user: &RequestUser,
    id: DbId,
) -> AppResult<Simulation> {
    let simulation = SimulationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound { entity: "Simulation", id })?;
    if !can_edit(simulation.author_id, user) {
        return Err(AppError::Forbidden(
            "Simulation may only be modified by its author".into(),
        ));
    }
    Ok(simulation)
}

async fn load_detail(state: &AppState, simulation: Simulation) -> AppResult<SimulationDetail> {
    let ion_currents = SimulationRepo::ion_params(&state.pool, simulation.id).await?;
    let points = SimulationRepo::concentration_points(&state.pool, simulation.id).await?;
    Ok(SimulationDetail {
        simulation,
        ion_currents,
        concentration_points: points.into_iter().map(|p| p.concentration).collect(),
    })
}

/// Check the potency type, unit, and their compatibility.
fn validate_units(input: &CreateSimulationInput) -> AppResult<()> {
    let current_type = IonCurrentType::parse(&input.ion_current_type).ok_or_else(|| {
        AppError::BadRequest(format!("Unknown ion current type: {}", input.ion_current_type))
    })?;
    let unit = ConcentrationUnit::parse(&input.ion_units).ok_or_else(|| {
        AppError::BadRequest(format!("Unknown ion units: {}", input.ion_units))
    })?;
    if !current_type.valid_units().contains(&unit) {
        return Err(AppError::BadRequest(format!(
            "Unit {} is not valid for {} values",
            unit.as_str(),
            current_type.as_str()
        )));
    }
    // IC50 values pass through -log10, so zero or below cannot convert.
    if current_type == IonCurrentType::Ic50 {
        if let Some(bad) = input.ion_currents.iter().find(|c| c.current <= 0.0) {
            return Err(AppError::BadRequest(format!(
                "IC50 values must be greater than 0, got {}",
                bad.current
            )));
        }
    }
    Ok(())
}

/// Check that the request carries exactly the fields its concentration
/// mode needs, returning the parsed mode.
fn validate_concentrations(input: &CreateSimulationInput) -> AppResult<ConcentrationMode> {
    let mode = ConcentrationMode::parse(&input.pk_or_concs).ok_or_else(|| {
        AppError::BadRequest(format!("Unknown concentration mode: {}", input.pk_or_concs))
    })?;
    match mode {
        ConcentrationMode::Range => {
            let (Some(minimum), Some(maximum)) =
                (input.minimum_concentration, input.maximum_concentration)
            else {
                return Err(AppError::BadRequest(
                    "Range mode needs minimum_concentration and maximum_concentration".into(),
                ));
            };
            if maximum <= minimum {
                return Err(AppError::BadRequest(
                    "maximum_concentration must be greater than minimum_concentration".into(),
                ));
            }
        }
        ConcentrationMode::Points => {
            if input.concentration_points.is_empty() {
                return Err(AppError::BadRequest(
                    "Points mode needs at least one concentration point".into(),
                ));
            }
            if input.concentration_points.iter().any(|p| *p < 0.0) {
                return Err(AppError::BadRequest(
                    "Concentration points must not be negative".into(),
                ));
            }
        }
        ConcentrationMode::Pharmacokinetics => {
            let Some(text) = &input.pk_data else {
                return Err(AppError::BadRequest(
                    "Pharmacokinetics mode needs a pk_data file".into(),
                ));
            };
            validate_pk_data(text)?;
        }
    }
    Ok(mode)
}

/// Human-readable description of the concentration specification for the
/// spreadsheet's input sheet.
fn concentration_detail(simulation: &Simulation, points: &[f64]) -> String {
    match ConcentrationMode::parse(&simulation.pk_or_concs) {
        Some(ConcentrationMode::Range) => {
            let minimum = simulation.minimum_concentration.unwrap_or(0.0);
            let maximum = simulation.maximum_concentration.unwrap_or(0.0);
            let count = simulation.intermediate_point_count.unwrap_or(0);
            let scale = if simulation.intermediate_point_log_scale {
                " (log scale)"
            } else {
                ""
            };
            format!("Range {minimum} - {maximum} µM, {count} intermediate points{scale}")
        }
        Some(ConcentrationMode::Points) => {
            let rendered: Vec<String> = points.iter().map(|p| p.to_string()).collect();
            format!("Points: {} µM", rendered.join(", "))
        }
        Some(ConcentrationMode::Pharmacokinetics) => "Pharmacokinetics data file".to_string(),
        None => simulation.pk_or_concs.clone(),
    }
}

fn model_display_name(model: &CellmlModel) -> String {
    if model.version.is_empty() {
        format!("{} ({})", model.name, model.year)
    } else {
        format!("{} {} ({})", model.name, model.version, model.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn range_input() -> CreateSimulationInput {
        CreateSimulationInput {
            title: "my simulation".to_string(),
            notes: String::new(),
            model_id: 1,
            pacing_frequency: 0.05,
            maximum_pacing_time: 5.0,
            ion_current_type: "pIC50".to_string(),
            ion_units: "-log(M)".to_string(),
            pk_or_concs: "compound_concentration_range".to_string(),
            minimum_concentration: Some(0.0),
            maximum_concentration: Some(100.0),
            intermediate_point_count: Some(4),
            intermediate_point_log_scale: true,
            pk_data: None,
            ion_currents: vec![IonCurrentInput {
                ion_current_id: 1,
                current: 4.37,
                hill_coefficient: 1.0,
                saturation_level: 0.0,
                spread_of_uncertainty: None,
            }],
            concentration_points: Vec::new(),
        }
    }

    #[test]
    fn range_input_passes() {
        let input = range_input();
        assert!(input.validate().is_ok());
        assert_eq!(
            validate_concentrations(&input).unwrap(),
            ConcentrationMode::Range
        );
        assert!(validate_units(&input).is_ok());
    }

    #[test]
    fn range_needs_both_bounds() {
        let mut input = range_input();
        input.maximum_concentration = None;
        assert_matches!(
            validate_concentrations(&input),
            Err(AppError::BadRequest(msg)) if msg.contains("maximum_concentration")
        );
    }

    #[test]
    fn range_bounds_must_be_ordered() {
        let mut input = range_input();
        input.minimum_concentration = Some(100.0);
        input.maximum_concentration = Some(1.0);
        assert_matches!(
            validate_concentrations(&input),
            Err(AppError::BadRequest(msg)) if msg.contains("greater than")
        );
    }

    #[test]
    fn points_mode_needs_points() {
        let mut input = range_input();
        input.pk_or_concs = "compound_concentration_points".to_string();
        assert_matches!(
            validate_concentrations(&input),
            Err(AppError::BadRequest(msg)) if msg.contains("at least one")
        );

        input.concentration_points = vec![1.0, 10.0];
        assert_eq!(
            validate_concentrations(&input).unwrap(),
            ConcentrationMode::Points
        );
    }

    #[test]
    fn negative_points_rejected() {
        let mut input = range_input();
        input.pk_or_concs = "compound_concentration_points".to_string();
        input.concentration_points = vec![1.0, -0.5];
        assert_matches!(
            validate_concentrations(&input),
            Err(AppError::BadRequest(msg)) if msg.contains("negative")
        );
    }

    #[test]
    fn pk_mode_needs_file_text() {
        let mut input = range_input();
        input.pk_or_concs = "pharmacokinetics".to_string();
        assert_matches!(
            validate_concentrations(&input),
            Err(AppError::BadRequest(msg)) if msg.contains("pk_data")
        );

        input.pk_data = Some("0.1\t1\t1.1\n".to_string());
        assert_eq!(
            validate_concentrations(&input).unwrap(),
            ConcentrationMode::Pharmacokinetics
        );
    }

    #[test]
    fn malformed_pk_data_rejected() {
        let mut input = range_input();
        input.pk_or_concs = "pharmacokinetics".to_string();
        input.pk_data = Some("0.1\tbla\n".to_string());
        assert_matches!(validate_concentrations(&input), Err(AppError::Core(_)));
    }

    #[test]
    fn unknown_mode_rejected() {
        let mut input = range_input();
        input.pk_or_concs = "by_vibes".to_string();
        assert_matches!(
            validate_concentrations(&input),
            Err(AppError::BadRequest(msg)) if msg.contains("by_vibes")
        );
    }

    #[test]
    fn unit_type_mismatch_rejected() {
        let mut input = range_input();
        input.ion_units = "µM".to_string();
        assert_matches!(
            validate_units(&input),
            Err(AppError::BadRequest(msg)) if msg.contains("not valid for pIC50")
        );
    }

    #[test]
    fn nonpositive_ic50_rejected() {
        let mut input = range_input();
        input.ion_current_type = "IC50".to_string();
        input.ion_units = "µM".to_string();
        input.ion_currents[0].current = 0.0;
        assert_matches!(
            validate_units(&input),
            Err(AppError::BadRequest(msg)) if msg.contains("greater than 0")
        );
    }

    #[test]
    fn out_of_range_pacing_rejected_by_derive() {
        let mut input = range_input();
        input.pacing_frequency = 9.0;
        assert!(input.validate().is_err());
    }

    #[test]
    fn concentration_detail_renders_each_mode() {
        let now = chrono::Utc::now();
        let mut simulation = Simulation {
            id: 1,
            title: "t".to_string(),
            notes: String::new(),
            author_id: 1,
            model_id: 1,
            pacing_frequency: 0.05,
            maximum_pacing_time: 5.0,
            ion_current_type: "pIC50".to_string(),
            ion_units: "-log(M)".to_string(),
            pk_or_concs: "compound_concentration_range".to_string(),
            minimum_concentration: Some(0.0),
            maximum_concentration: Some(100.0),
            intermediate_point_count: Some(4),
            intermediate_point_log_scale: true,
            pk_data_file: None,
            status: "NOT_STARTED".to_string(),
            progress: "Initialising..".to_string(),
            ap_predict_call_id: String::new(),
            ap_predict_last_update: now,
            api_errors: String::new(),
            q_net: None,
            voltage_traces: None,
            voltage_results: None,
            pkpd_results: None,
            messages: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(
            concentration_detail(&simulation, &[]),
            "Range 0 - 100 µM, 4 intermediate points (log scale)"
        );

        simulation.pk_or_concs = "compound_concentration_points".to_string();
        assert_eq!(
            concentration_detail(&simulation, &[1.0, 10.0]),
            "Points: 1, 10 µM"
        );

        simulation.pk_or_concs = "pharmacokinetics".to_string();
        assert_eq!(concentration_detail(&simulation, &[]), "Pharmacokinetics data file");
    }

    #[test]
    fn model_name_includes_version_when_present() {
        let now = chrono::Utc::now();
        let mut model = CellmlModel {
            id: 6,
            name: "O'Hara-Rudy".to_string(),
            description: String::new(),
            version: "CiPA (endo)".to_string(),
            year: 2017,
            predefined: true,
            ap_predict_model_id: Some(8),
            cellml_file: None,
            author_id: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(model_display_name(&model), "O'Hara-Rudy CiPA (endo) (2017)");

        model.version = String::new();
        assert_eq!(model_display_name(&model), "O'Hara-Rudy (2017)");
    }
}
