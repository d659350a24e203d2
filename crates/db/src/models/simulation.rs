//! Simulation entity models.
//!
//! The `Simulation` row carries both the immutable submission configuration
//! and the mutable orchestration state the poller drives (status, progress,
//! call id, errors, result payloads).

use apportal_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A configured simulation run and its orchestration state.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Simulation {
    pub id: DbId,
    pub title: String,
    pub notes: String,
    pub author_id: DbId,
    pub model_id: DbId,

    // Submission configuration, immutable after creation.
    pub pacing_frequency: f64,
    pub maximum_pacing_time: f64,
    pub ion_current_type: String,
    pub ion_units: String,
    pub pk_or_concs: String,
    pub minimum_concentration: Option<f64>,
    pub maximum_concentration: Option<f64>,
    pub intermediate_point_count: Option<i32>,
    pub intermediate_point_log_scale: bool,
    pub pk_data_file: Option<String>,

    // Orchestration state, driven by the launcher and poller.
    pub status: String,
    pub progress: String,
    pub ap_predict_call_id: String,
    pub ap_predict_last_update: Timestamp,
    pub api_errors: String,

    // Result payloads, stored verbatim as returned by the engine.
    pub q_net: Option<serde_json::Value>,
    pub voltage_traces: Option<serde_json::Value>,
    pub voltage_results: Option<serde_json::Value>,
    pub pkpd_results: Option<serde_json::Value>,
    pub messages: Option<serde_json::Value>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One configured ion current of a simulation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SimulationIonCurrentParam {
    pub id: DbId,
    pub simulation_id: DbId,
    pub ion_current_id: DbId,
    pub current: f64,
    pub hill_coefficient: f64,
    pub saturation_level: f64,
    pub spread_of_uncertainty: Option<f64>,
    pub created_at: Timestamp,
}

/// One explicit concentration point (points mode only).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompoundConcentrationPoint {
    pub id: DbId,
    pub simulation_id: DbId,
    pub concentration: f64,
    pub created_at: Timestamp,
}

/// Ion current param joined with its catalog name, as the launch payload
/// builder consumes it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IonParamView {
    pub ion_current_name: String,
    pub current: f64,
    pub hill_coefficient: f64,
    pub saturation_level: f64,
    pub spread_of_uncertainty: Option<f64>,
}

/// Insert payload for a simulation and its children, written in one
/// transaction. The author comes in separately from the authenticated
/// request.
#[derive(Debug, Clone)]
pub struct CreateSimulation {
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
    /// Media file name, already stored by the handler for PK mode.
    pub pk_data_file: Option<String>,
    pub ion_currents: Vec<CreateIonCurrentParam>,
    pub concentration_points: Vec<f64>,
}

/// Insert payload for one ion current row.
#[derive(Debug, Clone)]
pub struct CreateIonCurrentParam {
    pub ion_current_id: DbId,
    pub current: f64,
    pub hill_coefficient: f64,
    pub saturation_level: f64,
    pub spread_of_uncertainty: Option<f64>,
}

/// The five verbatim result payload columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultField {
    QNet,
    VoltageTraces,
    VoltageResults,
    PkpdResults,
    Messages,
}

impl ResultField {
    /// Column name on the `simulations` table.
    pub fn column(&self) -> &'static str {
        match self {
            ResultField::QNet => "q_net",
            ResultField::VoltageTraces => "voltage_traces",
            ResultField::VoltageResults => "voltage_results",
            ResultField::PkpdResults => "pkpd_results",
            ResultField::Messages => "messages",
        }
    }
}
