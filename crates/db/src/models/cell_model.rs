//! Reference catalog models: cell models and ion currents.
//!
//! Consumed read-only by the simulation core; rows are seeded by the
//! migrations (predefined models, the seven ion currents) or created by the
//! out-of-scope CellML upload flow.

use apportal_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A cardiac cell model the engine can run.
///
/// Exactly one of `ap_predict_model_id` (built-in engine model) and
/// `cellml_file` (uploaded CellML, stored in the media directory) is set.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CellmlModel {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub version: String,
    pub year: i32,
    pub predefined: bool,
    pub ap_predict_model_id: Option<i32>,
    pub cellml_file: Option<String>,
    pub author_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CellmlModel {
    /// Whether launching this model sends raw CellML for engine-side
    /// compilation rather than a built-in model id.
    pub fn uses_uploaded_cellml(&self) -> bool {
        self.cellml_file.is_some()
    }
}

/// A named ionic current users can parameterise.
///
/// `compatible_models` is a JSON array of `ap_predict_model_id` values the
/// current exists in (INaL, for example, only exists in the O'Hara-Rudy
/// variants).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IonCurrent {
    pub id: DbId,
    pub name: String,
    pub default_hill_coefficient: f64,
    pub default_saturation_level: f64,
    pub default_spread_of_uncertainty: f64,
    pub compatible_models: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
