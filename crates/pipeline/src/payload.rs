//! Launch payload construction.
//!
//! Builds the JSON body POSTed to the Ap Predict endpoint from a
//! simulation row and its children. Pure: file contents (PK data,
//! uploaded CellML) arrive as text, already read by the launcher.

use apportal_core::concentration::{normalise_points, ConcentrationMode};
use apportal_core::units::{to_pic50, ConcentrationUnit};
use apportal_db::models::simulation::{IonParamView, Simulation};
use serde_json::{json, Map, Value};

use crate::error::PipelineError;

/// Where the model half of the payload comes from: a built-in engine
/// model id, or the text of an uploaded CellML file the engine compiles
/// itself.
#[derive(Debug, Clone)]
pub enum ModelSource {
    Catalog(i32),
    Cellml(String),
}

/// Build the JSON body for the engine launch POST.
///
/// Exactly one concentration block is emitted (range fields, sorted
/// `plasmaPoints`, or raw `PK_data_file` text) and exactly one of
/// `modelId` / `cellml_file`, plus one entry per configured ion current
/// keyed by the current's name.
pub fn build_launch_payload(
    simulation: &Simulation,
    model: &ModelSource,
    ion_params: &[IonParamView],
    points: &[f64],
    pk_data: Option<&str>,
) -> Result<Value, PipelineError> {
    let units = ConcentrationUnit::parse(&simulation.ion_units)
        .ok_or_else(|| inconsistent(simulation, format!("unknown ion units {:?}", simulation.ion_units)))?;
    let mode = ConcentrationMode::parse(&simulation.pk_or_concs).ok_or_else(|| {
        inconsistent(
            simulation,
            format!("unknown concentration mode {:?}", simulation.pk_or_concs),
        )
    })?;

    let mut body = Map::new();
    body.insert("pacingFrequency".to_string(), number(simulation.pacing_frequency));
    body.insert("pacingMaxTime".to_string(), number(simulation.maximum_pacing_time));

    match mode {
        ConcentrationMode::Range => {
            let minimum = simulation
                .minimum_concentration
                .ok_or_else(|| inconsistent(simulation, "range mode without minimum concentration"))?;
            let maximum = simulation
                .maximum_concentration
                .ok_or_else(|| inconsistent(simulation, "range mode without maximum concentration"))?;
            let intermediate = simulation
                .intermediate_point_count
                .ok_or_else(|| inconsistent(simulation, "range mode without intermediate point count"))?;
            body.insert("plasmaMinimum".to_string(), Value::from(minimum));
            body.insert("plasmaMaximum".to_string(), Value::from(maximum));
            body.insert(
                "plasmaIntermediatePointCount".to_string(),
                Value::from(intermediate),
            );
            body.insert(
                "plasmaIntermediatePointLogScale".to_string(),
                Value::from(simulation.intermediate_point_log_scale),
            );
        }
        ConcentrationMode::Points => {
            body.insert("plasmaPoints".to_string(), Value::from(normalise_points(points)));
        }
        ConcentrationMode::Pharmacokinetics => {
            let data = pk_data
                .ok_or_else(|| inconsistent(simulation, "pharmacokinetics mode without PK data"))?;
            body.insert("PK_data_file".to_string(), Value::from(data));
        }
    }

    match model {
        ModelSource::Catalog(engine_id) => {
            body.insert("modelId".to_string(), Value::from(*engine_id));
        }
        ModelSource::Cellml(text) => {
            body.insert("cellml_file".to_string(), Value::from(text.as_str()));
        }
    }

    for param in ion_params {
        let mut entry = Map::new();
        entry.insert(
            "associatedData".to_string(),
            json!([{
                "pIC50": to_pic50(param.current, units),
                "hill": param.hill_coefficient,
                "saturation": param.saturation_level,
            }]),
        );
        if let Some(spread) = param.spread_of_uncertainty {
            entry.insert("spreads".to_string(), json!({ "c50Spread": spread }));
        }
        body.insert(param.ion_current_name.clone(), Value::Object(entry));
    }

    Ok(Value::Object(body))
}

/// Emit whole floats as JSON integers (5.0 becomes 5).
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

fn inconsistent(simulation: &Simulation, detail: impl Into<String>) -> PipelineError {
    PipelineError::Inconsistent(format!("simulation {}: {}", simulation.id, detail.into()))
}
