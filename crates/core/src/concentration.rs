//! Compound concentration specification modes.
//!
//! A simulation describes the concentrations to pace at in exactly one of
//! three ways: a min/max range with intermediate points, an explicit list
//! of points, or an uploaded pharmacokinetics time series.

use serde::{Deserialize, Serialize};

/// How a simulation specifies its compound concentrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcentrationMode {
    #[serde(rename = "compound_concentration_range")]
    Range,
    #[serde(rename = "compound_concentration_points")]
    Points,
    #[serde(rename = "pharmacokinetics")]
    Pharmacokinetics,
}

impl ConcentrationMode {
    /// The TEXT value stored in the `simulations.pk_or_concs` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcentrationMode::Range => "compound_concentration_range",
            ConcentrationMode::Points => "compound_concentration_points",
            ConcentrationMode::Pharmacokinetics => "pharmacokinetics",
        }
    }

    /// Parse a stored column value back into the mode.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "compound_concentration_range" => Some(ConcentrationMode::Range),
            "compound_concentration_points" => Some(ConcentrationMode::Points),
            "pharmacokinetics" => Some(ConcentrationMode::Pharmacokinetics),
            _ => None,
        }
    }
}

/// Sort concentration points ascending and drop exact duplicates.
///
/// The launch payload's `plasmaPoints` array must be ordered and
/// duplicate-free regardless of the order rows were entered in.
pub fn normalise_points(points: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = points.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted
}
