//! Concentration-unit conversion for ion-current potency values.
//!
//! The Ap Predict engine always takes potency as pIC50 (`-log10` of the
//! molar IC50). Users enter values in whichever unit their assay reported,
//! so every value is normalised through [`to_pic50`] before it goes into a
//! launch payload.

use serde::{Deserialize, Serialize};

/// How the user expressed an ion-current potency value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IonCurrentType {
    #[serde(rename = "pIC50")]
    Pic50,
    #[serde(rename = "IC50")]
    Ic50,
}

impl IonCurrentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IonCurrentType::Pic50 => "pIC50",
            IonCurrentType::Ic50 => "IC50",
        }
    }

    /// Parse a stored column value back into the type.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pIC50" => Some(IonCurrentType::Pic50),
            "IC50" => Some(IonCurrentType::Ic50),
            _ => None,
        }
    }

    /// Units that make sense for this potency type.
    ///
    /// pIC50 values are already logarithms, so the only valid unit is the
    /// identity `-log(M)`; IC50 values are concentrations in M, µM or nM.
    pub fn valid_units(&self) -> &'static [ConcentrationUnit] {
        match self {
            IonCurrentType::Pic50 => &[ConcentrationUnit::LogM],
            IonCurrentType::Ic50 => &[
                ConcentrationUnit::Molar,
                ConcentrationUnit::MicroMolar,
                ConcentrationUnit::NanoMolar,
            ],
        }
    }
}

/// Unit a concentration (or already-converted potency) was entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcentrationUnit {
    /// `-log(M)`: the value is already a pIC50.
    #[serde(rename = "-log(M)")]
    LogM,
    /// Molar.
    #[serde(rename = "M")]
    Molar,
    /// Micromolar (1e-6 M).
    #[serde(rename = "µM")]
    MicroMolar,
    /// Nanomolar (1e-9 M).
    #[serde(rename = "nM")]
    NanoMolar,
}

impl ConcentrationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcentrationUnit::LogM => "-log(M)",
            ConcentrationUnit::Molar => "M",
            ConcentrationUnit::MicroMolar => "µM",
            ConcentrationUnit::NanoMolar => "nM",
        }
    }

    /// Parse a stored column value back into the unit.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "-log(M)" => Some(ConcentrationUnit::LogM),
            "M" => Some(ConcentrationUnit::Molar),
            "µM" => Some(ConcentrationUnit::MicroMolar),
            "nM" => Some(ConcentrationUnit::NanoMolar),
            _ => None,
        }
    }

    /// Multiplier taking a value in this unit to molar. `None` for the
    /// identity unit, which carries no scale.
    fn molar_multiplier(&self) -> Option<f64> {
        match self {
            ConcentrationUnit::LogM => None,
            ConcentrationUnit::Molar => Some(1.0),
            ConcentrationUnit::MicroMolar => Some(1e-6),
            ConcentrationUnit::NanoMolar => Some(1e-9),
        }
    }
}

/// Convert a potency value in `unit` to pIC50.
///
/// `-log(M)` is the identity; concentration units scale to molar first,
/// then take `-log10`. Callers must have validated `value > 0` for the
/// concentration units (the create form enforces this).
pub fn to_pic50(value: f64, unit: ConcentrationUnit) -> f64 {
    match unit.molar_multiplier() {
        None => value,
        Some(multiplier) => -(value * multiplier).log10(),
    }
}

/// Inverse of [`to_pic50`]: recover the concentration in `unit` from a
/// pIC50 value.
pub fn from_pic50(pic50: f64, unit: ConcentrationUnit) -> f64 {
    match unit.molar_multiplier() {
        None => pic50,
        Some(multiplier) => 10f64.powf(-pic50) / multiplier,
    }
}
