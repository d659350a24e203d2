//! Simulation lifecycle status and progress labels.
//!
//! `status` is the orchestration state machine
//! (`NOT_STARTED → INITIALISING → RUNNING → {SUCCESS | FAILED}`); `progress`
//! is the free-text label reported by the Ap Predict progress endpoint and
//! shown verbatim in the UI. Both are stored as TEXT on the simulations
//! table.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3})% completed$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Progress labels
// ---------------------------------------------------------------------------

/// Initial progress label for simulations against a built-in model.
pub const PROGRESS_INITIALISING: &str = "Initialising..";
/// Initial progress label when an uploaded CellML file must be compiled
/// by the engine before pacing can begin.
pub const PROGRESS_COMPILING_CELLML: &str = "Compiling CellML..";
/// Progress label for any terminal failure.
pub const PROGRESS_FAILED: &str = "Failed!";
/// Progress label once results have been fetched and stored.
pub const PROGRESS_COMPLETED: &str = "Completed";
/// Final element the engine appends to the progress history when the run
/// has produced all of its output.
pub const PROGRESS_DONE_SENTINEL: &str = "..done";

/// Widest value the `api_errors` column accepts; longer messages are
/// truncated before persisting.
pub const API_ERROR_MAX_LEN: usize = 254;

// ---------------------------------------------------------------------------
// Status state machine
// ---------------------------------------------------------------------------

/// Orchestration state of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SimulationStatus {
    #[serde(rename = "NOT_STARTED")]
    NotStarted,
    #[serde(rename = "INITIALISING")]
    Initialising,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

impl SimulationStatus {
    /// The TEXT value stored in the `simulations.status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationStatus::NotStarted => "NOT_STARTED",
            SimulationStatus::Initialising => "INITIALISING",
            SimulationStatus::Running => "RUNNING",
            SimulationStatus::Success => "SUCCESS",
            SimulationStatus::Failed => "FAILED",
        }
    }

    /// Parse a stored column value back into the enum.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "NOT_STARTED" => Ok(SimulationStatus::NotStarted),
            "INITIALISING" => Ok(SimulationStatus::Initialising),
            "RUNNING" => Ok(SimulationStatus::Running),
            "SUCCESS" => Ok(SimulationStatus::Success),
            "FAILED" => Ok(SimulationStatus::Failed),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }

    /// Terminal states are never polled again without an explicit restart.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SimulationStatus::Success | SimulationStatus::Failed)
    }

    /// Whether a status poll should query the engine for this simulation.
    ///
    /// `force` re-checks terminal simulations too (used after a browser
    /// reload so a stale FAILED/SUCCESS row still gets one fresh look).
    pub fn needs_update(&self, force: bool) -> bool {
        force || !self.is_terminal()
    }
}

impl std::fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Progress label helpers
// ---------------------------------------------------------------------------

/// Initial progress label for a freshly (re)started simulation.
///
/// Uploaded CellML models go through an engine-side compilation step first,
/// so they get their own label.
pub fn initial_progress(uses_uploaded_cellml: bool) -> &'static str {
    if uses_uploaded_cellml {
        PROGRESS_COMPILING_CELLML
    } else {
        PROGRESS_INITIALISING
    }
}

/// Extract the percentage out of a `"<n>% completed"` progress label.
///
/// Returns `None` for labels that do not carry a percentage
/// (`"Initialising.."`, `"Failed!"`, ...).
pub fn percent_complete(progress: &str) -> Option<u8> {
    let captures = PERCENT_RE.captures(progress)?;
    captures.get(1)?.as_str().parse().ok()
}

/// Truncate an error message to what the `api_errors` column can hold.
///
/// Truncation is by character so a multi-byte boundary can never split.
pub fn truncate_api_error(message: &str) -> String {
    message.chars().take(API_ERROR_MAX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn status_round_trips_through_column_text() {
        for status in [
            SimulationStatus::NotStarted,
            SimulationStatus::Initialising,
            SimulationStatus::Running,
            SimulationStatus::Success,
            SimulationStatus::Failed,
        ] {
            assert_eq!(SimulationStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_matches!(
            SimulationStatus::parse("EXPLODED"),
            Err(CoreError::UnknownStatus(s)) if s == "EXPLODED"
        );
    }

    #[test]
    fn terminal_states() {
        assert!(SimulationStatus::Success.is_terminal());
        assert!(SimulationStatus::Failed.is_terminal());
        assert!(!SimulationStatus::Running.is_terminal());
        assert!(!SimulationStatus::Initialising.is_terminal());
        assert!(!SimulationStatus::NotStarted.is_terminal());
    }

    #[test]
    fn needs_update_skips_terminal_unless_forced() {
        assert!(!SimulationStatus::Success.needs_update(false));
        assert!(SimulationStatus::Success.needs_update(true));
        assert!(SimulationStatus::Running.needs_update(false));
    }

    #[test]
    fn initial_progress_distinguishes_cellml_uploads() {
        assert_eq!(initial_progress(false), PROGRESS_INITIALISING);
        assert_eq!(initial_progress(true), PROGRESS_COMPILING_CELLML);
    }

    #[test]
    fn percent_parsed_from_completed_label() {
        assert_eq!(percent_complete("7% completed"), Some(7));
        assert_eq!(percent_complete("100% completed"), Some(100));
        assert_eq!(percent_complete("0% completed"), Some(0));
    }

    #[test]
    fn percent_absent_for_other_labels() {
        assert_eq!(percent_complete("Initialising.."), None);
        assert_eq!(percent_complete("Failed!"), None);
        assert_eq!(percent_complete("Completed"), None);
        assert_eq!(percent_complete("..done"), None);
        assert_eq!(percent_complete("% completed"), None);
    }

    #[test]
    fn api_error_truncated_to_column_width() {
        let message = "something went wrong".repeat(15);
        let truncated = truncate_api_error(&message);
        assert_eq!(truncated.chars().count(), API_ERROR_MAX_LEN);
        assert!(message.starts_with(&truncated));
    }

    #[test]
    fn short_api_error_kept_whole() {
        assert_eq!(truncate_api_error("boom"), "boom");
    }

    #[test]
    fn serializes_as_column_text() {
        let json = serde_json::to_string(&SimulationStatus::NotStarted).unwrap();
        assert_eq!(json, "\"NOT_STARTED\"");
    }
}
