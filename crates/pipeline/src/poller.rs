//! Batch status polling.
//!
//! For each owned simulation in a poll request, queries the engine's
//! progress endpoint and applies one state transition: record fresh
//! progress, detect a stall past the configured timeout, or hand a done
//! run to the fetcher. Simulations are refreshed concurrently and
//! independently; one run's engine failure never aborts the batch.

use apportal_appredict::api::ApPredictApi;
use apportal_core::status::{percent_complete, SimulationStatus, PROGRESS_DONE_SENTINEL};
use apportal_core::types::DbId;
use apportal_db::models::simulation::Simulation;
use apportal_db::repositories::simulation_repo::SimulationRepo;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::PipelineError;
use crate::fetcher;

/// One simulation's state as returned to the polling client.
#[derive(Debug, Clone, Serialize)]
pub struct StatusRow {
    pub id: DbId,
    pub status: String,
    pub progress: String,
    /// Parsed out of `"<n>% completed"` labels for progress bars.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<u8>,
}

impl From<&Simulation> for StatusRow {
    fn from(simulation: &Simulation) -> Self {
        Self {
            id: simulation.id,
            status: simulation.status.clone(),
            progress: simulation.progress.clone(),
            percent: percent_complete(&simulation.progress),
        }
    }
}

/// What one poll step decided, given the stored label, the observed
/// label, and the stall clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollAction {
    /// A fresh label arrived: record it and keep the run alive.
    Progressed(String),
    /// Nothing new and the stall window has not elapsed.
    Unchanged,
    /// The engine appended the done sentinel: confirm the stop and fetch.
    Finish,
    /// No label change for longer than the configured timeout.
    TimedOut,
}

/// Decide the poll step for one simulation.
///
/// The done sentinel wins over a mere label change; an absent label
/// counts as unchanged so a silent engine eventually times out.
pub fn next_action(
    stored: &str,
    observed: Option<&str>,
    elapsed_secs: i64,
    timeout_secs: i64,
) -> PollAction {
    match observed {
        Some(label) if label == PROGRESS_DONE_SENTINEL => PollAction::Finish,
        Some(label) if label != stored => PollAction::Progressed(label.to_string()),
        _ => {
            if elapsed_secs > timeout_secs {
                PollAction::TimedOut
            } else {
                PollAction::Unchanged
            }
        }
    }
}

/// Stored error for a run whose progress stalled past the timeout.
pub fn progress_timeout_message(timeout_secs: i64) -> String {
    format!("Progress timeout: no update from Ap Predict for more than {timeout_secs} seconds.")
}

/// Refresh the status of the caller's simulations among `ids`.
///
/// Ids not owned by `author_id` are silently skipped. Terminal
/// simulations are reported as stored unless `force` re-checks them.
pub async fn refresh_status(
    pool: &PgPool,
    api: &ApPredictApi,
    author_id: DbId,
    ids: &[DbId],
    force: bool,
    timeout_secs: i64,
) -> Result<Vec<StatusRow>, PipelineError> {
    let simulations = SimulationRepo::find_owned_by_ids(pool, author_id, ids).await?;
    let refreshed = futures::future::join_all(
        simulations
            .into_iter()
            .map(|simulation| refresh_one(pool, api, simulation, force, timeout_secs)),
    )
    .await;
    refreshed.into_iter().collect()
}

/// Run one simulation's poll step and reload its row.
async fn refresh_one(
    pool: &PgPool,
    api: &ApPredictApi,
    simulation: Simulation,
    force: bool,
    timeout_secs: i64,
) -> Result<StatusRow, PipelineError> {
    let status = SimulationStatus::parse(&simulation.status)
        .map_err(|e| PipelineError::Inconsistent(e.to_string()))?;

    // Without a call id there is nothing to ask the engine about.
    if !status.needs_update(force) || simulation.ap_predict_call_id.is_empty() {
        return Ok(StatusRow::from(&simulation));
    }

    let observed = match api.progress_status(&simulation.ap_predict_call_id).await {
        Ok(observed) => observed,
        Err(e) => {
            tracing::warn!(simulation_id = simulation.id, error = %e, "Progress poll failed");
            SimulationRepo::mark_failed(pool, simulation.id, &e.to_string()).await?;
            return reload(pool, simulation.id).await;
        }
    };

    let elapsed_secs = (chrono::Utc::now() - simulation.ap_predict_last_update).num_seconds();
    match next_action(&simulation.progress, observed.as_deref(), elapsed_secs, timeout_secs) {
        PollAction::Progressed(label) => {
            tracing::debug!(simulation_id = simulation.id, progress = %label, "Progress advanced");
            SimulationRepo::update_progress(pool, simulation.id, &label).await?;
        }
        PollAction::Unchanged => {}
        PollAction::TimedOut => {
            tracing::warn!(
                simulation_id = simulation.id,
                elapsed_secs,
                "Progress stalled past timeout"
            );
            SimulationRepo::mark_failed(pool, simulation.id, &progress_timeout_message(timeout_secs))
                .await?;
        }
        PollAction::Finish => {
            fetcher::finish_run(pool, api, &simulation).await?;
        }
    }

    reload(pool, simulation.id).await
}

async fn reload(pool: &PgPool, id: DbId) -> Result<StatusRow, PipelineError> {
    let simulation = SimulationRepo::find_by_id(pool, id)
        .await?
        .ok_or(PipelineError::NotFound(id))?;
    Ok(StatusRow::from(&simulation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_label_progresses() {
        let action = next_action("Initialising..", Some("7% completed"), 10, 300);
        assert_eq!(action, PollAction::Progressed("7% completed".to_string()));
    }

    #[test]
    fn done_sentinel_wins_over_label_change() {
        assert_eq!(
            next_action("99% completed", Some("..done"), 10, 300),
            PollAction::Finish
        );
        // Still Finish when the sentinel was already stored: the stop is
        // retried until the engine confirms it.
        assert_eq!(
            next_action("..done", Some("..done"), 10, 300),
            PollAction::Finish
        );
    }

    #[test]
    fn unchanged_label_within_window_is_a_no_op() {
        assert_eq!(
            next_action("7% completed", Some("7% completed"), 299, 300),
            PollAction::Unchanged
        );
        // The boundary itself has not yet stalled.
        assert_eq!(
            next_action("7% completed", Some("7% completed"), 300, 300),
            PollAction::Unchanged
        );
    }

    #[test]
    fn unchanged_label_past_window_times_out() {
        assert_eq!(
            next_action("7% completed", Some("7% completed"), 301, 300),
            PollAction::TimedOut
        );
    }

    #[test]
    fn stale_record_from_the_distant_past_times_out() {
        let elapsed_since_epoch = chrono::Utc::now().timestamp();
        assert_eq!(
            next_action("Initialising..", Some("Initialising.."), elapsed_since_epoch, 300),
            PollAction::TimedOut
        );
    }

    #[test]
    fn silent_engine_counts_as_unchanged() {
        assert_eq!(next_action("Initialising..", None, 10, 300), PollAction::Unchanged);
        assert_eq!(next_action("Initialising..", None, 301, 300), PollAction::TimedOut);
    }

    #[test]
    fn timeout_message_names_the_window() {
        assert_eq!(
            progress_timeout_message(300),
            "Progress timeout: no update from Ap Predict for more than 300 seconds."
        );
    }

    #[test]
    fn status_row_parses_percent() {
        let now = chrono::Utc::now();
        let simulation = Simulation {
            id: 3,
            title: "t".to_string(),
            notes: String::new(),
            author_id: 1,
            model_id: 1,
            pacing_frequency: 1.0,
            maximum_pacing_time: 5.0,
            ion_current_type: "pIC50".to_string(),
            ion_units: "-log(M)".to_string(),
            pk_or_concs: "compound_concentration_range".to_string(),
            minimum_concentration: Some(0.0),
            maximum_concentration: Some(100.0),
            intermediate_point_count: Some(4),
            intermediate_point_log_scale: true,
            pk_data_file: None,
            status: "RUNNING".to_string(),
            progress: "42% completed".to_string(),
            ap_predict_call_id: "abc".to_string(),
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

        let row = StatusRow::from(&simulation);
        assert_eq!(row.percent, Some(42));
        assert_eq!(row.status, "RUNNING");

        let mut failed = simulation;
        failed.progress = "Failed!".to_string();
        assert_eq!(StatusRow::from(&failed).percent, None);
    }
}
