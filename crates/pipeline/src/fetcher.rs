//! Result retrieval for runs that report done.
//!
//! Confirms the halt with a STOP call, then fetches the five result
//! payloads concurrently and persists each verbatim. A run only counts
//! as a success when every fetch succeeded and the voltage traces came
//! back non-empty.

use apportal_appredict::api::ApPredictApi;
use apportal_appredict::commands::ResultCommand;
use apportal_db::models::simulation::{ResultField, Simulation};
use apportal_db::repositories::simulation_repo::SimulationRepo;
use futures::future::join_all;
use sqlx::PgPool;

use crate::error::PipelineError;

/// Stored error when a stopped run yielded no usable result data.
pub const STOPPED_PREMATURELY: &str =
    "Simulation stopped prematurely: no result data returned.";

/// Confirm the stop and fetch all result payloads for a run the engine
/// reports as done.
///
/// An unconfirmed stop leaves the record untouched for the next poll.
pub async fn finish_run(
    pool: &PgPool,
    api: &ApPredictApi,
    simulation: &Simulation,
) -> Result<(), PipelineError> {
    match api.stop(&simulation.ap_predict_call_id).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(
                simulation_id = simulation.id,
                "Stop not confirmed, leaving for next poll"
            );
            return Ok(());
        }
        Err(e) => {
            tracing::warn!(simulation_id = simulation.id, error = %e, "Stop call failed");
            SimulationRepo::mark_failed(pool, simulation.id, &e.to_string()).await?;
            return Ok(());
        }
    }

    fetch_results(pool, api, simulation).await
}

/// Fetch the five result commands concurrently, store what arrived, and
/// settle the run's final status.
async fn fetch_results(
    pool: &PgPool,
    api: &ApPredictApi,
    simulation: &Simulation,
) -> Result<(), PipelineError> {
    let call_id = simulation.ap_predict_call_id.as_str();
    let outcomes = join_all(
        ResultCommand::ALL
            .iter()
            .map(|&command| async move { (command, api.fetch_result(call_id, command).await) }),
    )
    .await;

    let mut first_error = None;
    let mut have_traces = false;
    for (command, outcome) in outcomes {
        match outcome {
            Ok(Some(payload)) => {
                if command == ResultCommand::VoltageTraces {
                    have_traces = payload.as_array().is_some_and(|a| !a.is_empty());
                }
                SimulationRepo::store_result(pool, simulation.id, result_field(command), &payload)
                    .await?;
            }
            Ok(None) => {
                tracing::debug!(
                    simulation_id = simulation.id,
                    command = %command,
                    "Result unavailable for this run"
                );
            }
            Err(e) => {
                tracing::warn!(
                    simulation_id = simulation.id,
                    command = %command,
                    error = %e,
                    "Result fetch failed"
                );
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if let Some(e) = first_error {
        SimulationRepo::mark_failed(pool, simulation.id, &e.to_string()).await?;
    } else if have_traces {
        tracing::info!(simulation_id = simulation.id, "Simulation completed");
        SimulationRepo::mark_success(pool, simulation.id).await?;
    } else {
        SimulationRepo::mark_failed(pool, simulation.id, STOPPED_PREMATURELY).await?;
    }
    Ok(())
}

/// Which column a fetched command's payload lands in.
fn result_field(command: ResultCommand) -> ResultField {
    match command {
        ResultCommand::QNet => ResultField::QNet,
        ResultCommand::VoltageTraces => ResultField::VoltageTraces,
        ResultCommand::VoltageResults => ResultField::VoltageResults,
        ResultCommand::PkpdResults => ResultField::PkpdResults,
        ResultCommand::Messages => ResultField::Messages,
    }
}
