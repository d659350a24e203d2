//! Repository for the `simulations` table and its child tables.

use apportal_core::status::{truncate_api_error, SimulationStatus, PROGRESS_COMPLETED, PROGRESS_FAILED};
use apportal_core::types::DbId;
use sqlx::PgPool;

use crate::media::MediaStore;
use crate::models::simulation::{
    CompoundConcentrationPoint, CreateSimulation, IonParamView, ResultField, Simulation,
    SimulationIonCurrentParam,
};

/// Column list for `simulations` queries.
const COLUMNS: &str = "\
    id, title, notes, author_id, model_id, \
    pacing_frequency, maximum_pacing_time, ion_current_type, ion_units, \
    pk_or_concs, minimum_concentration, maximum_concentration, \
    intermediate_point_count, intermediate_point_log_scale, pk_data_file, \
    status, progress, ap_predict_call_id, ap_predict_last_update, api_errors, \
    q_net, voltage_traces, voltage_results, pkpd_results, messages, \
    created_at, updated_at";

/// Maximum page size for simulation listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for simulation listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD and orchestration-state operations for simulations.
pub struct SimulationRepo;

impl SimulationRepo {
    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Create a simulation together with its ion current params and
    /// concentration points in one transaction.
    pub async fn create(
        pool: &PgPool,
        author_id: DbId,
        input: &CreateSimulation,
    ) -> Result<Simulation, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO simulations \
                (title, notes, author_id, model_id, pacing_frequency, maximum_pacing_time, \
                 ion_current_type, ion_units, pk_or_concs, minimum_concentration, \
                 maximum_concentration, intermediate_point_count, intermediate_point_log_scale, \
                 pk_data_file) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {COLUMNS}"
        );
        let simulation = sqlx::query_as::<_, Simulation>(&insert_query)
            .bind(&input.title)
            .bind(&input.notes)
            .bind(author_id)
            .bind(input.model_id)
            .bind(input.pacing_frequency)
            .bind(input.maximum_pacing_time)
            .bind(&input.ion_current_type)
            .bind(&input.ion_units)
            .bind(&input.pk_or_concs)
            .bind(input.minimum_concentration)
            .bind(input.maximum_concentration)
            .bind(input.intermediate_point_count)
            .bind(input.intermediate_point_log_scale)
            .bind(&input.pk_data_file)
            .fetch_one(&mut *tx)
            .await?;

        for param in &input.ion_currents {
            sqlx::query(
                "INSERT INTO simulation_ion_current_params \
                    (simulation_id, ion_current_id, current, hill_coefficient, \
                     saturation_level, spread_of_uncertainty) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(simulation.id)
            .bind(param.ion_current_id)
            .bind(param.current)
            .bind(param.hill_coefficient)
            .bind(param.saturation_level)
            .bind(param.spread_of_uncertainty)
            .execute(&mut *tx)
            .await?;
        }

        for concentration in &input.concentration_points {
            sqlx::query(
                "INSERT INTO compound_concentration_points (simulation_id, concentration) \
                 VALUES ($1, $2)",
            )
            .bind(simulation.id)
            .bind(concentration)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(simulation)
    }

    /// Find a simulation by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Simulation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM simulations WHERE id = $1");
        sqlx::query_as::<_, Simulation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an author's simulations, newest first.
    pub async fn list_by_author(
        pool: &PgPool,
        author_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Simulation>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        let query = format!(
            "SELECT {COLUMNS} FROM simulations \
             WHERE author_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Simulation>(&query)
            .bind(author_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Load the subset of `ids` owned by `author_id`, in id order.
    ///
    /// Ids belonging to other authors are silently absent from the result;
    /// the status endpoint polls only what the caller owns.
    pub async fn find_owned_by_ids(
        pool: &PgPool,
        author_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<Simulation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM simulations \
             WHERE author_id = $1 AND id = ANY($2) \
             ORDER BY id"
        );
        sqlx::query_as::<_, Simulation>(&query)
            .bind(author_id)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// All titles belonging to an author (for template title suggestions).
    pub async fn titles_by_author(
        pool: &PgPool,
        author_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT title FROM simulations WHERE author_id = $1")
            .bind(author_id)
            .fetch_all(pool)
            .await
    }

    /// The ion current params of a simulation, in insertion order.
    pub async fn ion_params(
        pool: &PgPool,
        simulation_id: DbId,
    ) -> Result<Vec<SimulationIonCurrentParam>, sqlx::Error> {
        sqlx::query_as::<_, SimulationIonCurrentParam>(
            "SELECT id, simulation_id, ion_current_id, current, hill_coefficient, \
                    saturation_level, spread_of_uncertainty, created_at \
             FROM simulation_ion_current_params \
             WHERE simulation_id = $1 \
             ORDER BY id",
        )
        .bind(simulation_id)
        .fetch_all(pool)
        .await
    }

    /// Ion current params joined with their catalog names, as the launch
    /// payload builder consumes them.
    pub async fn ion_params_view(
        pool: &PgPool,
        simulation_id: DbId,
    ) -> Result<Vec<IonParamView>, sqlx::Error> {
        sqlx::query_as::<_, IonParamView>(
            "SELECT c.name AS ion_current_name, p.current, p.hill_coefficient, \
                    p.saturation_level, p.spread_of_uncertainty \
             FROM simulation_ion_current_params p \
             JOIN ion_currents c ON c.id = p.ion_current_id \
             WHERE p.simulation_id = $1 \
             ORDER BY c.id",
        )
        .bind(simulation_id)
        .fetch_all(pool)
        .await
    }

    /// The concentration points of a simulation, ascending.
    pub async fn concentration_points(
        pool: &PgPool,
        simulation_id: DbId,
    ) -> Result<Vec<CompoundConcentrationPoint>, sqlx::Error> {
        sqlx::query_as::<_, CompoundConcentrationPoint>(
            "SELECT id, simulation_id, concentration, created_at \
             FROM compound_concentration_points \
             WHERE simulation_id = $1 \
             ORDER BY concentration",
        )
        .bind(simulation_id)
        .fetch_all(pool)
        .await
    }

    /// Update the only fields that stay editable after submission.
    pub async fn update_title_notes(
        pool: &PgPool,
        id: DbId,
        title: &str,
        notes: &str,
    ) -> Result<Option<Simulation>, sqlx::Error> {
        let query = format!(
            "UPDATE simulations \
             SET title = $2, notes = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Simulation>(&query)
            .bind(id)
            .bind(title)
            .bind(notes)
            .fetch_optional(pool)
            .await
    }

    /// Delete a simulation (children cascade) and best-effort remove its
    /// stored PK-data file. Returns whether a row was deleted.
    pub async fn delete_with_media(
        pool: &PgPool,
        media: &MediaStore,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let deleted: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM simulations WHERE id = $1 RETURNING pk_data_file")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        match deleted {
            None => Ok(false),
            Some(pk_data_file) => {
                if let Some(name) = pk_data_file {
                    if let Err(e) = media.remove(&name).await {
                        tracing::warn!(simulation_id = id, file = %name, error = %e,
                            "Failed to remove PK data file after delete");
                    }
                }
                Ok(true)
            }
        }
    }

    // -----------------------------------------------------------------
    // Orchestration state transitions
    // -----------------------------------------------------------------

    /// Reset a simulation to its freshly-(re)started state, before the
    /// launch POST goes out: NOT_STARTED, the given initial progress label,
    /// call id, errors and all result payloads cleared, last-update now.
    pub async fn reset_for_launch(
        pool: &PgPool,
        id: DbId,
        initial_progress: &str,
    ) -> Result<Option<Simulation>, sqlx::Error> {
        let query = format!(
            "UPDATE simulations \
             SET status = $2, progress = $3, ap_predict_call_id = '', api_errors = '', \
                 q_net = NULL, voltage_traces = NULL, voltage_results = NULL, \
                 pkpd_results = NULL, messages = NULL, \
                 ap_predict_last_update = NOW(), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Simulation>(&query)
            .bind(id)
            .bind(SimulationStatus::NotStarted.as_str())
            .bind(initial_progress)
            .fetch_optional(pool)
            .await
    }

    /// Record a successful launch: store the engine call id, INITIALISING.
    pub async fn mark_launched(
        pool: &PgPool,
        id: DbId,
        call_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE simulations \
             SET ap_predict_call_id = $2, status = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(call_id)
        .bind(SimulationStatus::Initialising.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a terminal failure. The message is truncated to the column
    /// width here so every failure path shares one rule.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        message: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE simulations \
             SET status = $2, progress = $3, api_errors = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(SimulationStatus::Failed.as_str())
        .bind(PROGRESS_FAILED)
        .bind(truncate_api_error(message))
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record an observed progress change: new label, RUNNING, and a fresh
    /// stall clock.
    pub async fn update_progress(
        pool: &PgPool,
        id: DbId,
        progress: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE simulations \
             SET progress = $2, status = $3, ap_predict_last_update = NOW(), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(progress)
        .bind(SimulationStatus::Running.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a completed run with results stored: SUCCESS, errors cleared.
    pub async fn mark_success(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE simulations \
             SET status = $2, progress = $3, api_errors = '', updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(SimulationStatus::Success.as_str())
        .bind(PROGRESS_COMPLETED)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Store one verbatim result payload.
    pub async fn store_result(
        pool: &PgPool,
        id: DbId,
        field: ResultField,
        payload: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        let query = format!(
            "UPDATE simulations SET {} = $2, updated_at = NOW() WHERE id = $1",
            field.column()
        );
        sqlx::query(&query)
            .bind(id)
            .bind(payload)
            .execute(pool)
            .await?;
        Ok(())
    }
}
