//! Repository for the `ion_currents` catalog table.

use sqlx::PgPool;

use crate::models::cell_model::IonCurrent;

/// Column list for `ion_currents` queries.
const COLUMNS: &str = "\
    id, name, default_hill_coefficient, default_saturation_level, \
    default_spread_of_uncertainty, compatible_models, created_at, updated_at";

/// Provides read access to the ion current catalog.
pub struct IonCurrentRepo;

impl IonCurrentRepo {
    /// List all known ion currents in catalog order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<IonCurrent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ion_currents ORDER BY id");
        sqlx::query_as::<_, IonCurrent>(&query)
            .fetch_all(pool)
            .await
    }
}
