//! Repository for the `cellml_models` catalog table.

use apportal_core::types::DbId;
use sqlx::PgPool;

use crate::models::cell_model::CellmlModel;

/// Column list for `cellml_models` queries.
const COLUMNS: &str = "\
    id, name, description, version, year, predefined, \
    ap_predict_model_id, cellml_file, author_id, created_at, updated_at";

/// Provides read access to the cell model catalog.
pub struct CellModelRepo;

impl CellModelRepo {
    /// Find a model by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CellmlModel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cellml_models WHERE id = $1");
        sqlx::query_as::<_, CellmlModel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the models a user may run: predefined models, their own
    /// uploads, and everything for admins.
    pub async fn list_visible(
        pool: &PgPool,
        user_id: DbId,
        is_admin: bool,
    ) -> Result<Vec<CellmlModel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cellml_models \
             WHERE predefined OR author_id = $1 OR $2 \
             ORDER BY id"
        );
        sqlx::query_as::<_, CellmlModel>(&query)
            .bind(user_id)
            .bind(is_admin)
            .fetch_all(pool)
            .await
    }
}
