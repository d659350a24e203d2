//! Pipeline error type.

use apportal_core::types::DbId;
use apportal_db::media::MediaError;

/// Infrastructure errors from the orchestration pipeline.
///
/// Engine-side failures never surface here: those are recorded on the
/// simulation row (`FAILED` plus a stored message) and the operation
/// returns `Ok`, so one broken run cannot take down a poll batch.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("simulation {0} not found")]
    NotFound(DbId),

    #[error("cell model {0} not found")]
    ModelNotFound(DbId),

    /// A stored row violates an invariant the database schema should
    /// have enforced (unknown enum text, missing mode-specific fields).
    #[error("inconsistent simulation record: {0}")]
    Inconsistent(String),
}
