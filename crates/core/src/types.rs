/// Primary keys are PostgreSQL BIGSERIAL columns.
pub type DbId = i64;

/// Timestamps are always UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
