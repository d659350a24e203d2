#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown simulation status: {0}")]
    UnknownStatus(String),

    #[error("Spreadsheet rendering failed: {0}")]
    Spreadsheet(String),
}
