//! Shared query parameter types for API handlers.

use apportal_core::types::DbId;
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped in the repository layer.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for the status poll endpoint
/// (`?ids=1,2,3&force=false`).
#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub ids: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// Query parameters for the spreadsheet endpoint (`?format=csv`).
#[derive(Debug, Deserialize)]
pub struct SpreadsheetParams {
    pub format: Option<String>,
}

/// Parse a comma-separated id list (`"1,2,3"`). Empty segments are
/// skipped, so trailing commas are harmless.
pub fn parse_id_list(raw: &str) -> Result<Vec<DbId>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<DbId>()
                .map_err(|_| format!("'{s}' is not a valid simulation id"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_list_parsed() {
        assert_eq!(parse_id_list("1,2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list(" 7 , 9 ").unwrap(), vec![7, 9]);
    }

    #[test]
    fn empty_segments_skipped() {
        assert_eq!(parse_id_list("").unwrap(), Vec::<DbId>::new());
        assert_eq!(parse_id_list("1,,2,").unwrap(), vec![1, 2]);
    }

    #[test]
    fn bad_token_reported() {
        let err = parse_id_list("1,x,3").unwrap_err();
        assert_eq!(err, "'x' is not a valid simulation id");
    }
}
