//! Pharmacokinetics data file validation.
//!
//! PK mode takes an uploaded tab-separated file: column 1 is time in hours,
//! columns 2 to 31 are compound concentrations in µM. The raw text is sent
//! to the engine verbatim, so malformed files are rejected at creation
//! rather than surfacing as an opaque engine error later.

use crate::error::CoreError;

/// Maximum number of concentration columns after the time column.
pub const MAX_CONCENTRATION_COLUMNS: usize = 30;

/// Check that `text` is a well-formed PK data file.
///
/// Every line must be tab-separated with a time value followed by 1 to 30
/// concentration values, all numeric. The first offending line is reported
/// with its 1-based line number.
pub fn validate_pk_data(text: &str) -> Result<(), CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = 0usize;
    for (index, record) in reader.records().enumerate() {
        let line = index + 1;
        let record = record
            .map_err(|e| CoreError::Validation(format!("PK data line {line}: {e}")))?;

        if record.len() < 2 {
            return Err(CoreError::Validation(format!(
                "PK data line {line}: expected a time column and at least one concentration column."
            )));
        }
        if record.len() > MAX_CONCENTRATION_COLUMNS + 1 {
            return Err(CoreError::Validation(format!(
                "PK data line {line}: at most {MAX_CONCENTRATION_COLUMNS} concentration columns are supported."
            )));
        }
        for value in record.iter() {
            if value.trim().parse::<f64>().is_err() {
                return Err(CoreError::Validation(format!(
                    "PK data line {line}: '{value}' is not a number."
                )));
            }
        }
        rows += 1;
    }

    if rows == 0 {
        return Err(CoreError::Validation("PK data file is empty.".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn accepts_well_formed_file() {
        assert!(validate_pk_data("0.1\t1\t1.1\n0.2\t2\t2.1\n").is_ok());
    }

    #[test]
    fn accepts_single_concentration_column() {
        assert!(validate_pk_data("0.0\t12.5\n1.0\t11.2\n").is_ok());
    }

    #[test]
    fn rejects_empty_file() {
        assert_matches!(
            validate_pk_data(""),
            Err(CoreError::Validation(msg)) if msg.contains("empty")
        );
    }

    #[test]
    fn rejects_missing_concentration_column() {
        assert_matches!(
            validate_pk_data("0.1\t1\t1.1\n0.2\n"),
            Err(CoreError::Validation(msg)) if msg.contains("line 2")
        );
    }

    #[test]
    fn rejects_non_numeric_value() {
        let err = validate_pk_data("0.1\t1\n0.2\tbla\n");
        assert_matches!(
            err,
            Err(CoreError::Validation(msg)) if msg.contains("line 2") && msg.contains("'bla'")
        );
    }

    #[test]
    fn rejects_too_many_columns() {
        let wide: String = (0..=31).map(|i| i.to_string()).collect::<Vec<_>>().join("\t");
        assert_matches!(
            validate_pk_data(&wide),
            Err(CoreError::Validation(msg)) if msg.contains("at most 30")
        );
    }
}
