//! Schema validation for result payloads.
//!
//! Result payloads are stored and served verbatim, so this check at
//! fetch time is the only guard against a malformed engine response.
//! Violations produce a human-readable detail that ends up in the
//! simulation's stored error message.

use serde_json::{Map, Value};

use crate::commands::ResultCommand;

/// Validate a `success` payload against its command's schema.
///
/// Returns the detail of the first violation found.
pub fn validate(command: ResultCommand, payload: &Value) -> Result<(), String> {
    match command {
        ResultCommand::Messages => validate_messages(payload),
        ResultCommand::QNet => validate_qnet(payload),
        ResultCommand::VoltageResults => validate_voltage_results(payload),
        ResultCommand::VoltageTraces | ResultCommand::PkpdResults => {
            validate_named_series(payload)
        }
    }
}

// ---- per-command shapes ----

/// `messages`: an array of strings.
fn validate_messages(payload: &Value) -> Result<(), String> {
    for item in as_array(payload)? {
        if !item.is_string() {
            return Err(format!("{item} is not of type 'string'"));
        }
    }
    Ok(())
}

/// `voltage_traces` / `pkpd_results`: an array of named series, each
/// `{name: string, series: [{name: number, value: number}]}`.
fn validate_named_series(payload: &Value) -> Result<(), String> {
    for item in as_array(payload)? {
        let obj = as_object(item)?;
        require_string(obj, "name")?;
        let series = obj
            .get("series")
            .ok_or_else(|| "'series' is a required property".to_string())?;
        for point in as_array(series)? {
            let point = as_object(point)?;
            require_number(point, "name")?;
            require_number(point, "value")?;
        }
    }
    Ok(())
}

/// `q_net`: an array of `{c: number, qnet: number | [lo, med, hi]}`.
fn validate_qnet(payload: &Value) -> Result<(), String> {
    for item in as_array(payload)? {
        let obj = as_object(item)?;
        require_number(obj, "c")?;
        match obj.get("qnet") {
            Some(v) if is_number_or_triple(v) => {}
            Some(v) => return Err(triple_detail(v)),
            None => return Err("'qnet' is a required property".to_string()),
        }
    }
    Ok(())
}

/// `voltage_results`: an array of `{c: number}` with optional `apd90` /
/// `delta_apd90` values, each a number or an uncertainty triple.
fn validate_voltage_results(payload: &Value) -> Result<(), String> {
    for item in as_array(payload)? {
        let obj = as_object(item)?;
        require_number(obj, "c")?;
        for key in ["apd90", "delta_apd90"] {
            if let Some(v) = obj.get(key) {
                if !is_number_or_triple(v) {
                    return Err(triple_detail(v));
                }
            }
        }
    }
    Ok(())
}

// ---- helpers ----

fn as_array(value: &Value) -> Result<&Vec<Value>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("{value} is not of type 'array'"))
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, String> {
    value
        .as_object()
        .ok_or_else(|| format!("{value} is not of type 'object'"))
}

fn require_string(obj: &Map<String, Value>, key: &str) -> Result<(), String> {
    match obj.get(key) {
        Some(v) if v.is_string() => Ok(()),
        Some(v) => Err(format!("{v} is not of type 'string'")),
        None => Err(format!("'{key}' is a required property")),
    }
}

fn require_number(obj: &Map<String, Value>, key: &str) -> Result<(), String> {
    match obj.get(key) {
        Some(v) if v.is_number() => Ok(()),
        Some(v) => Err(format!("{v} is not of type 'number'")),
        None => Err(format!("'{key}' is a required property")),
    }
}

fn is_number_or_triple(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::Array(items) => items.len() == 3 && items.iter().all(Value::is_number),
        _ => false,
    }
}

fn triple_detail(value: &Value) -> String {
    format!("{value} is not of type 'number' or '[number, number, number]'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_accepts_string_array() {
        let payload = json!(["No errors", "1 warning"]);
        assert_eq!(validate(ResultCommand::Messages, &payload), Ok(()));
    }

    #[test]
    fn messages_rejects_non_array() {
        let err = validate(ResultCommand::Messages, &json!("some other response")).unwrap_err();
        assert_eq!(err, r#""some other response" is not of type 'array'"#);
    }

    #[test]
    fn messages_rejects_non_string_item() {
        let err = validate(ResultCommand::Messages, &json!(["ok", 3])).unwrap_err();
        assert_eq!(err, "3 is not of type 'string'");
    }

    #[test]
    fn traces_accept_named_series() {
        let payload = json!([
            {"name": "Control", "series": [{"name": 0.0, "value": -85.2}, {"name": 1.0, "value": 40.1}]},
            {"name": "1µM", "series": []}
        ]);
        assert_eq!(validate(ResultCommand::VoltageTraces, &payload), Ok(()));
    }

    #[test]
    fn traces_require_name_and_series() {
        let err = validate(ResultCommand::VoltageTraces, &json!([{"series": []}])).unwrap_err();
        assert_eq!(err, "'name' is a required property");

        let err = validate(ResultCommand::VoltageTraces, &json!([{"name": "x"}])).unwrap_err();
        assert_eq!(err, "'series' is a required property");
    }

    #[test]
    fn traces_reject_malformed_point() {
        let payload = json!([{"name": "x", "series": [{"name": "t0", "value": 1.0}]}]);
        let err = validate(ResultCommand::VoltageTraces, &payload).unwrap_err();
        assert_eq!(err, r#""t0" is not of type 'number'"#);
    }

    #[test]
    fn qnet_accepts_numbers_and_triples() {
        let payload = json!([
            {"c": 0.0, "qnet": 0.07},
            {"c": 1.0, "qnet": [0.05, 0.06, 0.08]}
        ]);
        assert_eq!(validate(ResultCommand::QNet, &payload), Ok(()));
    }

    #[test]
    fn qnet_rejects_short_triple() {
        let payload = json!([{"c": 1.0, "qnet": [0.05, 0.06]}]);
        let err = validate(ResultCommand::QNet, &payload).unwrap_err();
        assert_eq!(
            err,
            "[0.05,0.06] is not of type 'number' or '[number, number, number]'"
        );
    }

    #[test]
    fn voltage_results_allow_optional_metrics() {
        let payload = json!([
            {"c": 0.0, "apd90": 310.0},
            {"c": 1.0, "delta_apd90": [1.2, 2.0, 3.4]},
            {"c": 10.0}
        ]);
        assert_eq!(validate(ResultCommand::VoltageResults, &payload), Ok(()));
    }

    #[test]
    fn voltage_results_require_concentration() {
        let err = validate(ResultCommand::VoltageResults, &json!([{"apd90": 1.0}])).unwrap_err();
        assert_eq!(err, "'c' is a required property");
    }
}
