//! Helpers for the Ap Predict response envelope.
//!
//! Every engine response is a JSON object carrying either a `success`
//! value or an `error` message; HTTP status codes carry no meaning. The
//! helpers here pull the interesting part out of a parsed body without
//! assuming which shape arrived.

use serde_json::Value;

/// The message under the `error` key, if the envelope carries one.
///
/// String errors come back verbatim; any other JSON error value is
/// rendered as compact JSON.
pub fn error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    Some(match error.as_str() {
        Some(s) => s.to_string(),
        None => error.to_string(),
    })
}

/// The payload under the `success` key, if present.
pub fn success_value(body: &Value) -> Option<&Value> {
    body.get("success")
}

/// The run id under `success.id`.
///
/// The engine returns the id as a string; a non-string id is treated as
/// absent.
pub fn launch_id(body: &Value) -> Option<String> {
    body.get("success")?.get("id")?.as_str().map(str::to_string)
}

/// The most recent progress label: the last non-empty string in the
/// `success` array.
pub fn latest_progress(body: &Value) -> Option<String> {
    let labels = body.get("success")?.as_array()?;
    labels
        .iter()
        .rev()
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
        .map(str::to_string)
}

/// Whether a STOP response confirms the run has halted.
pub fn stop_confirmed(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_message_from_string() {
        let body = json!({"error": "some error message"});
        assert_eq!(error_message(&body).as_deref(), Some("some error message"));
    }

    #[test]
    fn error_message_from_non_string() {
        let body = json!({"error": {"code": 7}});
        assert_eq!(error_message(&body).as_deref(), Some(r#"{"code":7}"#));
    }

    #[test]
    fn error_message_absent() {
        assert_eq!(error_message(&json!({"success": true})), None);
    }

    #[test]
    fn launch_id_present() {
        let body = json!({"success": {"id": "11a66c9f-52b0-4b4c-8daf-c9d4f38d7ac6"}});
        assert_eq!(
            launch_id(&body).as_deref(),
            Some("11a66c9f-52b0-4b4c-8daf-c9d4f38d7ac6")
        );
    }

    #[test]
    fn launch_id_missing_or_non_string() {
        assert_eq!(launch_id(&json!({"success": {}})), None);
        assert_eq!(launch_id(&json!({"success": {"id": 42}})), None);
        assert_eq!(launch_id(&json!({})), None);
    }

    #[test]
    fn latest_progress_takes_last_non_empty() {
        let body = json!({"success": ["Initialising..", "5% completed", ""]});
        assert_eq!(latest_progress(&body).as_deref(), Some("5% completed"));
    }

    #[test]
    fn latest_progress_skips_non_strings() {
        let body = json!({"success": ["Initialising..", null, 3]});
        assert_eq!(latest_progress(&body).as_deref(), Some("Initialising.."));
    }

    #[test]
    fn latest_progress_empty_or_missing() {
        assert_eq!(latest_progress(&json!({"success": []})), None);
        assert_eq!(latest_progress(&json!({"success": "oops"})), None);
        assert_eq!(latest_progress(&json!({})), None);
    }

    #[test]
    fn stop_confirmation() {
        assert!(stop_confirmed(&json!({"success": true})));
        assert!(!stop_confirmed(&json!({"success": false})));
        assert!(!stop_confirmed(&json!({"success": "yes"})));
        assert!(!stop_confirmed(&json!({})));
    }
}
