use serde_json::Value;

/// Pretty-prints a JSON value with two-space indentation.
///
/// Serialization of a `serde_json::Value` is not expected to fail, but this
/// function never panics regardless: if serialization fails and the value is
/// already a JSON string, its content is returned unchanged; for any other
/// unserializable value an empty string is returned.
///
/// Returns:
/// - `String`: The pretty-printed document, in all cases.
pub fn format_json(value: &Value) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(text) => text,
        Err(_) => match value {
            Value::String(text) => text.clone(),
            _ => String::new(),
        },
    }
}

/// Attempts a strict JSON parse, returning `None` on any malformed input.
///
/// Used to distinguish "the webhook returned JSON" from "the webhook returned
/// plain text or HTML" without surfacing a parse error to the caller.
pub fn parse_json_safely(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}
