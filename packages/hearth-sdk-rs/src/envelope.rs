//! Response envelope handling.
//!
//! The service answers `{ "message", "result" }`; older deployments answer
//! `{ "data" }` or a bare payload. Errors carry their text in
//! `error.message`, `message` or a plain `error` string.

use reqwest::StatusCode;
use serde_json::Value;

/// Extract the payload of a success body.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) => {
            if let Some(result) = map.remove("result") {
                return result;
            }
            if let Some(data) = map.remove("data") {
                return data;
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Best-effort human message for a failed response.
pub fn error_message(status: StatusCode, body: Option<&Value>) -> String {
    let from_body = body.and_then(|b| {
        b.pointer("/error/message")
            .and_then(Value::as_str)
            .or_else(|| b.get("message").and_then(Value::as_str))
            .or_else(|| b.get("error").and_then(Value::as_str))
    });

    match from_body {
        Some(msg) => msg.to_owned(),
        None => status
            .canonical_reason()
            .map(str::to_owned)
            .unwrap_or_else(|| status.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_prefers_result_then_data() {
        assert_eq!(unwrap_envelope(json!({ "message": "ok", "result": [1] })), json!([1]));
        assert_eq!(unwrap_envelope(json!({ "data": { "id": "x" } })), json!({ "id": "x" }));
        assert_eq!(unwrap_envelope(json!([{ "id": "x" }])), json!([{ "id": "x" }]));
        assert_eq!(unwrap_envelope(json!({ "id": "x" })), json!({ "id": "x" }));
    }

    #[test]
    fn test_error_message_order() {
        let nested = json!({ "error": { "message": "Member is blocked" }, "message": "outer" });
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, Some(&nested)),
            "Member is blocked"
        );

        let flat = json!({ "message": "Not allowed", "error": "nope" });
        assert_eq!(error_message(StatusCode::FORBIDDEN, Some(&flat)), "Not allowed");

        let plain = json!({ "error": "nope" });
        assert_eq!(error_message(StatusCode::FORBIDDEN, Some(&plain)), "nope");

        assert_eq!(error_message(StatusCode::NOT_FOUND, None), "Not Found");
    }
}
