//! Lambda HTTP response builders.

use serde_json::{Value, json};

/// Returns a 200 OK response with a plain-text body.
#[must_use]
pub fn ok_text(text: &str) -> Value {
    json!({
        "statusCode": 200,
        "headers": { "Content-Type": "text/plain" },
        "body": text
    })
}

/// Returns a response with the given status code and JSON body.
#[must_use]
pub fn json_response(status_code: u16, body: &Value) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "Content-Type": "application/json" },
        "body": body.to_string()
    })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json_response(status_code, &json!({ "error": message }))
}
