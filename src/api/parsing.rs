//! Request parsing: Lambda HTTP event fields and Telegram updates.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::core::models::{ChatType, InboundEvent, ReplyContext};
use crate::errors::BotError;

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// Telegram ids are integers; the store keys on strings.
fn v_id(root: &Value, path: &[&str]) -> Option<String> {
    v_path(root, path).and_then(|v| match v {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    })
}

pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// HTTP method of a Lambda HTTP event (API Gateway v1/v2 or function URL).
#[must_use]
pub fn request_method(payload: &Value) -> &str {
    v_str(payload, &["requestContext", "http", "method"])
        .or_else(|| v_str(payload, &["httpMethod"]))
        .unwrap_or("GET")
}

#[must_use]
pub fn request_path(payload: &Value) -> &str {
    v_str(payload, &["rawPath"])
        .or_else(|| v_str(payload, &["path"]))
        .unwrap_or("/")
}

/// Decoded request body, if any.
///
/// # Errors
///
/// Returns an error when a base64-flagged body does not decode to UTF-8 text.
pub fn request_body(payload: &Value) -> Result<Option<String>, BotError> {
    let Some(body) = v_str(payload, &["body"]) else {
        return Ok(None);
    };

    let encoded = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !encoded {
        return Ok(Some(body.to_string()));
    }

    let bytes = STANDARD
        .decode(body)
        .map_err(|e| BotError::ParseError(format!("Invalid base64 body: {e}")))?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| BotError::ParseError(format!("Body is not UTF-8: {e}")))
}

/// Normalize a Telegram `Update` into an `InboundEvent`.
///
/// Returns `None` for updates without a message, chat id or known chat type.
/// Text falls back to the media caption.
#[must_use]
pub fn parse_update(update: &Value) -> Option<InboundEvent> {
    let msg = update
        .get("message")
        .or_else(|| update.get("edited_message"))?;

    let chat_id = v_id(msg, &["chat", "id"])?;
    let chat_type = ChatType::from_telegram(v_str(msg, &["chat", "type"])?)?;
    let text = v_str(msg, &["text"])
        .or_else(|| v_str(msg, &["caption"]))
        .unwrap_or_default()
        .trim()
        .to_string();

    let reply_to = msg.get("reply_to_message").map(|reply| ReplyContext {
        from_id: v_id(reply, &["from", "id"]).unwrap_or_default(),
        is_bot: v_path(reply, &["from", "is_bot"])
            .and_then(Value::as_bool)
            .unwrap_or(false),
    });

    Some(InboundEvent {
        chat_id,
        chat_type,
        message_id: msg.get("message_id").and_then(Value::as_i64).unwrap_or(0),
        timestamp: msg.get("date").and_then(Value::as_i64).unwrap_or(0),
        from_id: v_id(msg, &["from", "id"]).unwrap_or_default(),
        is_bot_sender: v_path(msg, &["from", "is_bot"])
            .and_then(Value::as_bool)
            .unwrap_or(false),
        text,
        reply_to,
    })
}
