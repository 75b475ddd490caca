//! Webhook Lambda handler - thin HTTP router in front of the bot.
//!
//! Routes:
//! - `GET /` health check
//! - `GET /webhook` liveness text
//! - `POST /webhook` Telegram update delivery
//!
//! Telegram redelivers any update that does not get a 200, so once the secret
//! token is accepted every update is acknowledged, handled or not.

use super::{helpers, parsing, signature};
use crate::bot::SummaryBot;
use crate::core::config::AppConfig;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const WEBHOOK_PATH: &str = "/webhook";

/// Lambda handler for the webhook entrypoint.
///
/// # Errors
///
/// Never fails: every outcome is expressed as an HTTP response payload.
#[tracing::instrument(level = "info", skip_all, fields(correlation_id = tracing::field::Empty))]
pub async fn function_handler(
    bot: &SummaryBot,
    config: &AppConfig,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    let correlation_id = Uuid::new_v4().to_string();
    tracing::Span::current().record("correlation_id", correlation_id.as_str());

    let payload = &event.payload;
    let method = parsing::request_method(payload);
    let path = parsing::request_path(payload);
    info!(method = %method, raw_path = %path, "Webhook Lambda received request");

    let route = path.trim_end_matches('/');
    match (method, route) {
        ("GET", "") => Ok(handle_health(bot).await),
        ("GET", WEBHOOK_PATH) => Ok(helpers::ok_text("ok")),
        ("POST", WEBHOOK_PATH) => Ok(handle_update(bot, config, payload).await),
        _ => {
            warn!("No route for {} {}", method, path);
            Ok(helpers::err_response(404, "Not found"))
        }
    }
}

async fn handle_health(bot: &SummaryBot) -> Value {
    match bot.health().await {
        Ok(()) => helpers::json_response(200, &json!({ "status": "ok" })),
        Err(e) => {
            error!("Health check failed: {}", e);
            helpers::json_response(500, &json!({ "status": "error", "error": e.to_string() }))
        }
    }
}

async fn handle_update(bot: &SummaryBot, config: &AppConfig, payload: &Value) -> Value {
    if let Some(expected) = config.webhook_secret.as_deref() {
        let received = payload
            .get("headers")
            .and_then(|headers| parsing::get_header_value(headers, signature::SECRET_HEADER))
            .unwrap_or("");
        if !signature::verify_webhook_secret(received, expected) {
            return helpers::err_response(401, "Invalid secret token");
        }
    }

    let body = match parsing::request_body(payload) {
        Ok(Some(body)) => body,
        Ok(None) => {
            warn!("Webhook request without body");
            return helpers::ok_text("ok");
        }
        Err(e) => {
            error!("Failed to read webhook body: {}", e);
            return helpers::ok_text("ok");
        }
    };

    let update: Value = match serde_json::from_str(&body) {
        Ok(update) => update,
        Err(e) => {
            error!("Webhook body is not JSON: {}", e);
            return helpers::ok_text("ok");
        }
    };

    match parsing::parse_update(&update) {
        Some(inbound) => {
            let command = bot.handle_event(&inbound).await;
            debug!("Update handled as {:?}", command);
        }
        None => debug!("Ignoring update without a usable message"),
    }

    helpers::ok_text("ok")
}
