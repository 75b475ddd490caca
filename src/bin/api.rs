use std::sync::Arc;

use tldr_chat::api::function_handler;
use tldr_chat::bot::SummaryBot;
use tldr_chat::core::config::AppConfig;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    tldr_chat::setup_logging();

    let config = Arc::new(AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        lambda_runtime::Error::from(e)
    })?);
    let bot = Arc::new(SummaryBot::from_config(&config).await?);

    let handler_bot = Arc::clone(&bot);
    let result = lambda_runtime::run(lambda_runtime::service_fn(move |event| {
        let bot = Arc::clone(&handler_bot);
        let config = Arc::clone(&config);
        async move { function_handler(&bot, &config, event).await }
    }))
    .await;

    bot.shutdown().await;
    result
}
