mod common;

use common::{BOT_USERNAME, ScriptedBackend, bot_with, event, reply_to_author, reply_to_bot};
use tldr_chat::bot::{CANONICAL_FAILURE_MESSAGE, START_MESSAGE, help_message};
use tldr_chat::core::models::{ChatType, Formatting};
use tldr_chat::core::router::Command;
use tldr_chat::errors::ServiceError;

#[tokio::test]
async fn test_group_chatter_is_stored_but_not_answered() {
    let (bot, sink) = bot_with(ScriptedBackend::echo(), 4000).await;

    let command = bot
        .handle_event(&event(ChatType::Group, 1, "lunch at noon?"))
        .await;

    assert_eq!(command, Command::None);
    assert!(sink.sent().is_empty());
    assert_eq!(bot.store().count("-100").await, 1);
}

#[tokio::test]
async fn test_bot_authored_messages_are_not_stored() {
    let (bot, _sink) = bot_with(ScriptedBackend::echo(), 4000).await;

    let mut from_bot = event(ChatType::Group, 1, "I am a bot");
    from_bot.is_bot_sender = true;
    bot.handle_event(&from_bot).await;

    assert_eq!(bot.store().count("-100").await, 0);
}

#[tokio::test]
async fn test_blank_text_is_ignored() {
    let (bot, sink) = bot_with(ScriptedBackend::echo(), 4000).await;

    let command = bot.handle_event(&event(ChatType::Private, 1, "   ")).await;

    assert_eq!(command, Command::None);
    assert!(sink.sent().is_empty());
    assert_eq!(bot.store().count("-100").await, 0);
}

#[tokio::test]
async fn test_private_unknown_text_gets_help() {
    let (bot, sink) = bot_with(ScriptedBackend::echo(), 4000).await;

    bot.handle_event(&event(ChatType::Private, 1, "hi there")).await;

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, help_message(BOT_USERNAME));
    assert_eq!(sent[0].formatting, Formatting::MarkdownV2);
}

#[test]
fn test_help_message_escapes_username() {
    let help = help_message("tl_dr_bot");
    assert!(help.contains("@tl\\_dr\\_bot"));
    assert!(!help_message("").contains('@'));
}

#[tokio::test]
async fn test_utility_commands_reply() {
    let (bot, sink) = bot_with(ScriptedBackend::echo(), 4000).await;

    bot.handle_event(&event(ChatType::Private, 1, "/start")).await;
    bot.handle_event(&event(ChatType::Group, 2, "/ping")).await;
    bot.handle_event(&event(ChatType::Group, 3, "/count")).await;

    let texts: Vec<String> = sink.sent().into_iter().map(|r| r.text).collect();
    assert_eq!(texts[0], START_MESSAGE);
    assert_eq!(texts[1], "pong");
    // The commands themselves are part of the log.
    assert_eq!(texts[2], "*Stored messages:* `3`");
}

#[tokio::test]
async fn test_clear_removes_history() {
    let (bot, sink) = bot_with(ScriptedBackend::echo(), 4000).await;

    bot.handle_event(&event(ChatType::Private, 1, "note to self")).await;
    bot.handle_event(&event(ChatType::Private, 2, "/clear")).await;

    assert_eq!(bot.store().count("-100").await, 0);
    assert_eq!(sink.sent().last().unwrap().text, "History cleared.");
}

#[tokio::test]
async fn test_summary_in_group_replies_to_request() {
    let backend = ScriptedBackend::echo();
    let (bot, sink) = bot_with(backend.clone(), 4000).await;

    bot.handle_event(&event(ChatType::Group, 1, "we ship on friday")).await;
    bot.handle_event(&event(ChatType::Group, 2, "QA signs off thursday")).await;
    let command = bot
        .handle_event(&reply_to_bot(event(ChatType::Group, 3, "last 2")))
        .await;

    assert_eq!(command, Command::Summarize(2));

    let sent = sink.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].formatting, Formatting::MarkdownV2);
    assert!(sent[0].text.contains("*2*"));
    assert_eq!(sent[1].formatting, Formatting::Plain);
    assert_eq!(sent[1].reply_to_message_id, Some(3));
    assert!(sent[1].text.starts_with("FINAL"));

    // The request itself is the newest stored message.
    assert_eq!(backend.inputs()[0].0, "QA signs off thursday\nlast 2");
}

#[tokio::test]
async fn test_reply_to_another_bot_stays_silent() {
    let backend = ScriptedBackend::echo();
    let (bot, sink) = bot_with(backend.clone(), 4000).await;

    let command = bot
        .handle_event(&reply_to_author(event(ChatType::Group, 1, "last 5"), "424242", true))
        .await;

    assert_eq!(command, Command::None);
    assert!(sink.sent().is_empty());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_reply_to_a_human_stays_silent() {
    let (bot, sink) = bot_with(ScriptedBackend::echo(), 4000).await;

    let command = bot
        .handle_event(&reply_to_author(event(ChatType::Group, 1, "last 5"), "999", false))
        .await;

    assert_eq!(command, Command::None);
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn test_private_summary_is_not_threaded() {
    let (bot, sink) = bot_with(ScriptedBackend::echo(), 4000).await;

    bot.handle_event(&event(ChatType::Private, 1, "/last 10")).await;

    let sent = sink.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].reply_to_message_id, None);
}

#[tokio::test]
async fn test_auth_failure_sends_canonical_message() {
    let backend = ScriptedBackend::new(|_, _| Err(ServiceError::auth("invalid token")));
    let (bot, sink) = bot_with(backend.clone(), 4000).await;

    bot.handle_event(&event(ChatType::Private, 1, "/last 5")).await;

    assert_eq!(sink.sent().last().unwrap().text, CANONICAL_FAILURE_MESSAGE);
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_long_summary_is_delivered_in_segments() {
    let long = "word ".repeat(100);
    let backend = ScriptedBackend::new(move |_, _| Ok(long.clone()));
    let (bot, sink) = bot_with(backend, 50).await;

    bot.handle_event(&event(ChatType::Private, 1, "/last 1")).await;

    let segments: Vec<_> = sink.sent().into_iter().skip(1).collect();
    assert!(segments.len() > 1);
    for segment in &segments {
        assert!(segment.text.chars().count() <= 50);
        assert_eq!(segment.formatting, Formatting::Plain);
    }
}

#[tokio::test]
async fn test_health_reports_closed_store() {
    let (bot, _sink) = bot_with(ScriptedBackend::echo(), 4000).await;
    assert!(bot.health().await.is_ok());

    bot.shutdown().await;
    assert!(bot.health().await.is_err());
}
