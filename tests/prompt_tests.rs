use std::fs;
use std::path::Path;
use tldr_chat::ai::prompt::{build_reduce_input, chunk_placeholder, sanitize_model_input, system_prompt};
use tldr_chat::core::config::{AppConfig, Tuning, bot_id_from_token, normalize_username};

// Test to ensure the base prompt doesn't change during refactoring
#[test]
fn test_base_prompt_consistency() {
    let prompt_source_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("src")
        .join("ai")
        .join("prompt.rs");

    let prompt_source = fs::read_to_string(prompt_source_path)
        .expect("Should be able to read prompt.rs source file");

    assert!(
        prompt_source.contains("You are TLDR-bot"),
        "Missing core bot identity"
    );

    let prompt = system_prompt("Persian");
    assert!(prompt.starts_with("You are TLDR-bot"));
    assert!(prompt.contains("group chat conversations"), "Missing core purpose");
    assert!(prompt.contains("Write in Persian."), "Missing language instruction");
    assert!(prompt.contains("150 words"), "Missing length budget");
}

#[test]
fn test_reduce_input_lists_sections_before_partials() {
    let input = build_reduce_input("partial one\n\npartial two");
    let tldr = input.find("TL;DR").unwrap();
    let key_points = input.find("Key points").unwrap();
    let decisions = input.find("Decisions").unwrap();
    let partials = input.find("partial one").unwrap();

    assert!(tldr < key_points && key_points < decisions && decisions < partials);
    assert!(input.ends_with("partial two"));
}

#[test]
fn test_chunk_placeholder_is_one_based() {
    assert_eq!(chunk_placeholder(1), "(part 1 could not be summarized)");
}

#[test]
fn test_sanitize_keeps_newlines_drops_controls() {
    assert_eq!(sanitize_model_input("a\u{0000}b\nc\td\u{001b}"), "ab\nc\td");
}

#[test]
fn test_username_normalization() {
    assert_eq!(normalize_username(" @TldrBot "), "tldrbot");
    assert_eq!(normalize_username(""), "");
}

#[test]
fn test_bot_id_comes_from_token_prefix() {
    assert_eq!(bot_id_from_token("123456:ABC-def"), "123456");
    assert_eq!(bot_id_from_token("no-colon"), "");
    assert_eq!(bot_id_from_token("abc:def"), "");
    assert_eq!(bot_id_from_token(":def"), "");
}

#[test]
fn test_default_tuning_uses_transport_limits() {
    use tldr_chat::summarize::chunker::DEFAULT_CHUNK_MAX_CHARS;
    use tldr_chat::utils::formatter::DEFAULT_SEGMENT_LIMIT;

    let tuning = Tuning::default();
    assert_eq!(tuning.chunk_max_chars, DEFAULT_CHUNK_MAX_CHARS);
    assert_eq!(tuning.segment_limit, DEFAULT_SEGMENT_LIMIT);
}

#[test]
fn test_database_url() {
    let mut config = AppConfig {
        bot_token: String::new(),
        bot_id: String::new(),
        hf_api_key: String::new(),
        model_id: String::new(),
        bot_username: String::new(),
        db_path: "/tmp/messages.db".to_string(),
        cleanup_days: 30,
        inference_base_url: String::new(),
        telegram_api_base: String::new(),
        webhook_secret: None,
        summary_language: "English".to_string(),
        tuning: Tuning::default(),
    };
    assert_eq!(config.database_url(), "sqlite:///tmp/messages.db");

    config.db_path = "sqlite::memory:".to_string();
    assert_eq!(config.database_url(), "sqlite::memory:");
}
