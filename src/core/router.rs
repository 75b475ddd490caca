//! Command routing for inbound chat text.
//!
//! `route` is pure: it looks only at the chat type, the text, the bot's own
//! username and whether the event replies to the bot. Group chats never get a
//! reply unless the text is addressed to the bot.

use once_cell::sync::Lazy;
use regex::Regex;

use super::models::ChatType;

pub const MIN_COUNT: u32 = 1;
pub const MAX_COUNT: u32 = 2000;

/// Keywords accepted as "last" in bare (slash-less) requests.
pub const LAST_KEYWORDS: [&str; 2] = ["last", "آخرین"];

static LAST_CMD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^/last(?:@(\w+))?(?:\s+(\S+))?(?:\s|$)").expect("static regex compile")
});

static BARE_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^(?:{})\s+(\S+)", keyword_alternation())).expect("static regex compile")
});

static BARE_ANYWHERE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)(?:^|[^\w])(?:{})\s+(\S+)", keyword_alternation()))
        .expect("static regex compile")
});

fn keyword_alternation() -> String {
    LAST_KEYWORDS
        .iter()
        .copied()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|")
}

static CLEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^/clear\b").expect("static regex compile"));

/// Parsed intent of one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Count,
    Clear,
    Summarize(u32),
    Ping,
    None,
}

/// Classify `text` into a `Command`. First matching rule wins.
#[must_use]
pub fn route(chat_type: ChatType, text: &str, bot_username: &str, is_reply_to_bot: bool) -> Command {
    let text = text.trim();
    let lower = text.to_lowercase();
    let private = chat_type == ChatType::Private;

    if lower.starts_with("/ping") {
        return Command::Ping;
    }
    if lower.starts_with("/count") {
        return Command::Count;
    }
    if private && text.starts_with("/start") {
        return Command::Start;
    }
    if private && CLEAR_RE.is_match(text) {
        return Command::Clear;
    }

    if let Some(caps) = LAST_CMD_RE.captures(text) {
        let addressed_here = caps
            .get(1)
            .is_none_or(|m| bot_username.is_empty() || m.as_str().eq_ignore_ascii_case(bot_username));
        if addressed_here {
            return Command::Summarize(clamp_count(caps.get(2).map(|m| m.as_str())));
        }
    }

    if chat_type.is_group() {
        if mentions_bot(&lower, bot_username)
            && let Some(caps) = BARE_ANYWHERE_RE.captures(text)
        {
            return Command::Summarize(clamp_count(caps.get(1).map(|m| m.as_str())));
        }
        if is_reply_to_bot && let Some(caps) = BARE_START_RE.captures(text) {
            return Command::Summarize(clamp_count(caps.get(1).map(|m| m.as_str())));
        }
        return Command::None;
    }

    if private && let Some(caps) = BARE_START_RE.captures(text) {
        return Command::Summarize(clamp_count(caps.get(1).map(|m| m.as_str())));
    }

    Command::None
}

/// Parse a requested message count and clamp it to `[MIN_COUNT, MAX_COUNT]`.
///
/// Only the leading run of digits counts; ASCII, Persian and Arabic-Indic
/// digits are accepted. Anything else falls back to `MIN_COUNT`.
#[must_use]
pub fn clamp_count(raw: Option<&str>) -> u32 {
    let digits: String = raw
        .unwrap_or_default()
        .chars()
        .map_while(ascii_digit)
        .collect();
    if digits.is_empty() {
        return MIN_COUNT;
    }
    match digits.parse::<u64>() {
        Ok(value) => value.clamp(u64::from(MIN_COUNT), u64::from(MAX_COUNT)) as u32,
        // Only overflow can fail here.
        Err(_) => MAX_COUNT,
    }
}

fn ascii_digit(c: char) -> Option<char> {
    let zero = match c {
        '0'..='9' => return Some(c),
        '\u{06F0}'..='\u{06F9}' => '\u{06F0}',
        '\u{0660}'..='\u{0669}' => '\u{0660}',
        _ => return None,
    };
    char::from_digit(c as u32 - zero as u32, 10)
}

/// `@username` present as a whole mention, not as the prefix of a longer handle.
fn mentions_bot(lower_text: &str, bot_username: &str) -> bool {
    if bot_username.is_empty() {
        return false;
    }
    let needle = format!("@{}", bot_username.to_lowercase());
    lower_text.match_indices(&needle).any(|(idx, _)| {
        lower_text[idx + needle.len()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'))
    })
}
