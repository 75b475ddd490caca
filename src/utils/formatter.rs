//! Output formatting: splitting long replies into transport-sized segments
//! and escaping text for Telegram MarkdownV2.

/// Telegram rejects messages longer than 4096 characters; stay under it.
pub const DEFAULT_SEGMENT_LIMIT: usize = 4000;

const MARKDOWN_V2_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Split `text` into segments of at most `limit` characters.
///
/// Cuts prefer the last newline inside the window, then the last space, then
/// a hard cut at `limit`. Separators at a cut are dropped, as is surrounding
/// whitespace of the whole text; no segment is blank.
///
/// # Examples
///
/// ```
/// use tldr_chat::utils::formatter::split_message;
///
/// let parts = split_message("alpha beta\ngamma", 12);
/// assert_eq!(parts, vec!["alpha beta", "gamma"]);
/// ```
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut segments = Vec::new();
    let mut rest = text.trim();

    while rest.chars().count() > limit {
        let window_end = rest
            .char_indices()
            .nth(limit)
            .map_or(rest.len(), |(idx, _)| idx);
        let window = &rest[..window_end];
        let cut = window
            .rfind('\n')
            .filter(|&idx| idx > 0)
            .or_else(|| window.rfind(' ').filter(|&idx| idx > 0))
            .unwrap_or(window_end);

        let segment = &rest[..cut];
        if !segment.trim().is_empty() {
            segments.push(segment.to_string());
        }
        rest = rest[cut..].trim_start_matches(['\n', ' ']);
    }

    if !rest.trim().is_empty() {
        segments.push(rest.to_string());
    }
    segments
}

/// Escape every MarkdownV2 special character so `text` renders literally.
#[must_use]
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
