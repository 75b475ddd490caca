//! Greedy, order-preserving grouping of message texts under a character budget.

pub const DEFAULT_CHUNK_MAX_CHARS: usize = 3500;

const SEPARATOR: &str = "\n";

/// Group `texts` into newline-joined chunks of at most `max_chars` characters.
///
/// Texts are trimmed and empties skipped. A text is never split: one longer
/// than `max_chars` becomes a chunk of its own.
///
/// # Examples
///
/// ```
/// use tldr_chat::summarize::chunker::chunk_texts;
///
/// let chunks = chunk_texts(["hello", "  ", "world", "again"], 11);
/// assert_eq!(chunks, vec!["hello\nworld", "again"]);
/// ```
pub fn chunk_texts<I, S>(texts: I, max_chars: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for text in texts {
        let text = text.as_ref().trim();
        if text.is_empty() {
            continue;
        }
        let text_chars = text.chars().count();
        let added = if current.is_empty() {
            text_chars
        } else {
            text_chars + SEPARATOR.len()
        };

        if current_chars + added > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if !current.is_empty() {
            current.push_str(SEPARATOR);
            current_chars += SEPARATOR.len();
        }
        current.push_str(text);
        current_chars += text_chars;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
