//! Shared utility functions.

use std::borrow::Cow;

/// Single-line preview of `s` for log output, at most `max_bytes` long
/// plus an ellipsis, never splitting a UTF-8 character.
pub fn preview(s: &str, max_bytes: usize) -> Cow<'_, str> {
    let flat: Cow<'_, str> = if s.contains(['\n', '\r']) {
        Cow::Owned(s.replace("\r\n", " ").replace(['\n', '\r'], " "))
    } else {
        Cow::Borrowed(s)
    };
    if flat.len() <= max_bytes {
        return flat;
    }
    let mut end = max_bytes;
    while end > 0 && !flat.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}...", &flat[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_short_is_borrowed() {
        assert!(matches!(preview("hi", 10), Cow::Borrowed("hi")));
    }

    #[test]
    fn preview_truncates_ascii() {
        assert_eq!(preview("hello world", 5), "hello...");
    }

    #[test]
    fn preview_flattens_newlines() {
        assert_eq!(preview("a\nb\r\nc", 20), "a b c");
    }

    #[test]
    fn preview_multibyte_boundary() {
        // 'の' is 3 bytes; cutting at 4 backs up to 3
        assert_eq!(preview("あのね", 4), "あ...");
        assert_eq!(preview("あのね", 9), "あのね");
    }
}
