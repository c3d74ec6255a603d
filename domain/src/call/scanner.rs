//! Tool-call candidate extraction from free-form model output.
//!
//! Models wrap their JSON in prose, code fences and trailing commentary.
//! [`scan`] locates the outermost balanced `{ ... }` region, preferring
//! fenced blocks, and returns it as a borrowed slice of the input. `None`
//! means the response is a plain answer.

const FENCE: &str = "```";

/// Extract the candidate tool-call region from model text.
///
/// Search order:
/// 1. The whole (trimmed) text, if it already is one balanced object
/// 2. Each fenced code block, in order of appearance
/// 3. The full text
///
/// Re-scanning a returned candidate yields the same candidate.
pub fn scan(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{')
        && let Some(end) = matching_close(trimmed, 0)
        && end + 1 == trimmed.len()
        && looks_like_data(trimmed)
    {
        return Some(trimmed);
    }

    for block in fenced_blocks(text) {
        if let Some(candidate) = balanced_object(block) {
            return Some(candidate);
        }
    }

    balanced_object(text)
}

/// Bodies of ```` ``` ```` fenced blocks. The info string (`json`, `JSON`)
/// is skipped; an unterminated fence ends the search.
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let info_len = after_open
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(after_open.len());
        let body = &after_open[info_len..];
        let Some(close) = body.find(FENCE) else {
            break;
        };
        blocks.push(&body[..close]);
        rest = &body[close + FENCE.len()..];
    }

    blocks
}

/// First balanced object in `text` that looks like key/value data.
///
/// Regions without a `:` (`{placeholder}` in prose) are skipped, as are
/// openers that never close.
fn balanced_object(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = matching_close(text, start) {
            let region = &text[start..=end];
            if looks_like_data(region) {
                return Some(region);
            }
        }
        search_from = start + 1;
    }
    None
}

/// A balanced `{...}` region holding at least one `:`, or nothing at all.
fn looks_like_data(region: &str) -> bool {
    region.contains(':') || region[1..region.len() - 1].trim().is_empty()
}

/// Byte index of the `}` closing the `{` at `start`, ignoring braces inside
/// string literals.
fn matching_close(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALL: &str = r#"{"tool_name": "get_monitors", "arguments": {"groupStates": ["alert"]}}"#;

    #[test]
    fn test_plain_text_has_no_candidate() {
        assert_eq!(scan("Hello! How can I help you with Datadog today?"), None);
        assert_eq!(scan(""), None);
        assert_eq!(scan("Use {placeholder} syntax in templates."), None);
    }

    #[test]
    fn test_bare_placeholder_is_not_a_candidate() {
        assert_eq!(scan("{placeholder}"), None);
        assert_eq!(scan("  {placeholder}\n"), None);
        assert_eq!(scan("{}"), Some("{}"));
    }

    #[test]
    fn test_pure_json() {
        assert_eq!(scan(CALL), Some(CALL));
        assert_eq!(scan(&format!("  \n{}\n ", CALL)), Some(CALL));
    }

    #[test]
    fn test_fenced_block_with_prose() {
        let text = format!(
            "I'll fetch the alerting monitors.\n\n```json\n{}\n```\n\nLet me know if you need more.",
            CALL
        );
        assert_eq!(scan(&text), Some(CALL));
    }

    #[test]
    fn test_fence_without_language_tag() {
        let text = format!("```\n{}\n```", CALL);
        assert_eq!(scan(&text), Some(CALL));
    }

    #[test]
    fn test_single_line_fence() {
        let text = format!("Call: ```json {}``` done", CALL);
        assert_eq!(scan(&text), Some(CALL));
    }

    #[test]
    fn test_unfenced_json_inside_prose() {
        let text = format!("Sure, here is the call: {} and that should do it.", CALL);
        assert_eq!(scan(&text), Some(CALL));
    }

    #[test]
    fn test_fenced_block_preferred_over_earlier_braces() {
        let text = format!(
            "The format is {{\"a\": 1}} in general.\n```json\n{}\n```",
            CALL
        );
        assert_eq!(scan(&text), Some(CALL));
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let call = r#"{"tool_name": "get_monitors", "arguments": {"name": "cpu } {"}}"#;
        let text = format!("prefix {} suffix", call);
        assert_eq!(scan(&text), Some(call));
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let call = r#"{"tool_name": "get_monitors", "arguments": {"name": "say \"}\""}}"#;
        assert_eq!(scan(&format!("x {} y", call)), Some(call));
    }

    #[test]
    fn test_unclosed_opener_is_skipped() {
        let text = format!("broken {{ here, but then {}", CALL);
        assert_eq!(scan(&text), Some(CALL));
    }

    #[test]
    fn test_idempotent() {
        let texts = [
            format!("```json\n{}\n```", CALL),
            format!("Here: {} trailing", CALL),
            CALL.to_string(),
        ];
        for text in &texts {
            let first = scan(text).unwrap();
            assert_eq!(scan(first), Some(first));
        }
    }
}
