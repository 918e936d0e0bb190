//! Pure text helpers shared by extractors and the delivery formatter.

/// Collapse every run of whitespace (including newlines and tabs) into a
/// single space and trim both ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `max_chars` characters, never splitting a UTF-8
/// code point. The flag reports whether anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// `clean_text`, mapping an empty result to `fallback`.
pub fn clean_or(text: &str, fallback: &str) -> String {
    let cleaned = clean_text(text);
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Senior \n\t Rust   Engineer  "), "Senior Rust Engineer");
        assert_eq!(clean_text("\n \t"), "");
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_chars("short", 200), ("short", false));
    }

    #[test]
    fn test_truncate_exact_length_not_cut() {
        let text = "a".repeat(200);
        let (cut, truncated) = truncate_chars(&text, 200);
        assert_eq!(cut.len(), 200);
        assert!(!truncated);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(5);
        let (cut, truncated) = truncate_chars(&text, 3);
        assert_eq!(cut, "ééé");
        assert!(truncated);
    }

    #[test]
    fn test_clean_or_fallback() {
        assert_eq!(clean_or("   ", "Remote"), "Remote");
        assert_eq!(clean_or(" Berlin ", "Remote"), "Berlin");
    }
}
