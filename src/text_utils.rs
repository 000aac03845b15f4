//! Small text passes shared by the document model and the definition flow.

use unicode_normalization::UnicodeNormalization;

/// Words ending in these are mid-sentence even though they carry a period.
const ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "prof.", "sr.", "jr.", "st.", "vs.", "etc.", "e.g.", "i.e.",
];

/// Normalize to NFC with unix line endings.
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    unified.nfc().collect()
}

/// Collapse all whitespace runs into single spaces, trimming both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters, never splitting a codepoint.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Strip surrounding punctuation from a display token so lookups see the
/// bare word ("cats," -> "cats"). Interior punctuation stays ("don't").
pub fn trim_word(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Whether a word looks sentence-final, so utterance chunks prefer to break
/// after it.
pub fn ends_sentence(word: &str) -> bool {
    let trimmed = word.trim_end_matches(['"', '\'', ')', ']', '*']);
    if !trimmed.ends_with(['.', '!', '?']) {
        return false;
    }
    let lowered = trimmed.to_ascii_lowercase();
    !ABBREVIATIONS.contains(&lowered.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_line_endings() {
        assert_eq!(normalize("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn collapses_interior_whitespace() {
        assert_eq!(collapse_whitespace("  a \t b\n c  "), "a b c");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn trims_surrounding_punctuation_only() {
        assert_eq!(trim_word("cats,"), "cats");
        assert_eq!(trim_word("\"Hello!\""), "Hello");
        assert_eq!(trim_word("don't"), "don't");
        assert_eq!(trim_word("..."), "");
    }

    #[test]
    fn sentence_enders() {
        assert!(ends_sentence("done."));
        assert!(ends_sentence("really?\""));
        assert!(!ends_sentence("Dr."));
        assert!(!ends_sentence("plain"));
    }
}
