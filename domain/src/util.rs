//! Small text utilities.

/// Split `text` into chunks of at most `max_bytes` bytes without ever
/// splitting a multi-byte codepoint.
///
/// Each chunk boundary is snapped back to the nearest character boundary,
/// so every chunk is valid UTF-8 and concatenating the chunks reproduces
/// the input exactly. ASCII input yields chunks of exactly `max_bytes`
/// (except the last).
pub fn chunk_text(text: &str, max_bytes: usize) -> Vec<&str> {
    assert!(max_bytes > 0, "chunk size must be positive");

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_bytes).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        // A single codepoint wider than max_bytes still advances
        if end == start {
            end = start + 1;
            while end < text.len() && !text.is_char_boundary(end) {
                end += 1;
            }
        }
        chunks.push(&text[start..end]);
        start = end;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_chunk_sizes() {
        let text = "a".repeat(237);
        let chunks = chunk_text(&text, 50);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![50, 50, 50, 50, 37]);
    }

    #[test]
    fn test_round_trip() {
        let text = "héllo wörld — ensemble ответ 思考の連鎖 🚀".repeat(7);
        let chunks = chunk_text(&text, 50);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_never_splits_codepoints() {
        let text = "日本語のテキストです。".repeat(20);
        for chunk in chunk_text(&text, 50) {
            assert!(chunk.len() <= 50);
            // Slicing already panics on invalid boundaries; spell it out anyway
            assert!(std::str::from_utf8(chunk.as_bytes()).is_ok());
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(chunk_text("", 50).is_empty());
    }

    #[test]
    fn test_short_input_single_chunk() {
        assert_eq!(chunk_text("short", 50), vec!["short"]);
    }
}
