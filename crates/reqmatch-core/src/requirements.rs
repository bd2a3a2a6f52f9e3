/// Line separators recognised when splitting extracted text.
///
/// Besides `\n` and `\r`, PDF text extraction occasionally emits vertical
/// tab, form feed, the ASCII file/group/record separators, NEL and the
/// Unicode line/paragraph separators at page or block boundaries.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split document text into requirements: one per non-blank line, trimmed.
///
/// Order and duplicates are preserved. A `\r\n` pair yields an empty piece
/// between the two breaks, which is dropped like any other blank line.
pub fn extract_requirements(text: &str) -> Vec<String> {
    text.split(is_line_break)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_trims_and_drops_blank_lines() {
        let reqs = extract_requirements("Req A\nReq B\n\nReq A\n");
        assert_eq!(reqs, vec!["Req A", "Req B", "Req A"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(extract_requirements("").is_empty());
        assert!(extract_requirements("\n\n   \n\t\n").is_empty());
    }

    #[test]
    fn handles_crlf_and_lone_cr() {
        let reqs = extract_requirements("one\r\ntwo\rthree\n");
        assert_eq!(reqs, vec!["one", "two", "three"]);
    }

    #[test]
    fn form_feed_separates_pages() {
        let reqs = extract_requirements("last line of page 1\x0cfirst line of page 2");
        assert_eq!(reqs, vec!["last line of page 1", "first line of page 2"]);
    }

    #[test]
    fn inner_whitespace_is_kept() {
        let reqs = extract_requirements("   The system  shall log.  \n");
        assert_eq!(reqs, vec!["The system  shall log."]);
    }

    #[test]
    fn deterministic_and_never_empty() {
        let text = "  a \n\n b\r\n\u{2028}c\u{85} \u{2029}a";
        let first = extract_requirements(text);
        let second = extract_requirements(text);
        assert_eq!(first, second);
        assert_eq!(first, vec!["a", "b", "c", "a"]);
        assert!(first.iter().all(|r| !r.trim().is_empty()));
    }
}
