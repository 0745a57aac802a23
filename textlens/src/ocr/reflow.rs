/// Lines shorter than this are treated as the end of a paragraph.
const SHORT_LINE_CHARS: usize = 50;

/// Rebuild paragraphs from raw line-per-line engine output.
///
/// Lines are whitespace-normalized and joined with single spaces. A
/// paragraph ends at a blank line, after a short line, a line ending in
/// `.`, `!` or `?`, or an all-caps line (likely a heading). Paragraphs are
/// separated by a blank line.
pub fn reflow_paragraphs(raw: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in raw.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
            continue;
        }

        let ends_paragraph = !current.is_empty() && is_paragraph_end(&line);
        current.push(line);
        if ends_paragraph {
            paragraphs.push(current.join(" "));
            current.clear();
        }
    }

    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs.join("\n\n")
}

fn is_paragraph_end(line: &str) -> bool {
    line.chars().count() < SHORT_LINE_CHARS
        || line.ends_with(['.', '!', '?'])
        || is_all_caps(line)
}

fn is_all_caps(line: &str) -> bool {
    line.chars().any(char::is_alphabetic) && !line.chars().any(char::is_lowercase)
}

/// Split text into paragraphs on blank lines.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_line_is_untouched() {
        assert_eq!(reflow_paragraphs("HELLO WORLD"), "HELLO WORLD");
        assert_eq!(reflow_paragraphs("HELLO WORLD\n"), "HELLO WORLD");
    }

    #[test]
    fn test_wrapped_lines_join_into_one_paragraph() {
        let raw = "The quick brown fox jumps over the lazy dog and then\n\
                   keeps running through the forest until it reaches the\n\
                   river bank.\n";
        assert_eq!(
            reflow_paragraphs(raw),
            "The quick brown fox jumps over the lazy dog and then keeps running \
             through the forest until it reaches the river bank."
        );
    }

    #[test]
    fn test_sentence_end_starts_new_paragraph() {
        let raw = "First paragraph line one that is long enough to wrap over\n\
                   and finishes here.\n\
                   Second paragraph starts with a fairly long line of words\n\
                   and also ends.";
        let reflowed = reflow_paragraphs(raw);
        assert_eq!(split_paragraphs(&reflowed).len(), 2);
        assert!(reflowed.starts_with("First paragraph"));
        assert!(reflowed.contains("ends here.") || reflowed.contains("finishes here."));
    }

    #[test]
    fn test_blank_line_always_ends_paragraph() {
        let raw = "a line that is long enough to keep going past the limit of\n\
                   \n\
                   the next paragraph that the engine already separated";
        assert_eq!(split_paragraphs(&reflow_paragraphs(raw)).len(), 2);
    }

    #[test]
    fn test_whitespace_is_normalized() {
        assert_eq!(reflow_paragraphs("  a   b  \n\n\n"), "a b");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(reflow_paragraphs(""), "");
        assert_eq!(reflow_paragraphs("\n \n"), "");
    }

    #[test]
    fn test_split_paragraphs_drops_blanks() {
        assert_eq!(
            split_paragraphs("one\n\n\n\ntwo\n\n  "),
            vec!["one".to_string(), "two".to_string()]
        );
    }
}
