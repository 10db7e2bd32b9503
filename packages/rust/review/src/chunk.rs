//! Document chunking: paragraph-aware splitting with a hard size cap.
//!
//! Sizes are counted in Unicode scalar values so hard splits never land
//! inside a multi-byte character.

/// Paragraph-joining delimiter: blank line.
const SEPARATOR: &str = "\n\n";

/// Split `text` into ordered chunks of at most `max_chars` characters.
///
/// Short documents come back as a single chunk. Longer ones are split on
/// blank-line paragraph boundaries, greedily packing consecutive
/// paragraphs; a single paragraph larger than `max_chars` is force-split
/// into fixed-size slices emitted as standalone chunks. Empty paragraphs
/// are dropped and no emitted chunk is empty. Concatenating the output
/// (modulo the re-inserted separators) reproduces the input content.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    assert!(max_chars > 0, "max_chars must be positive");

    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let sep_len = SEPARATOR.chars().count();
    let mut out: Vec<String> = Vec::new();
    let mut buf: Vec<&str> = Vec::new();
    let mut size = 0usize;

    for part in text.split(SEPARATOR) {
        if part.is_empty() {
            continue;
        }
        let part_len = part.chars().count();
        let sep = if buf.is_empty() { 0 } else { sep_len };

        if size + sep + part_len <= max_chars {
            buf.push(part);
            size += sep + part_len;
            continue;
        }

        if !buf.is_empty() {
            out.push(buf.join(SEPARATOR));
            buf.clear();
            size = 0;
        }

        if part_len <= max_chars {
            buf.push(part);
            size = part_len;
            continue;
        }

        // Oversized atomic paragraph: emit fixed-size slices standalone,
        // never merged with buffered content.
        hard_split_into(part, max_chars, &mut out);
    }

    if !buf.is_empty() {
        out.push(buf.join(SEPARATOR));
    }

    out
}

/// Append `max_chars`-sized slices of `part` to `out`; the last slice may
/// be shorter.
fn hard_split_into(part: &str, max_chars: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut count = 0usize;
    for ch in part.chars() {
        current.push(ch);
        count += 1;
        if count == max_chars {
            out.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_single_chunk() {
        assert_eq!(split_chunks("hello", 100), vec!["hello"]);
    }

    #[test]
    fn exact_fit_is_single_chunk() {
        assert_eq!(split_chunks("abc", 3), vec!["abc"]);
    }

    #[test]
    fn paragraphs_pack_greedily() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        let chunks = split_chunks(text, 10);
        assert_eq!(chunks, vec!["aaaa\n\nbbbb", "cccc"]);
    }

    #[test]
    fn separator_counted_only_with_nonempty_buffer() {
        // "aa" + sep(2) + "bb" = 6 fits exactly
        let text = "aa\n\nbb\n\nccccc";
        let chunks = split_chunks(text, 6);
        assert_eq!(chunks, vec!["aa\n\nbb", "ccccc"]);
    }

    #[test]
    fn oversized_paragraph_hard_splits() {
        let chunks = split_chunks("abcdef", 3);
        assert_eq!(chunks, vec!["abc", "def"]);
    }

    #[test]
    fn hard_split_remainder_is_shorter() {
        let chunks = split_chunks("abcdefg", 3);
        assert_eq!(chunks, vec!["abc", "def", "g"]);
    }

    #[test]
    fn oversized_paragraph_not_merged_with_buffer() {
        let text = "aa\n\nbbbbbbbb\n\ncc";
        let chunks = split_chunks(text, 5);
        assert_eq!(chunks, vec!["aa", "bbbbb", "bbb", "cc"]);
    }

    #[test]
    fn empty_paragraphs_dropped() {
        let text = "aaaa\n\n\n\nbbbb";
        // "\n\n\n\n" splits into ["aaaa", "", "bbbb"]; the empty part is
        // skipped and the neighbors pack together.
        let chunks = split_chunks(text, 10);
        assert_eq!(chunks, vec!["aaaa\n\nbbbb"]);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn multibyte_hard_split_is_char_safe() {
        let text = "日本語のテキスト";
        let chunks = split_chunks(text, 3);
        assert_eq!(chunks, vec!["日本語", "のテキ", "スト"]);
    }

    #[test]
    fn concatenation_reproduces_content() {
        let docs = [
            "aaaa\n\nbbbb\n\ncccc",
            "abcdefghij",
            "a\n\nbbbbbbbbbbbbbbbb\n\nc",
            "日本語\n\nテキストです",
        ];
        for doc in docs {
            for max in [1usize, 2, 3, 5, 8, 100] {
                let chunks = split_chunks(doc, max);
                // Ignoring separators on both sides, no content is lost.
                let joined = chunks.concat().replace(SEPARATOR, "");
                let original = doc.replace(SEPARATOR, "");
                assert_eq!(joined, original, "doc={doc:?} max={max}");
                for chunk in &chunks {
                    assert!(chunk.chars().count() <= max, "doc={doc:?} max={max}");
                }
            }
        }
    }

    #[test]
    fn every_chunk_within_bound() {
        let doc = "para one is short\n\n".repeat(20) + &"x".repeat(50);
        for max in [7usize, 10, 25, 64] {
            for chunk in split_chunks(&doc, max) {
                assert!(chunk.chars().count() <= max);
            }
        }
    }
}
