//! Text normalizations applied between extraction and write-back.
//!
//! Each is a plain `&str -> String` transform. Matches are found in the text
//! with markers removed and markers are kept in place, so marked and plain
//! text stay in agreement when both are normalized.

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::markers::{Segment, strip_markers, tokenize};

static DASH_BETWEEN_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*[-—–]\s*(\d+)").expect("dash pattern is valid"));

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// `12 - 15`, `12—15` and similar become `12–15` (en dash, no spaces).
///
/// Matching sees the text with markers removed, so digits and dash split
/// across markers still match; markers inside a replaced span are kept.
pub fn middle_dash_between_digits(text: &str) -> String {
    let plain = strip_markers(text);
    let spans: Vec<(Range<usize>, String)> = DASH_BETWEEN_DIGITS
        .captures_iter(&plain)
        .filter_map(|caps| Some((caps.get(1)?.end()..caps.get(2)?.start(), "–".to_string())))
        .collect();
    replace_plain_spans(text, &spans)
}

/// Restores `ё` in words typed with `е`, from a `word:replacement` dictionary.
pub struct Yoficator {
    dict: HashMap<String, String>,
}

impl Yoficator {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", e, path.display()),
            ))
        })?;
        Ok(Self::parse(&content))
    }

    /// Lines without a `:` are skipped.
    pub fn parse(content: &str) -> Self {
        let dict: HashMap<String, String> = content
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        log::debug!("Loaded {} yoficator entries", dict.len());
        Self { dict }
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// Replace whole words found in the dictionary. Markers are not words.
    pub fn apply(&self, text: &str) -> String {
        let plain = strip_markers(text);
        let spans: Vec<(Range<usize>, String)> = WORD
            .find_iter(&plain)
            .filter_map(|word| Some((word.range(), self.dict.get(word.as_str())?.clone())))
            .collect();
        replace_plain_spans(text, &spans)
    }
}

/// Rewrite `marked` so that each byte range of its plain text in `spans`
/// becomes the paired replacement. Markers, including those inside a span,
/// are copied through in place.
///
/// Spans must be sorted, non-overlapping and non-empty.
fn replace_plain_spans(marked: &str, spans: &[(Range<usize>, String)]) -> String {
    if spans.is_empty() {
        return marked.to_string();
    }
    let mut out = String::with_capacity(marked.len());
    let mut spans = spans.iter().peekable();
    let mut plain_pos = 0;
    for segment in tokenize(marked) {
        let Segment::Text(text) = segment else {
            out.push_str(segment.raw());
            continue;
        };
        for (i, ch) in text.char_indices() {
            let at = plain_pos + i;
            while spans.next_if(|(range, _)| range.end <= at).is_some() {}
            match spans.peek() {
                Some((range, replacement)) if range.start == at => out.push_str(replacement),
                Some((range, _)) if range.contains(&at) => {}
                _ => out.push(ch),
            }
        }
        plain_pos += text.len();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashes_between_digits_become_en_dash() {
        assert_eq!(middle_dash_between_digits("Ин. 3, 16 - 18"), "Ин. 3, 16–18");
        assert_eq!(middle_dash_between_digits("1—2 and 3 – 4"), "1–2 and 3–4");
        assert_eq!(middle_dash_between_digits("well - known"), "well - known");
    }

    #[test]
    fn yoficator_replaces_whole_words_outside_markers() {
        let yo = Yoficator::parse("еще:ещё\nвсе:всё\nbroken line\n");
        assert_eq!(yo.len(), 2);
        assert_eq!(yo.apply("{{b}}еще{{/b}} вчера"), "{{b}}ещё{{/b}} вчера");
        assert_eq!(yo.apply("всегда"), "всегда");
    }

    #[test]
    fn dash_between_digits_spans_markers() {
        assert_eq!(middle_dash_between_digits("{{b}}10{{/b}} - 12"), "{{b}}10{{/b}}–12");
        assert_eq!(middle_dash_between_digits("3 {{i}}-{{/i}} 4"), "3–{{i}}{{/i}}4");
        assert_eq!(middle_dash_between_digits("{{1}} 2"), "{{1}} 2");
    }

    #[test]
    fn word_split_by_marker_is_still_replaced() {
        let yo = Yoficator::parse("еще:ещё");
        assert_eq!(yo.apply("е{{b}}ще{{/b}}"), "ещё{{b}}{{/b}}");
    }
}
