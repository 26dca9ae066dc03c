//! Inline marker codec.
//!
//! Style state is carried through plain text as `{{b}}`/`{{/b}}`,
//! `{{i}}`/`{{/i}}`, `{{u}}`/`{{/u}}` pairs, and footnote references as
//! `{{N}}` where `N` is the 1-based position in the document's footnote list.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::StyleState;

pub const MARKER_OPEN: &str = "{{";

/// How far past `{{` (inclusive) a marker may extend.
pub const MARKER_LOOKAHEAD: usize = 15;

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{([^\s{}]+?)\}\}").expect("marker pattern is valid"));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Bold,
    Italic,
    Underline,
}

impl Axis {
    /// Fixed processing order, shared by encode and decode.
    pub const ALL: [Axis; 3] = [Axis::Bold, Axis::Italic, Axis::Underline];

    pub fn open_marker(self) -> &'static str {
        match self {
            Axis::Bold => "{{b}}",
            Axis::Italic => "{{i}}",
            Axis::Underline => "{{u}}",
        }
    }

    pub fn close_marker(self) -> &'static str {
        match self {
            Axis::Bold => "{{/b}}",
            Axis::Italic => "{{/i}}",
            Axis::Underline => "{{/u}}",
        }
    }

    fn from_name(name: &str) -> Option<(Axis, bool)> {
        match name {
            "b" => Some((Axis::Bold, true)),
            "/b" => Some((Axis::Bold, false)),
            "i" => Some((Axis::Italic, true)),
            "/i" => Some((Axis::Italic, false)),
            "u" => Some((Axis::Underline, true)),
            "/u" => Some((Axis::Underline, false)),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Bold => "bold",
            Axis::Italic => "italic",
            Axis::Underline => "underline",
        })
    }
}

/// Prefix `word` with the markers that move `old` to `new`.
pub fn encode_transition(word: &str, old: StyleState, new: StyleState) -> String {
    let mut out = String::with_capacity(word.len() + 8);
    for axis in Axis::ALL {
        match (old.get(axis), new.get(axis)) {
            (true, false) => out.push_str(axis.close_marker()),
            (false, true) => out.push_str(axis.open_marker()),
            _ => {}
        }
    }
    out.push_str(word);
    out
}

pub fn footnote_marker(index: usize) -> String {
    format!("{{{{{index}}}}}")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkerWarning {
    /// Open marker while the axis is already open.
    Unclosed(Axis),
    /// Close marker while the axis is already closed.
    Orphaned(Axis),
    Unknown(String),
}

impl fmt::Display for MarkerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerWarning::Unclosed(axis) => write!(f, "unclosed {axis} tag"),
            MarkerWarning::Orphaned(axis) => write!(f, "orphaned {axis} tag"),
            MarkerWarning::Unknown(name) => write!(f, "unknown tag {{{{{name}}}}}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerDecision {
    pub state: StyleState,
    /// 1-based index into the document's footnote list.
    pub footnote: Option<usize>,
    pub warning: Option<MarkerWarning>,
}

/// Resolve one marker name against the current style state.
///
/// Never fails: anomalies are reported in `warning` and the returned state is
/// the best-effort state after the marker.
pub fn decide_marker(name: &str, state: StyleState) -> MarkerDecision {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        return match name.parse::<usize>() {
            Ok(index) => MarkerDecision {
                state,
                footnote: Some(index),
                warning: None,
            },
            Err(_) => MarkerDecision {
                state,
                footnote: None,
                warning: Some(MarkerWarning::Unknown(name.to_string())),
            },
        };
    }

    let Some((axis, open)) = Axis::from_name(name) else {
        return MarkerDecision {
            state,
            footnote: None,
            warning: Some(MarkerWarning::Unknown(name.to_string())),
        };
    };

    let warning = match (state.get(axis), open) {
        (true, true) => Some(MarkerWarning::Unclosed(axis)),
        (false, false) => Some(MarkerWarning::Orphaned(axis)),
        _ => None,
    };
    let mut state = state;
    state.set(axis, open);
    MarkerDecision {
        state,
        footnote: None,
        warning,
    }
}

/// Try to read a complete marker at the start of `text`.
///
/// Returns the marker name and the marker's byte length.
pub fn parse_marker(text: &str) -> Option<(&str, usize)> {
    if !text.starts_with(MARKER_OPEN) {
        return None;
    }
    let window_end = text
        .char_indices()
        .nth(MARKER_LOOKAHEAD)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let caps = MARKER_RE.captures(&text[..window_end])?;
    let whole = caps.get(0)?;
    let name = caps.get(1)?;
    Some((&text[name.start()..name.end()], whole.end()))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Marker { name: &'a str, raw: &'a str },
}

impl<'a> Segment<'a> {
    pub fn raw(&self) -> &'a str {
        match self {
            Segment::Text(t) => t,
            Segment::Marker { raw, .. } => raw,
        }
    }
}

/// Split marked text into contiguous text and marker segments.
///
/// Concatenating the segments' `raw()` reproduces the input. A `{{` that does
/// not start a well-formed marker stays in the surrounding text.
pub fn tokenize(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;
    while let Some(rel) = text[cursor..].find(MARKER_OPEN) {
        let at = cursor + rel;
        match parse_marker(&text[at..]) {
            Some((name, len)) => {
                if at > text_start {
                    segments.push(Segment::Text(&text[text_start..at]));
                }
                segments.push(Segment::Marker {
                    name,
                    raw: &text[at..at + len],
                });
                cursor = at + len;
                text_start = cursor;
            }
            None => cursor = at + 1,
        }
    }
    if text_start < text.len() {
        segments.push(Segment::Text(&text[text_start..]));
    }
    segments
}

pub fn strip_markers(text: &str) -> String {
    tokenize(text)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Text(t) => Some(t),
            Segment::Marker { .. } => None,
        })
        .collect()
}

/// Trim surrounding whitespace from marked text, looking through markers.
///
/// `strip_markers(trim_marked(x)) == strip_markers(x).trim()`.
pub fn trim_marked(text: &str) -> String {
    let mut pieces: Vec<(bool, String)> = tokenize(text)
        .into_iter()
        .map(|s| match s {
            Segment::Text(t) => (false, t.to_string()),
            Segment::Marker { raw, .. } => (true, raw.to_string()),
        })
        .collect();

    for (is_marker, piece) in pieces.iter_mut() {
        if *is_marker {
            continue;
        }
        let trimmed = piece.trim_start();
        let done = !trimmed.is_empty();
        *piece = trimmed.to_string();
        if done {
            break;
        }
    }
    for (is_marker, piece) in pieces.iter_mut().rev() {
        if *is_marker {
            continue;
        }
        let trimmed = piece.trim_end();
        let done = !trimmed.is_empty();
        *piece = trimmed.to_string();
        if done {
            break;
        }
    }

    pieces.into_iter().map(|(_, p)| p).collect()
}

/// Drop the first `len` bytes of plain content, keeping every marker.
pub fn strip_plain_prefix(marked: &str, len: usize) -> String {
    let mut remaining = len;
    let mut out = String::with_capacity(marked.len());
    for segment in tokenize(marked) {
        match segment {
            Segment::Marker { raw, .. } => out.push_str(raw),
            Segment::Text(t) if remaining >= t.len() => remaining -= t.len(),
            Segment::Text(t) => {
                out.push_str(t.get(remaining..).unwrap_or_default());
                remaining = 0;
            }
        }
    }
    out
}

/// Replace the first occurrence of `needle` outside markers with `replacement`
/// in the marked text, and drop the same occurrence from the plain text.
pub fn replace_first_in_text(
    marked: &str,
    plain: &str,
    needle: &str,
    replacement: &str,
) -> Option<(String, String)> {
    if needle.is_empty() {
        return None;
    }
    let mut marked_pos = 0;
    let mut plain_pos = 0;
    for segment in tokenize(marked) {
        if let Segment::Text(t) = segment {
            if let Some(idx) = t.find(needle) {
                let m_at = marked_pos + idx;
                let p_at = plain_pos + idx;
                let new_marked = format!(
                    "{}{}{}",
                    &marked[..m_at],
                    replacement,
                    &marked[m_at + needle.len()..]
                );
                let new_plain = if plain.get(p_at..p_at + needle.len()) == Some(needle) {
                    format!("{}{}", &plain[..p_at], &plain[p_at + needle.len()..])
                } else {
                    log::debug!("Plain text out of sync with marked text, removing first {needle:?}");
                    plain.replacen(needle, "", 1)
                };
                return Some((new_marked, new_plain));
            }
            plain_pos += t.len();
        }
        marked_pos += segment.raw().len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOLD: StyleState = StyleState {
        bold: true,
        italic: false,
        underlined: false,
    };

    #[test]
    fn transition_emits_close_then_open_in_axis_order() {
        let italic = StyleState {
            italic: true,
            ..StyleState::default()
        };
        assert_eq!(encode_transition("x", BOLD, italic), "{{/b}}{{i}}x");
        assert_eq!(encode_transition("x", BOLD, BOLD), "x");
        assert_eq!(encode_transition("", BOLD, StyleState::default()), "{{/b}}");
    }

    #[test]
    fn decide_marker_reports_anomalies_but_forces_state() {
        let d = decide_marker("b", BOLD);
        assert_eq!(d.state, BOLD);
        assert_eq!(d.warning, Some(MarkerWarning::Unclosed(Axis::Bold)));

        let d = decide_marker("/i", StyleState::default());
        assert_eq!(d.state, StyleState::default());
        assert_eq!(d.warning, Some(MarkerWarning::Orphaned(Axis::Italic)));

        let d = decide_marker("x", BOLD);
        assert_eq!(d.state, BOLD);
        assert!(matches!(d.warning, Some(MarkerWarning::Unknown(_))));

        let d = decide_marker("12", BOLD);
        assert_eq!(d.state, BOLD);
        assert_eq!(d.footnote, Some(12));
        assert_eq!(d.warning, None);
    }

    #[test]
    fn parse_marker_respects_lookahead_window() {
        assert_eq!(parse_marker("{{b}}rest"), Some(("b", 5)));
        assert_eq!(parse_marker("{{/u}}"), Some(("/u", 6)));
        assert_eq!(parse_marker("{{1234567890}}"), Some(("1234567890", 14)));
        assert_eq!(parse_marker("{{12345678901}}"), Some(("12345678901", 15)));
        assert_eq!(parse_marker("{{123456789012}}"), None);
        assert_eq!(parse_marker("{{b c}}"), None);
        assert_eq!(parse_marker("{{b"), None);
        assert_eq!(parse_marker("{{}}"), None);
    }

    #[test]
    fn tokenize_keeps_stray_braces_as_text() {
        let segs = tokenize("a{{{b}}c{{ d");
        assert_eq!(
            segs,
            vec![
                Segment::Text("a{"),
                Segment::Marker {
                    name: "b",
                    raw: "{{b}}"
                },
                Segment::Text("c{{ d"),
            ]
        );
        assert_eq!(strip_markers("a{{{b}}c{{/b}}"), "a{c");
    }

    #[test]
    fn trim_marked_looks_through_markers() {
        assert_eq!(trim_marked("  {{b}}  Word {{/b}}  "), "{{b}}Word{{/b}}");
        assert_eq!(trim_marked("{{i}} {{/i}}"), "{{i}}{{/i}}");
    }

    #[test]
    fn plain_prefix_is_removed_across_markers() {
        assert_eq!(strip_plain_prefix("{{b}}*{{/b}}*Note", 2), "{{b}}{{/b}}Note");
        assert_eq!(strip_plain_prefix("ab{{i}}cd{{/i}}", 3), "{{i}}d{{/i}}");
    }

    #[test]
    fn replace_skips_marker_text() {
        let (marked, plain) =
            replace_first_in_text("{{1}} see 1 here", " see 1 here", "1", "{{2}}").unwrap();
        assert_eq!(marked, "{{1}} see {{2}} here");
        assert_eq!(plain, " see  here");
        assert_eq!(strip_markers(&marked), plain);
    }
}
