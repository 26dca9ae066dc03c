//! Tagged text back to styled runs.
//!
//! The inverse of extraction: marked text is scanned left to right, markers
//! update the carried style, and text is handed to a [`Sink`] in maximal
//! runs of uniform style. `{{N}}` markers open a footnote receptacle at the
//! current position and write footnote `N` into it, recursively.

use crate::document::Document;
use crate::markers::{MARKER_OPEN, decide_marker, parse_marker};
use crate::model::{Footnote, StyleState};

/// Deepest footnote-within-footnote nesting written before giving up.
pub const MAX_FOOTNOTE_DEPTH: usize = 4;

/// Receives the decoded document in order.
pub trait Sink {
    fn push_text(&mut self, text: &str, style: StyleState);
    /// Following text goes into a new footnote anchored at the current position.
    fn begin_footnote(&mut self);
    fn end_footnote(&mut self);
    fn end_paragraph(&mut self);
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub paragraphs: usize,
    pub footnotes_written: usize,
    pub marker_warnings: usize,
    /// 1-based indices of footnotes no reference pointed at.
    pub unreferenced: Vec<usize>,
}

pub fn write_document<S: Sink>(doc: &Document, sink: &mut S) -> WriteReport {
    let mut writer = Writer {
        sink,
        footnotes: &doc.footnotes,
        active: Vec::new(),
        used: vec![false; doc.footnotes.len()],
        report: WriteReport::default(),
    };
    for paragraph in &doc.paragraphs {
        writer.write_text(&paragraph.marked);
        writer.sink.end_paragraph();
        writer.report.paragraphs += 1;
    }

    let mut report = writer.report;
    report.unreferenced = writer
        .used
        .iter()
        .enumerate()
        .filter(|(_, used)| !**used)
        .map(|(i, _)| i + 1)
        .collect();
    for index in &report.unreferenced {
        log::warn!("Footnote {index} is never referenced and will be dropped");
    }
    report
}

struct Writer<'a, S: Sink> {
    sink: &'a mut S,
    footnotes: &'a [Footnote],
    /// Footnotes currently being written, innermost last.
    active: Vec<usize>,
    used: Vec<bool>,
    report: WriteReport,
}

impl<S: Sink> Writer<'_, S> {
    /// Every call starts from the all-off style; nothing leaks between paragraphs.
    fn write_text(&mut self, text: &str) {
        let mut state = StyleState::PLAIN;
        let mut buffered_style = StyleState::PLAIN;
        let mut buffer = String::new();
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];
            if rest.starts_with(MARKER_OPEN) {
                if let Some((name, len)) = parse_marker(rest) {
                    let decision = decide_marker(name, state);
                    if let Some(warning) = &decision.warning {
                        log::warn!("{warning} at byte {pos} of {text:?}");
                        self.report.marker_warnings += 1;
                    }
                    if let Some(index) = decision.footnote {
                        self.write_footnote(index, &mut buffer, buffered_style);
                    }
                    state = decision.state;
                    pos += len;
                    continue;
                }
                log::warn!("Malformed tag at byte {pos} of {text:?}, keeping it as text");
                self.report.marker_warnings += 1;
            }

            let Some(ch) = rest.chars().next() else {
                break;
            };
            if state != buffered_style {
                self.flush(&mut buffer, buffered_style);
                buffered_style = state;
            }
            // A malformed `{{` advances one brace only, so the second brace
            // can still open a marker.
            buffer.push(ch);
            pos += ch.len_utf8();
        }
        self.flush(&mut buffer, buffered_style);
    }

    fn flush(&mut self, buffer: &mut String, style: StyleState) {
        if !buffer.is_empty() {
            self.sink.push_text(buffer, style);
            buffer.clear();
        }
    }

    /// Text buffered so far is flushed only once the reference is known to
    /// be writable, so a skipped reference does not split the run.
    fn write_footnote(&mut self, index: usize, pending: &mut String, style: StyleState) {
        let Some(footnote) = index.checked_sub(1).and_then(|i| self.footnotes.get(i)) else {
            log::warn!(
                "Reference to footnote {index}, but the document has {}",
                self.footnotes.len()
            );
            return;
        };
        if self.active.contains(&index) {
            log::warn!("Footnote {index} references itself through {:?}, skipping", self.active);
            return;
        }
        if self.active.len() >= MAX_FOOTNOTE_DEPTH {
            log::warn!("Footnote {index} nested deeper than {MAX_FOOTNOTE_DEPTH}, skipping");
            return;
        }

        self.flush(pending, style);
        self.used[index - 1] = true;
        self.active.push(index);
        self.sink.begin_footnote();
        self.write_text(&footnote.marked);
        self.sink.end_footnote();
        self.active.pop();
        self.report.footnotes_written += 1;
    }
}
