use std::fmt;

use crate::error::Error;
use crate::markers::{Axis, strip_markers, strip_plain_prefix, trim_marked};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StyleState {
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
}

impl StyleState {
    pub const PLAIN: StyleState = StyleState {
        bold: false,
        italic: false,
        underlined: false,
    };

    pub fn get(self, axis: Axis) -> bool {
        match axis {
            Axis::Bold => self.bold,
            Axis::Italic => self.italic,
            Axis::Underline => self.underlined,
        }
    }

    pub fn set(&mut self, axis: Axis, on: bool) {
        match axis {
            Axis::Bold => self.bold = on,
            Axis::Italic => self.italic = on,
            Axis::Underline => self.underlined = on,
        }
    }
}

/// A uniformly styled span of source text.
#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Run {
    pub fn new(text: impl Into<String>, style: StyleState) -> Self {
        Self {
            text: text.into(),
            bold: style.bold,
            italic: style.italic,
            underline: style.underlined,
        }
    }

    pub fn style(&self) -> StyleState {
        StyleState {
            bold: self.bold,
            italic: self.italic,
            underlined: self.underline,
        }
    }
}

/// Back-reference to the source paragraph a [`Paragraph`] was built from.
/// Never dereferenced by the transformation passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Origin(pub usize);

#[derive(Debug)]
pub struct SourceParagraph {
    pub page: u32,
    pub runs: Vec<Run>,
    pub origin: Origin,
}

#[derive(Debug)]
pub struct SourceDocument {
    pub paragraphs: Vec<SourceParagraph>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    pub page: u32,
    /// Text with inline markers.
    pub marked: String,
    /// Same text with markers removed.
    pub plain: String,
    pub origins: Vec<Origin>,
}

impl Paragraph {
    pub fn new(page: u32, marked: impl Into<String>, origin: Origin) -> Self {
        let marked = marked.into();
        Self {
            page,
            plain: strip_markers(&marked),
            marked,
            origins: vec![origin],
        }
    }

    pub fn is_consistent(&self) -> bool {
        strip_markers(&self.marked) == self.plain
    }

    /// Append `other` as a continuation, separated by one space.
    pub fn merge(&mut self, other: Paragraph) {
        self.marked.push(' ');
        self.marked.push_str(&other.marked);
        self.plain.push(' ');
        self.plain.push_str(&other.plain);
        self.origins.extend(other.origins);
    }
}

impl fmt::Display for Paragraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Paragraph page:{} text: {}>", self.page, self.marked)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Footnote {
    pub page: u32,
    /// 0-based position among the footnotes of `page`.
    pub ordinal: usize,
    pub marked: String,
    pub plain: String,
}

impl Footnote {
    /// Build a footnote from paragraph text, removing `sentinel` when the
    /// plain text starts with it. Surrounding whitespace is trimmed.
    pub fn new(page: u32, ordinal: usize, marked: &str, plain: &str, sentinel: Option<&str>) -> Self {
        let (marked, plain) = match sentinel {
            Some(s) if plain.starts_with(s) => {
                (strip_plain_prefix(marked, s.len()), &plain[s.len()..])
            }
            _ => (marked.to_string(), plain),
        };
        Self {
            page,
            ordinal,
            marked: trim_marked(&marked),
            plain: plain.trim().to_string(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        strip_markers(&self.marked) == self.plain
    }

    /// Append a continuation. Both footnotes must sit at the same ordinal;
    /// anything else means the continuation cannot be attributed.
    pub fn merge(&mut self, other: Footnote) -> Result<(), Error> {
        if other.ordinal != self.ordinal {
            return Err(Error::FootnoteMergeConflict {
                page: self.page,
                existing: self.ordinal,
                incoming: other.ordinal,
            });
        }
        if !other.plain.is_empty() {
            if !self.plain.is_empty() {
                self.marked.push(' ');
                self.plain.push(' ');
            }
            self.marked.push_str(&other.marked);
            self.plain.push_str(&other.plain);
        }
        Ok(())
    }
}

impl fmt::Display for Footnote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Footnote page:{}->{} text: {}>",
            self.page, self.ordinal, self.marked
        )
    }
}
