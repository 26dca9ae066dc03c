#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use redocx::{Document, Footnote, Origin, Paragraph, Run, Sink, SourceParagraph, StyleState};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub const PLAIN: StyleState = StyleState {
    bold: false,
    italic: false,
    underlined: false,
};
pub const BOLD: StyleState = StyleState {
    bold: true,
    italic: false,
    underlined: false,
};
pub const ITALIC: StyleState = StyleState {
    bold: false,
    italic: true,
    underlined: false,
};
pub const UNDERLINE: StyleState = StyleState {
    bold: false,
    italic: false,
    underlined: true,
};
pub const BOLD_ITALIC: StyleState = StyleState {
    bold: true,
    italic: true,
    underlined: false,
};

pub fn source(page: u32, runs: &[(&str, StyleState)]) -> SourceParagraph {
    SourceParagraph {
        page,
        runs: runs.iter().map(|(t, s)| Run::new(*t, *s)).collect(),
        origin: Origin(0),
    }
}

pub fn paragraph(page: u32, marked: &str) -> Paragraph {
    Paragraph::new(page, marked, Origin(0))
}

pub fn footnote(page: u32, ordinal: usize, marked: &str) -> Footnote {
    let plain = redocx::markers::strip_markers(marked);
    Footnote::new(page, ordinal, marked, &plain, None)
}

pub fn document(paragraphs: Vec<Paragraph>) -> Document {
    Document {
        paragraphs,
        footnotes: Vec::new(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Text(String, StyleState),
    BeginFootnote,
    EndFootnote,
    EndParagraph,
}

/// Records write-back calls in order.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl RecordingSink {
    /// Text runs of the n-th body paragraph, footnote content excluded.
    pub fn paragraph_runs(&self, n: usize) -> Vec<(String, StyleState)> {
        let mut runs = Vec::new();
        let mut index = 0;
        let mut depth = 0;
        for event in &self.events {
            match event {
                Event::BeginFootnote => depth += 1,
                Event::EndFootnote => depth -= 1,
                Event::EndParagraph => {
                    if index == n {
                        break;
                    }
                    index += 1;
                }
                Event::Text(t, s) if depth == 0 && index == n => runs.push((t.clone(), *s)),
                Event::Text(..) => {}
            }
        }
        runs
    }
}

impl Sink for RecordingSink {
    fn push_text(&mut self, text: &str, style: StyleState) {
        self.events.push(Event::Text(text.to_string(), style));
    }

    fn begin_footnote(&mut self) {
        self.events.push(Event::BeginFootnote);
    }

    fn end_footnote(&mut self) {
        self.events.push(Event::EndFootnote);
    }

    fn end_paragraph(&mut self) {
        self.events.push(Event::EndParagraph);
    }
}

pub fn text(t: &str, style: StyleState) -> Event {
    Event::Text(t.to_string(), style)
}

/// `<w:r>` with direct formatting.
pub fn run(text: &str, style: StyleState) -> String {
    let mut rpr = String::new();
    if style.bold {
        rpr.push_str("<w:b/>");
    }
    if style.italic {
        rpr.push_str("<w:i/>");
    }
    if style.underlined {
        rpr.push_str(r#"<w:u w:val="single"/>"#);
    }
    let rpr = if rpr.is_empty() {
        rpr
    } else {
        format!("<w:rPr>{rpr}</w:rPr>")
    };
    format!(r#"<w:r>{rpr}<w:t xml:space="preserve">{text}</w:t></w:r>"#)
}

pub fn para(inner: &str) -> String {
    format!("<w:p>{inner}</w:p>")
}

pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
    )
}

/// A DOCX package with the given body and optional styles part.
pub fn docx_bytes(body: &str, styles: Option<&str>) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opt = SimpleFileOptions::default();
    zip.start_file("word/document.xml", opt).unwrap();
    zip.write_all(document_xml(body).as_bytes()).unwrap();
    if let Some(styles) = styles {
        zip.start_file("word/styles.xml", opt).unwrap();
        zip.write_all(
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><w:styles xmlns:w="{W_NS}">{styles}</w:styles>"#)
                .as_bytes(),
        )
        .unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn read_part(docx: &[u8], name: &str) -> String {
    let mut zip = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut content = String::new();
    zip.by_name(name)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

/// Concatenated `w:t` text of every `w:footnote` with a non-negative id, by id.
pub fn footnote_texts(footnotes_xml: &str) -> Vec<(i32, String)> {
    let xml = roxmltree::Document::parse(footnotes_xml).unwrap();
    xml.root_element()
        .children()
        .filter(|n| n.tag_name().name() == "footnote")
        .filter(|n| n.attribute((W_NS, "type")).is_none())
        .map(|n| {
            let id: i32 = n.attribute((W_NS, "id")).unwrap().parse().unwrap();
            let text: String = n
                .descendants()
                .filter(|d| d.tag_name().name() == "t")
                .filter_map(|d| d.text())
                .collect();
            (id, text)
        })
        .collect()
}
