//! Source runs to tagged paragraphs.

use crate::document::Document;
use crate::markers::encode_transition;
use crate::model::{Paragraph, SourceDocument, SourceParagraph, StyleState};

pub fn extract(source: &SourceDocument) -> Document {
    let paragraphs: Vec<Paragraph> = source.paragraphs.iter().map(extract_paragraph).collect();
    log::debug!("Extracted {} paragraphs", paragraphs.len());
    Document {
        paragraphs,
        footnotes: Vec::new(),
    }
}

pub fn extract_paragraph(source: &SourceParagraph) -> Paragraph {
    let mut state = StyleState::PLAIN;
    let mut marked = String::new();
    let mut plain = String::new();

    for run in source.runs.iter().filter(|r| !r.text.is_empty()) {
        let next = run.style();
        marked.push_str(&encode_transition(&run.text, state, next));
        plain.push_str(&run.text);
        state = next;
    }
    // Close everything still open so markers balance within the paragraph.
    marked.push_str(&encode_transition("", state, StyleState::PLAIN));

    Paragraph {
        page: source.page,
        marked,
        plain,
        origins: vec![source.origin],
    }
}
