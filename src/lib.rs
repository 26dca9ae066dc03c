pub mod docx;
mod document;
mod error;
mod extract;
mod footnotes;
pub mod markers;
mod model;
pub mod normalize;
pub mod sentinels;
mod writeback;

pub use docx::{DocxWriter, PageBreaks};
pub use document::{CheckMode, Document, TextVariant, Variants};
pub use error::Error;
pub use extract::{extract, extract_paragraph};
pub use footnotes::{DEFAULT_MAX_SENTINELS, PageMismatch, RenumberReport};
pub use model::{Footnote, Origin, Paragraph, Run, SourceDocument, SourceParagraph, StyleState};
pub use writeback::{MAX_FOOTNOTE_DEPTH, Sink, WriteReport, write_document};

use std::path::{Path, PathBuf};
use std::time::Instant;

use normalize::{Yoficator, middle_dash_between_digits};

#[derive(Clone, Debug)]
pub struct Options {
    /// Sentinels drawn per page, i.e. the most footnotes one page may hold.
    pub max_sentinels: usize,
    pub page_breaks: PageBreaks,
    /// Warn about body paragraphs shorter than this; 0 disables the check.
    pub min_paragraph_len: usize,
    pub merge_continuations: bool,
    pub strip_page_numbers: bool,
    pub dash_normalization: bool,
    pub yo_dictionary: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_sentinels: DEFAULT_MAX_SENTINELS,
            page_breaks: PageBreaks::Auto,
            min_paragraph_len: 60,
            merge_continuations: true,
            strip_page_numbers: true,
            dash_normalization: true,
            yo_dictionary: None,
        }
    }
}

/// Extraction and reconciliation: everything up to, not including, write-back.
pub fn transform(source: &SourceDocument, options: &Options) -> Result<Document, Error> {
    let mut doc = extract(source);
    doc.strip_empty();
    if options.strip_page_numbers {
        doc.strip_page_numbers();
    }
    doc.strip_footnotes(sentinels::star_sentinels(), options.max_sentinels)?;
    if options.min_paragraph_len > 0 {
        let min = options.min_paragraph_len;
        doc.check(
            |text| text.chars().count() > min,
            "Too short paragraph",
            CheckMode::Warn,
        )?;
    }
    doc.replace_footnotes(sentinels::star_sentinels(), options.max_sentinels);
    if options.merge_continuations {
        doc.merge_paragraphs();
    }
    if options.dash_normalization {
        doc.prepare_paragraphs(middle_dash_between_digits, Variants::Both)
            .prepare_footnotes(middle_dash_between_digits, Variants::Both);
    }
    if let Some(path) = &options.yo_dictionary {
        let yo = Yoficator::from_path(path)?;
        log::info!("Loaded {} yoficator entries from {}", yo.len(), path.display());
        doc.prepare_paragraphs(|t| yo.apply(t), Variants::Both)
            .prepare_footnotes(|t| yo.apply(t), Variants::Both);
    }
    Ok(doc)
}

fn write_back(doc: &Document) -> DocxWriter {
    let mut writer = DocxWriter::new();
    let report = write_document(doc, &mut writer);
    log::info!(
        "Wrote {} paragraphs, {} footnotes ({} tag warnings)",
        report.paragraphs,
        report.footnotes_written,
        report.marker_warnings
    );
    writer
}

pub fn render(doc: &Document) -> Result<Vec<u8>, Error> {
    write_back(doc).to_bytes()
}

pub fn process(input: &Path, output: &Path, options: &Options) -> Result<(), Error> {
    let t0 = Instant::now();

    let source = docx::parse(input, options.page_breaks)?;
    let t_parse = t0.elapsed();

    let doc = transform(&source, options)?;
    let t_transform = t0.elapsed();

    let writer = write_back(&doc);
    writer.save(output)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, transform={:.1}ms, write={:.1}ms, total={:.1}ms ({} paragraphs, {} footnotes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_transform - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_transform).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        writer.paragraph_count(),
        writer.footnote_count(),
    );

    Ok(())
}
