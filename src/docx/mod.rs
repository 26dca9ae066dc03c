mod styles;
mod writer;

pub use writer::DocxWriter;

use std::io::{Read, Seek};
use std::path::Path;

use crate::error::Error;
use crate::model::{Origin, Run, SourceDocument, SourceParagraph, StyleState};

use styles::{StylesInfo, parse_styles};

pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Which markup decides where a new page starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageBreaks {
    /// `Rendered` when the document carries Word's layout hints, else `Explicit`.
    #[default]
    Auto,
    /// `w:lastRenderedPageBreak`, written by Word where pages actually broke.
    Rendered,
    /// Manual page breaks, `w:pageBreakBefore` and page-starting section breaks.
    Explicit,
}

/// Parse a WML boolean toggle element (e.g., w:b, w:i).
/// Present with no val or val != "0"/"false" means true.
pub(crate) fn wml_bool(parent: roxmltree::Node, name: &str) -> Option<bool> {
    wml(parent, name).map(|n| {
        n.attribute((WML_NS, "val"))
            .is_none_or(|v| v != "0" && v != "false")
    })
}

pub(crate) fn wml_underline(rpr: roxmltree::Node) -> Option<bool> {
    wml(rpr, "u").map(|u| u.attribute((WML_NS, "val")).is_none_or(|v| v != "none"))
}

pub(crate) fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

pub(crate) fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

pub(crate) fn read_zip_text<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

/// Flatten SDT wrappers: descend into w:sdtContent and collect effective children.
fn collect_block_nodes<'a>(parent: roxmltree::Node<'a, 'a>) -> Vec<roxmltree::Node<'a, 'a>> {
    let mut nodes = Vec::new();
    for child in parent.children() {
        if is_wml(child, "sdt") {
            if let Some(content) = wml(child, "sdtContent") {
                nodes.extend(collect_block_nodes(content));
            }
        } else {
            nodes.push(child);
        }
    }
    nodes
}

/// Body paragraphs in reading order, table cells included.
fn collect_paragraph_nodes<'a>(parent: roxmltree::Node<'a, 'a>, out: &mut Vec<roxmltree::Node<'a, 'a>>) {
    for node in collect_block_nodes(parent) {
        if is_wml(node, "p") {
            out.push(node);
        } else if is_wml(node, "tbl") {
            for tr in collect_block_nodes(node).into_iter().filter(|n| is_wml(*n, "tr")) {
                for tc in collect_block_nodes(tr).into_iter().filter(|n| is_wml(*n, "tc")) {
                    collect_paragraph_nodes(tc, out);
                }
            }
        }
    }
}

fn collect_run_nodes<'a>(parent: roxmltree::Node<'a, 'a>, out: &mut Vec<roxmltree::Node<'a, 'a>>) {
    for child in parent.children() {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "r" => out.push(child),
            "hyperlink" | "ins" | "smartTag" | "fldSimple" | "customXml" => {
                collect_run_nodes(child, out)
            }
            "sdt" => {
                if let Some(content) = wml(child, "sdtContent") {
                    collect_run_nodes(content, out);
                }
            }
            _ => {}
        }
    }
}

struct PageCounter {
    mode: PageBreaks,
    page: u32,
    seen_paragraph: bool,
}

impl PageCounter {
    fn new(mode: PageBreaks, body: roxmltree::Node) -> Self {
        let mode = match mode {
            PageBreaks::Auto => {
                if body.descendants().any(|n| is_wml(n, "lastRenderedPageBreak")) {
                    PageBreaks::Rendered
                } else {
                    PageBreaks::Explicit
                }
            }
            other => other,
        };
        log::debug!("Counting pages with {mode:?} breaks");
        PageCounter {
            mode,
            page: 1,
            seen_paragraph: false,
        }
    }

    fn counts(&self, mode: PageBreaks) -> bool {
        self.mode == mode
    }
}

fn resolve_style(
    rpr: Option<roxmltree::Node>,
    para_style: Option<&styles::StyleProps>,
    styles: &StylesInfo,
) -> StyleState {
    let char_style = rpr
        .and_then(|n| wml_attr(n, "rStyle"))
        .and_then(|id| styles.character_styles.get(id));

    let bold = rpr
        .and_then(|n| wml_bool(n, "b"))
        .or_else(|| char_style.and_then(|cs| cs.bold))
        .or_else(|| para_style.and_then(|ps| ps.bold))
        .unwrap_or(styles.defaults.bold);
    let italic = rpr
        .and_then(|n| wml_bool(n, "i"))
        .or_else(|| char_style.and_then(|cs| cs.italic))
        .or_else(|| para_style.and_then(|ps| ps.italic))
        .unwrap_or(styles.defaults.italic);
    let underlined = rpr
        .and_then(wml_underline)
        .or_else(|| char_style.and_then(|cs| cs.underline))
        .or_else(|| para_style.and_then(|ps| ps.underline))
        .unwrap_or(styles.defaults.underline);

    StyleState {
        bold,
        italic,
        underlined,
    }
}

fn parse_paragraph(
    para_node: roxmltree::Node,
    origin: Origin,
    styles: &StylesInfo,
    pages: &mut PageCounter,
) -> SourceParagraph {
    let ppr = wml(para_node, "pPr");
    let para_style = styles
        .paragraph_styles
        .get(ppr.and_then(|ppr| wml_attr(ppr, "pStyle")).unwrap_or("Normal"));

    if pages.counts(PageBreaks::Explicit)
        && pages.seen_paragraph
        && ppr
            .and_then(|ppr| wml_bool(ppr, "pageBreakBefore"))
            .unwrap_or(false)
    {
        pages.page += 1;
    }
    pages.seen_paragraph = true;

    let mut run_nodes = Vec::new();
    collect_run_nodes(para_node, &mut run_nodes);

    let mut runs: Vec<Run> = Vec::new();
    let mut start_page: Option<u32> = None;

    for run_node in run_nodes {
        let style = resolve_style(wml(run_node, "rPr"), para_style, styles);
        let mut text = String::new();

        for child in run_node.children() {
            if child.tag_name().namespace() != Some(WML_NS) {
                continue;
            }
            match child.tag_name().name() {
                // Word treats newlines in w:t as whitespace; only w:br creates line breaks
                "t" => text.push_str(&child.text().unwrap_or_default().replace('\n', " ")),
                "tab" => text.push('\t'),
                "cr" => text.push('\n'),
                "noBreakHyphen" => text.push('\u{2011}'),
                "softHyphen" => text.push('\u{00AD}'),
                "sym" => {
                    if let Some(c) = child
                        .attribute((WML_NS, "char"))
                        .and_then(|v| u32::from_str_radix(v, 16).ok())
                        .and_then(char::from_u32)
                    {
                        text.push(c);
                    }
                }
                "br" => match child.attribute((WML_NS, "type")) {
                    Some("page") => {
                        if pages.counts(PageBreaks::Explicit) {
                            if !runs.is_empty() || !text.is_empty() {
                                start_page.get_or_insert(pages.page);
                            }
                            pages.page += 1;
                        }
                    }
                    Some("column") => {}
                    _ => text.push('\n'),
                },
                "lastRenderedPageBreak" => {
                    if pages.counts(PageBreaks::Rendered) {
                        // A break before any text moves the whole paragraph.
                        if !runs.is_empty() || !text.is_empty() {
                            start_page.get_or_insert(pages.page);
                        }
                        pages.page += 1;
                    }
                }
                "footnoteReference" | "endnoteReference" => {
                    log::debug!("Ignoring native note reference in paragraph {}", origin.0);
                }
                _ => {}
            }
        }

        if text.is_empty() {
            continue;
        }
        start_page.get_or_insert(pages.page);
        match runs.last_mut() {
            Some(last) if last.style() == style => last.text.push_str(&text),
            _ => runs.push(Run::new(text, style)),
        }
    }

    let page = start_page.unwrap_or(pages.page);

    if pages.counts(PageBreaks::Explicit)
        && ppr
            .and_then(|ppr| wml(ppr, "sectPr"))
            .is_some_and(|sect| wml_attr(sect, "type") != Some("continuous"))
    {
        pages.page += 1;
    }

    SourceParagraph { page, runs, origin }
}

fn parse_archive<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
    breaks: PageBreaks,
) -> Result<SourceDocument, Error> {
    let styles = parse_styles(zip);

    let mut xml_content = String::new();
    zip.by_name("word/document.xml")
        .map_err(|_| Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into()))?
        .read_to_string(&mut xml_content)?;

    let xml = roxmltree::Document::parse(&xml_content)?;
    let root = xml.root_element();
    let body = wml(root, "body").ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

    let mut pages = PageCounter::new(breaks, body);
    let mut para_nodes = Vec::new();
    collect_paragraph_nodes(body, &mut para_nodes);

    let paragraphs: Vec<SourceParagraph> = para_nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| parse_paragraph(node, Origin(i), &styles, &mut pages))
        .collect();

    log::info!(
        "Read {} paragraphs over {} pages",
        paragraphs.len(),
        paragraphs.last().map(|p| p.page).unwrap_or(1)
    );

    Ok(SourceDocument { paragraphs })
}

pub fn parse(path: &Path, breaks: PageBreaks) -> Result<SourceDocument, Error> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;

    let mut zip = zip::ZipArchive::new(file)
        .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;
    parse_archive(&mut zip, breaks)
}

pub fn parse_bytes(bytes: &[u8], breaks: PageBreaks) -> Result<SourceDocument, Error> {
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|_| Error::InvalidDocx("data is not a ZIP archive".into()))?;
    parse_archive(&mut zip, breaks)
}
