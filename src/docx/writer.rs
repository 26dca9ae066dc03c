use std::io::{Seek, Write};
use std::path::Path;

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Error;
use crate::model::StyleState;
use crate::writeback::Sink;

/// Ids -1 and 0 are taken by the separator footnotes.
const FIRST_FOOTNOTE_ID: u32 = 1;

struct Frame {
    footnote_id: Option<u32>,
    runs: String,
}

/// Builds a minimal WordprocessingML package from write-back calls.
pub struct DocxWriter {
    body: String,
    /// Finished footnotes by id; nested ones finish before their parents.
    footnotes: Vec<(u32, String)>,
    frames: Vec<Frame>,
    next_footnote_id: u32,
    paragraphs: usize,
}

impl Default for DocxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxWriter {
    pub fn new() -> Self {
        Self {
            body: String::new(),
            footnotes: Vec::new(),
            frames: vec![Frame {
                footnote_id: None,
                runs: String::new(),
            }],
            next_footnote_id: FIRST_FOOTNOTE_ID,
            paragraphs: 0,
        }
    }

    pub fn footnote_count(&self) -> usize {
        (self.next_footnote_id - FIRST_FOOTNOTE_ID) as usize
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs
    }

    fn current(&mut self) -> &mut Frame {
        // frames[0] is the body frame and is never popped
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:body>{}
    <w:sectPr>
      <w:footnotePr><w:numFmt w:val="decimal"/></w:footnotePr>
      <w:pgSz w:w="11906" w:h="16838"/>
      <w:pgMar w:top="1134" w:right="850" w:bottom="1134" w:left="1701" w:header="708" w:footer="708" w:gutter="0"/>
      <w:cols w:space="708"/>
    </w:sectPr>
  </w:body>
</w:document>"#,
            self.body
        )
    }

    pub fn footnotes_xml(&self) -> String {
        let mut footnotes: Vec<&(u32, String)> = self.footnotes.iter().collect();
        footnotes.sort_by_key(|(id, _)| *id);
        let footnotes: String = footnotes.into_iter().map(|(_, xml)| xml.as_str()).collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:footnotes xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:footnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:footnote>
  <w:footnote w:type="continuationSeparator" w:id="0"><w:p><w:r><w:continuationSeparator/></w:r></w:p></w:footnote>{}
</w:footnotes>"#,
            footnotes
        )
    }

    pub fn write_to<W: Write + Seek>(&self, out: W) -> Result<W, Error> {
        if self.frames.len() > 1 {
            log::warn!("{} footnotes left open at end of document", self.frames.len() - 1);
        }

        let mut zip = ZipWriter::new(out);
        let opt = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", opt)?;
        zip.write_all(content_types_xml().as_bytes())?;

        zip.start_file("_rels/.rels", opt)?;
        zip.write_all(rels_xml().as_bytes())?;

        zip.start_file("word/document.xml", opt)?;
        zip.write_all(self.document_xml().as_bytes())?;

        zip.start_file("word/_rels/document.xml.rels", opt)?;
        zip.write_all(word_rels_xml().as_bytes())?;

        zip.start_file("word/styles.xml", opt)?;
        zip.write_all(styles_xml().as_bytes())?;

        zip.start_file("word/settings.xml", opt)?;
        zip.write_all(settings_xml().as_bytes())?;

        zip.start_file("word/footnotes.xml", opt)?;
        zip.write_all(self.footnotes_xml().as_bytes())?;

        Ok(zip.finish()?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let cursor = self.write_to(std::io::Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", e, path.display()),
            ))
        })?;
        self.write_to(file)?;
        Ok(())
    }
}

impl Sink for DocxWriter {
    fn push_text(&mut self, text: &str, style: StyleState) {
        let xml = run_xml(text, style);
        self.current().runs.push_str(&xml);
    }

    /// Word has no footnotes inside footnotes: a nested receptacle becomes a
    /// sibling footnote whose reference follows its parent's in the body.
    fn begin_footnote(&mut self) {
        let id = self.next_footnote_id;
        self.next_footnote_id += 1;
        if self.frames.len() > 1 {
            log::debug!("Footnote {id} is nested, anchoring it in the body instead");
        }
        self.frames[0].runs.push_str(&format!(
            r#"<w:r><w:rPr><w:rStyle w:val="FootnoteReference"/></w:rPr><w:footnoteReference w:id="{id}"/></w:r>"#
        ));
        self.frames.push(Frame {
            footnote_id: Some(id),
            runs: String::from(
                r#"<w:r><w:rPr><w:rStyle w:val="FootnoteReference"/></w:rPr><w:footnoteRef/></w:r><w:r><w:t xml:space="preserve"> </w:t></w:r>"#,
            ),
        });
    }

    fn end_footnote(&mut self) {
        if self.frames.len() < 2 {
            log::warn!("end_footnote without an open footnote");
            return;
        }
        let Some(Frame {
            footnote_id: Some(id),
            runs,
        }) = self.frames.pop()
        else {
            return;
        };
        self.footnotes.push((
            id,
            format!(
                r#"
  <w:footnote w:id="{id}"><w:p><w:pPr><w:pStyle w:val="FootnoteText"/></w:pPr>{runs}</w:p></w:footnote>"#
            ),
        ));
    }

    fn end_paragraph(&mut self) {
        if self.frames.len() > 1 {
            log::warn!("Paragraph ended inside an open footnote");
        }
        let runs = std::mem::take(&mut self.frames[0].runs);
        self.body.push_str("\n    <w:p>");
        self.body.push_str(&runs);
        self.body.push_str("</w:p>");
        self.paragraphs += 1;
    }
}

fn xml_escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // not representable in XML 1.0
            c if (c as u32) < 0x20 => {}
            _ => out.push(ch),
        }
    }
    out
}

fn run_xml(text: &str, style: StyleState) -> String {
    let mut out = String::from("<w:r>");
    if style != StyleState::PLAIN {
        out.push_str("<w:rPr>");
        if style.bold {
            out.push_str("<w:b/>");
        }
        if style.italic {
            out.push_str("<w:i/>");
        }
        if style.underlined {
            out.push_str(r#"<w:u w:val="single"/>"#);
        }
        out.push_str("</w:rPr>");
    }

    let mut pending = String::new();
    let flush = |pending: &mut String, out: &mut String| {
        if !pending.is_empty() {
            out.push_str(r#"<w:t xml:space="preserve">"#);
            out.push_str(&xml_escape_text(pending));
            out.push_str("</w:t>");
            pending.clear();
        }
    };
    for ch in text.chars() {
        match ch {
            '\t' => {
                flush(&mut pending, &mut out);
                out.push_str("<w:tab/>");
            }
            '\n' => {
                flush(&mut pending, &mut out);
                out.push_str("<w:br/>");
            }
            _ => pending.push(ch),
        }
    }
    flush(&mut pending, &mut out);
    out.push_str("</w:r>");
    out
}

fn content_types_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>
  <Override PartName="/word/footnotes.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footnotes+xml"/>
</Types>"#
}

fn rels_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#
}

fn word_rels_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footnotes" Target="footnotes.xml"/>
</Relationships>"#
}

fn settings_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:footnotePr>
    <w:footnote w:id="-1"/>
    <w:footnote w:id="0"/>
  </w:footnotePr>
</w:settings>"#
}

fn styles_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="FootnoteText">
    <w:name w:val="footnote text"/>
    <w:basedOn w:val="Normal"/>
    <w:rPr><w:sz w:val="20"/></w:rPr>
  </w:style>
  <w:style w:type="character" w:styleId="FootnoteReference">
    <w:name w:val="footnote reference"/>
    <w:rPr><w:vertAlign w:val="superscript"/></w:rPr>
  </w:style>
</w:styles>"#
}
