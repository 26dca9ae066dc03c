use crate::error::Error;
use crate::model::{Footnote, Paragraph};

/// Paragraphs and footnotes of one document, owned exclusively.
///
/// Every pass replaces these two lists in place and returns `self`, so a
/// pipeline reads as a chain of calls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    pub footnotes: Vec<Footnote>,
}

/// Which text of a paragraph a predicate sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextVariant {
    Marked,
    Plain,
}

/// Which texts a normalization is applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variants {
    MarkedOnly,
    Both,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckMode {
    Warn,
    Fail,
}

impl Document {
    /// Run `pred` over each paragraph's plain text.
    pub fn check<F>(&mut self, pred: F, message: &str, mode: CheckMode) -> Result<&mut Self, Error>
    where
        F: Fn(&str) -> bool,
    {
        for paragraph in &self.paragraphs {
            if pred(&paragraph.plain) {
                continue;
            }
            match mode {
                CheckMode::Fail => {
                    return Err(Error::CheckFailed {
                        message: message.to_string(),
                        paragraph: paragraph.to_string(),
                    });
                }
                CheckMode::Warn => log::warn!("{message} (para {paragraph})"),
            }
        }
        Ok(self)
    }

    pub fn strip_empty(&mut self) -> &mut Self {
        self.strip_custom(|text| !text.trim().is_empty(), TextVariant::Plain)
    }

    /// Keep only paragraphs for which `keep` holds.
    pub fn strip_custom<F>(&mut self, keep: F, variant: TextVariant) -> &mut Self
    where
        F: Fn(&str) -> bool,
    {
        self.paragraphs.retain(|paragraph| {
            let text = match variant {
                TextVariant::Marked => &paragraph.marked,
                TextVariant::Plain => &paragraph.plain,
            };
            let kept = keep(text);
            if !kept {
                log::info!("Discarding paragraph {paragraph}");
            }
            kept
        });
        self
    }

    /// Drop running page numbers: short all-digit paragraphs.
    pub fn strip_page_numbers(&mut self) -> &mut Self {
        self.strip_custom(
            |text| {
                let t = text.trim();
                !((1..=4).contains(&t.len()) && t.bytes().all(|b| b.is_ascii_digit()))
            },
            TextVariant::Plain,
        )
    }

    /// Rejoin paragraphs split by a page break: a paragraph whose text does
    /// not start with an uppercase letter continues the previous one.
    ///
    /// Page attribution of the merged text is lost, so run this only after
    /// footnote reconciliation.
    pub fn merge_paragraphs(&mut self) -> &mut Self {
        let mut merged: Vec<Paragraph> = Vec::with_capacity(self.paragraphs.len());
        for paragraph in std::mem::take(&mut self.paragraphs) {
            let continues = paragraph
                .plain
                .chars()
                .next()
                .is_some_and(|c| !c.is_uppercase());
            match merged.last_mut() {
                Some(last) if continues => {
                    log::info!("Merging {paragraph} into previous paragraph");
                    last.merge(paragraph);
                }
                _ => merged.push(paragraph),
            }
        }
        self.paragraphs = merged;
        self
    }

    /// Replace each paragraph's text with `f(text)`.
    pub fn prepare_paragraphs<F>(&mut self, f: F, variants: Variants) -> &mut Self
    where
        F: Fn(&str) -> String,
    {
        for paragraph in &mut self.paragraphs {
            paragraph.marked = f(&paragraph.marked);
            if variants == Variants::Both {
                paragraph.plain = f(&paragraph.plain);
            }
            if !paragraph.is_consistent() {
                log::warn!("Normalization broke marked/plain agreement in {paragraph}");
            }
        }
        log::info!("Normalized {} paragraphs", self.paragraphs.len());
        self
    }

    /// Replace each footnote's text with `f(text)`.
    pub fn prepare_footnotes<F>(&mut self, f: F, variants: Variants) -> &mut Self
    where
        F: Fn(&str) -> String,
    {
        for footnote in &mut self.footnotes {
            footnote.marked = f(&footnote.marked);
            if variants == Variants::Both {
                footnote.plain = f(&footnote.plain);
            }
            if !footnote.is_consistent() {
                log::warn!("Normalization broke marked/plain agreement in {footnote}");
            }
        }
        log::info!("Normalized {} footnotes", self.footnotes.len());
        self
    }
}
