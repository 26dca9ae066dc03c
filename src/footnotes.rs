//! Page footnote reconciliation.
//!
//! Footnotes arrive as ordinary paragraphs at the bottom of each page, each
//! opened by a page-local sentinel (`*`, `**`, ...). The same sentinels mark
//! the references in the body text. Splitting pulls the footnotes out into
//! their own list; renumbering rewrites the in-text sentinels as
//! whole-document `{{N}}` markers.

use std::collections::BTreeMap;

use crate::document::Document;
use crate::error::Error;
use crate::markers::{footnote_marker, replace_first_in_text};
use crate::model::Footnote;

/// How many sentinels are drawn per reconciliation call by default.
pub const DEFAULT_MAX_SENTINELS: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageMismatch {
    pub page: u32,
    pub references: usize,
    pub footnotes: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenumberReport {
    /// Number of `{{N}}` markers issued.
    pub references: usize,
    pub footnotes: usize,
    pub mismatches: Vec<PageMismatch>,
}

impl RenumberReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty() && self.references == self.footnotes
    }
}

impl Document {
    /// Split footnote paragraphs out of the body.
    pub fn strip_footnotes<I>(&mut self, sentinels: I, max: usize) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = String>,
    {
        let sentinels: Vec<String> = sentinels.into_iter().take(max).collect();

        let mut body = Vec::with_capacity(self.paragraphs.len());
        let mut ordinal = 0usize;
        let mut page = 1u32;

        for paragraph in std::mem::take(&mut self.paragraphs) {
            if paragraph.page != page {
                ordinal = 0;
                page = paragraph.page;
            }

            let starts_footnote = sentinels
                .get(ordinal)
                .filter(|s| paragraph.plain.starts_with(s.as_str()));

            if let Some(sentinel) = starts_footnote {
                let footnote = Footnote::new(
                    paragraph.page,
                    ordinal,
                    &paragraph.marked,
                    &paragraph.plain,
                    Some(sentinel),
                );
                log::debug!("New footnote {footnote}");
                self.footnotes.push(footnote);
                ordinal += 1;
            } else if ordinal == 0 {
                body.push(paragraph);
            } else {
                let continuation = Footnote::new(
                    paragraph.page,
                    ordinal - 1,
                    &paragraph.marked,
                    &paragraph.plain,
                    None,
                );
                let Some(last) = self.footnotes.last_mut() else {
                    return Err(Error::OrphanedContinuation {
                        page: paragraph.page,
                        ordinal: ordinal - 1,
                    });
                };
                log::info!("Continuing footnote {last} with {paragraph}");
                last.merge(continuation)?;
            }
        }

        self.paragraphs = body;
        Ok(self)
    }

    /// Rewrite page-local sentinel references as `{{N}}` markers numbered
    /// across the whole document, checking counts against the footnote list.
    pub fn replace_footnotes<I>(&mut self, sentinels: I, max: usize) -> RenumberReport
    where
        I: IntoIterator<Item = String>,
    {
        let sentinels: Vec<String> = sentinels.into_iter().take(max).collect();

        let mut tally: BTreeMap<u32, usize> = BTreeMap::new();
        for footnote in &self.footnotes {
            *tally.entry(footnote.page).or_default() += 1;
        }

        let mut report = RenumberReport {
            footnotes: self.footnotes.len(),
            ..RenumberReport::default()
        };
        let mut seen_pages = Vec::new();
        let mut page = 1u32;
        let mut on_page = 0usize;

        for paragraph in &mut self.paragraphs {
            if paragraph.page != page {
                check_page(&tally, page, on_page, &mut report);
                seen_pages.push(page);
                page = paragraph.page;
                on_page = 0;
            }

            while let Some(sentinel) = sentinels.get(on_page) {
                let marker = footnote_marker(report.references + 1);
                let Some((marked, plain)) =
                    replace_first_in_text(&paragraph.marked, &paragraph.plain, sentinel, &marker)
                else {
                    break;
                };
                paragraph.marked = marked;
                paragraph.plain = plain;
                report.references += 1;
                on_page += 1;
            }
        }
        check_page(&tally, page, on_page, &mut report);
        seen_pages.push(page);

        for (&footnote_page, &count) in &tally {
            if !seen_pages.contains(&footnote_page) {
                check_page(&tally, footnote_page, 0, &mut report);
                log::debug!("Page {footnote_page} has {count} footnotes but no body text");
            }
        }

        if report.references != report.footnotes {
            log::warn!(
                "We got {} links in document and {} footnotes, check logs for warnings",
                report.references,
                report.footnotes
            );
        } else {
            log::info!("There are {} footnotes for now", report.references);
        }

        report
    }
}

fn check_page(tally: &BTreeMap<u32, usize>, page: u32, references: usize, report: &mut RenumberReport) {
    let footnotes = tally.get(&page).copied().unwrap_or(0);
    if footnotes != references {
        log::warn!("There are {references} links on page {page} and {footnotes} footnotes found");
        report.mismatches.push(PageMismatch {
            page,
            references,
            footnotes,
        });
    }
}
