//! Document harvesting from a filing's detail view.
//!
//! Two independent signals are combined: anchors whose href carries a
//! document file extension, and table rows pairing a filename-looking first
//! cell with a size-looking second cell. The union, deduplicated by name, is
//! the filing's document list. The filename heuristic ("contains a dot") is
//! deliberately best-effort, not a strict parser.

use crate::catalog::RESULTS_MARKER;
use crate::error::{Result, ScrapeError};
use crate::model::{DocumentType, FilingDocument};
use crate::portal::locate::js_str;
use crate::portal::session::{PortalSession, RESULTS_SETTLE};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static DOC_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(pdf|docx?|xlsx?|zip)([?#].*)?$").expect("valid extension pattern")
});

static PDF_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.pdf([?#].*)?$").expect("valid pdf pattern"));

static SIZE_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\d+([.,]\d+)?\s*(b|kb|mb|gb|bytes)?\s*$").expect("valid size pattern")
});

/// An anchor as reported by the detail page
#[derive(Debug, Clone, Deserialize)]
pub struct RawLink {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Deserialize)]
struct DetailPageCapture {
    links: Vec<RawLink>,
    rows: Vec<(String, String)>,
}

/// Whether a table cell plausibly holds a file size ("1.2 MB", "340 KB",
/// "1024")
fn looks_like_size(cell: &str) -> bool {
    SIZE_CELL.is_match(cell)
}

/// Whether a table cell plausibly holds a filename. Best-effort: any dotted
/// text qualifies, which is known to misclassify prose like "Inc." (covered
/// by tests, accepted as a heuristic).
fn looks_like_filename(cell: &str) -> bool {
    !cell.is_empty() && cell.contains('.')
}

fn doc_type_for(name_or_href: &str) -> DocumentType {
    if PDF_EXTENSION.is_match(name_or_href) { DocumentType::Pdf } else { DocumentType::Document }
}

/// Combine anchor and table signals into a document list, deduplicated by
/// name (anchors win)
pub fn classify_documents(links: &[RawLink], rows: &[(String, String)]) -> Vec<FilingDocument> {
    let mut documents: Vec<FilingDocument> = Vec::new();

    for link in links {
        if link.text.is_empty() || !DOC_EXTENSION.is_match(&link.href) {
            continue;
        }
        if documents.iter().any(|d| d.name == link.text) {
            continue;
        }
        documents.push(FilingDocument {
            name: link.text.clone(),
            doc_type: doc_type_for(&link.href),
            size: None,
            url: Some(link.href.clone()),
        });
    }

    for (name, size) in rows {
        if !looks_like_filename(name) || !looks_like_size(size) {
            continue;
        }
        if documents.iter().any(|d| d.name == *name) {
            continue;
        }
        documents.push(FilingDocument {
            name: name.clone(),
            doc_type: doc_type_for(name),
            size: Some(size.clone()),
            url: None,
        });
    }

    documents
}

/// Opens one filing's detail view, harvests its documents and restores the
/// session to the results list
pub struct DocumentExtractor<'a> {
    session: &'a mut PortalSession,
}

impl<'a> DocumentExtractor<'a> {
    pub fn new(session: &'a mut PortalSession) -> Self {
        Self { session }
    }

    /// Harvest the documents attached to `filing_number`.
    ///
    /// A filing whose detail link cannot be found, or whose detail page
    /// cannot be read, yields zero documents rather than aborting the scrape;
    /// the session is restored to the results list first. A failed
    /// back-navigation is an error: the enclosing loop must stop instead of
    /// scraping wrong-page data.
    pub fn extract_for(&mut self, filing_number: &str) -> Result<Vec<FilingDocument>> {
        let target = js_str(filing_number);

        let clicked: bool = self.session.browser().eval_json(&format!(
            r#"JSON.stringify((function() {{
                const links = Array.from(document.querySelectorAll('a'));
                const link = links.find(l => (l.textContent || '').trim() === {target});
                if (link) {{ link.click(); return true; }}
                return false;
            }})())"#,
        ))?;

        if !clicked {
            // A single filing's detail page is expendable
            log::warn!("detail link not found for filing {}", filing_number);
            return Ok(Vec::new());
        }

        self.session.note_detail_entered()?;
        self.session.browser().wait_for_navigation("filing detail")?;
        std::thread::sleep(RESULTS_SETTLE);
        self.session.browser().snapshot("filing-detail");

        // A harvest failure on an otherwise healthy session is recoverable:
        // go back to the results list and report zero documents. Only a
        // failed back-navigation leaves the session unsafe.
        let capture: Result<DetailPageCapture> =
            self.session.browser().eval_json(include_str!("harvest_documents.js"));
        let documents = match capture {
            Ok(capture) => classify_documents(&capture.links, &capture.rows),
            Err(e) => {
                log::warn!("document harvest for {} failed: {}", filing_number, e);
                self.return_to_results()?;
                return Ok(Vec::new());
            }
        };
        log::debug!("filing {}: {} documents", filing_number, documents.len());

        self.return_to_results()?;
        Ok(documents)
    }

    fn return_to_results(&mut self) -> Result<()> {
        self.session.browser().go_back()?;
        std::thread::sleep(crate::browser::STEP_SETTLE);

        let url = self.session.browser().current_url();
        if !url.contains(RESULTS_MARKER) {
            return Err(ScrapeError::NavigationFailed(format!(
                "back navigation did not restore results list, at {}",
                url
            )));
        }

        self.session.note_back_to_results()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(text: &str, href: &str) -> RawLink {
        RawLink { text: text.to_string(), href: href.to_string() }
    }

    fn row(name: &str, size: &str) -> (String, String) {
        (name.to_string(), size.to_string())
    }

    #[test]
    fn test_pdf_anchors_classified() {
        let links =
            vec![link("Rate Summary", "https://portal.example/doc/rates.pdf"), link(
                "Actuarial Memo",
                "https://portal.example/doc/memo.pdf?session=1",
            )];

        let docs = classify_documents(&links, &[]);
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.doc_type == DocumentType::Pdf));
        assert_eq!(docs[0].url.as_deref(), Some("https://portal.example/doc/rates.pdf"));
    }

    #[test]
    fn test_non_document_anchors_ignored() {
        let links = vec![
            link("Home", "https://portal.example/home"),
            link("Help", "https://portal.example/help.xhtml"),
        ];
        assert!(classify_documents(&links, &[]).is_empty());
    }

    #[test]
    fn test_two_pdfs_and_non_file_row() {
        // Detail page with 2 PDF anchors and one table row whose first cell
        // is not a filename: only the anchors count.
        let links = vec![
            link("rates.pdf", "https://portal.example/rates.pdf"),
            link("forms.pdf", "https://portal.example/forms.pdf"),
        ];
        let rows = vec![row("Filing overview", "12 KB")];

        let docs = classify_documents(&links, &rows);
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_table_row_with_filename_and_size() {
        let rows = vec![row("actuarial_memo.xlsx", "340 KB")];
        let docs = classify_documents(&[], &rows);

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].doc_type, DocumentType::Document);
        assert_eq!(docs[0].size.as_deref(), Some("340 KB"));
        assert!(docs[0].url.is_none());
    }

    #[test]
    fn test_dotted_prose_with_non_size_cell_excluded() {
        // "Inc." contains a dot but the second cell is not a size
        let rows = vec![row("Acme Insurance Inc.", "Closed-Approved")];
        assert!(classify_documents(&[], &rows).is_empty());
    }

    #[test]
    fn test_dotted_prose_with_size_cell_is_a_known_false_positive() {
        // The filename heuristic accepts any dotted text when the size cell
        // matches; preserved as documented best-effort behavior.
        let rows = vec![row("Rev. 2", "14 KB")];
        let docs = classify_documents(&[], &rows);
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_union_dedupes_by_name_anchor_wins() {
        let links = vec![link("rates.pdf", "https://portal.example/rates.pdf")];
        let rows = vec![row("rates.pdf", "1.1 MB")];

        let docs = classify_documents(&links, &rows);
        assert_eq!(docs.len(), 1);
        // Anchor signal ran first, so the URL is kept and the size is not
        assert!(docs[0].url.is_some());
        assert!(docs[0].size.is_none());
    }

    #[test]
    fn test_size_cell_heuristic() {
        assert!(looks_like_size("340 KB"));
        assert!(looks_like_size("1.2 MB"));
        assert!(looks_like_size("1024"));
        assert!(!looks_like_size("Closed-Approved"));
        assert!(!looks_like_size("12 filings"));
        assert!(!looks_like_size(""));
    }

    #[test]
    fn test_pdf_detection_in_row_names() {
        let rows = vec![row("summary.pdf", "90 KB"), row("data.zip", "2 MB")];
        let docs = classify_documents(&[], &rows);
        assert_eq!(docs[0].doc_type, DocumentType::Pdf);
        assert_eq!(docs[1].doc_type, DocumentType::Document);
    }
}
