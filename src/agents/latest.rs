//! Latest filings with their document lists: a first-page scrape over a
//! recent date window, followed by a detail-view visit per filing.

use crate::agents::scraper::open_to_results;
use crate::browser::LaunchOptions;
use crate::error::Result;
use crate::model::{
    FilingDocument, FilingRecord, FilingWithDocuments, LatestFilings, SearchCriteria,
};
use crate::portal::{DocumentExtractor, LiveResultsPage, ResultsPage};
use chrono::{Duration as ChronoDuration, Local};

/// Default number of filings to fetch
pub const DEFAULT_LIMIT: usize = 5;

/// Pair each filing with its fetched documents.
///
/// A fetch that returns `Ok` (even with zero documents) leaves the session
/// on the results list, so the walk continues. A fetch error means the
/// session could not be restored; the failed filing is kept with an empty
/// document list and the walk stops there.
fn collect_with_documents<F>(rows: Vec<FilingRecord>, mut fetch: F) -> Vec<FilingWithDocuments>
where
    F: FnMut(&FilingRecord) -> Result<Vec<FilingDocument>>,
{
    let mut filings: Vec<FilingWithDocuments> = Vec::with_capacity(rows.len());
    for filing in rows {
        match fetch(&filing) {
            Ok(documents) => {
                log::debug!("filing {}: {} documents", filing.filing_number, documents.len());
                filings.push(FilingWithDocuments::new(filing, documents));
            }
            Err(e) => {
                // The session is no longer on the results list; continuing
                // would risk scraping wrong-page data.
                log::warn!(
                    "document harvest for {} failed, stopping: {}",
                    filing.filing_number,
                    e
                );
                filings.push(FilingWithDocuments::new(filing, Vec::new()));
                break;
            }
        }
    }
    filings
}

/// Fetches the most recent filings and harvests each one's documents
pub struct LatestFilingsAgent {
    options: LaunchOptions,
}

impl LatestFilingsAgent {
    pub fn new() -> Self {
        Self { options: LaunchOptions::default() }
    }

    pub fn with_options(options: LaunchOptions) -> Self {
        Self { options }
    }

    /// Fetch up to `limit` recent filings (submitted since yesterday) with
    /// their document lists. Failures come back as a `success: false`
    /// envelope.
    pub fn latest_filings_with_docs(
        &self,
        state: &str,
        insurance_type: Option<&str>,
        limit: Option<usize>,
    ) -> LatestFilings {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).max(1);
        log::info!("latest filings: {} {:?} limit={}", state, insurance_type, limit);

        match self.run(state, insurance_type, limit) {
            Ok(filings) => LatestFilings { success: true, filings, error: None },
            Err(e) => {
                log::error!("latest filings failed: {}", e);
                LatestFilings::failure(e.to_string())
            }
        }
    }

    fn run(
        &self,
        state: &str,
        insurance_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<FilingWithDocuments>> {
        let yesterday = Local::now().date_naive() - ChronoDuration::days(1);
        let criteria = SearchCriteria::new(state, insurance_type.unwrap_or("All"))
            .start_date(yesterday)
            .max_pages(1);

        let mut session = open_to_results(self.options.clone(), &criteria)?;

        let result = (|| {
            let mut rows = LiveResultsPage::new(&mut session).extract_rows()?;
            rows.truncate(limit);
            log::info!("found {} recent filings", rows.len());

            Ok(collect_with_documents(rows, |filing| {
                DocumentExtractor::new(&mut session).extract_for(&filing.filing_number)
            }))
        })();

        if let Err(e) = session.finish() {
            log::debug!("session teardown: {}", e);
        }

        result
    }
}

impl Default for LatestFilingsAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::model::DocumentType;

    fn filing(number: &str) -> FilingRecord {
        FilingRecord {
            company_name: "Acme Insurance Co".to_string(),
            naic_number: "12345".to_string(),
            product_description: "Private Passenger Auto".to_string(),
            type_of_insurance: "19.0 Personal Auto".to_string(),
            filing_type: "Rate".to_string(),
            status: "Open".to_string(),
            filing_number: number.to_string(),
        }
    }

    fn pdf(name: &str) -> FilingDocument {
        FilingDocument {
            name: name.to_string(),
            doc_type: DocumentType::Pdf,
            size: None,
            url: None,
        }
    }

    #[test]
    fn test_recoverable_harvest_miss_does_not_stop_the_walk() {
        // An unreadable detail page comes back as Ok(no documents) once the
        // session is restored; later filings still get their documents.
        let rows = vec![filing("F-1"), filing("F-2"), filing("F-3")];

        let filings = collect_with_documents(rows, |f| match f.filing_number.as_str() {
            "F-2" => Ok(Vec::new()),
            other => Ok(vec![pdf(&format!("{}.pdf", other))]),
        });

        assert_eq!(filings.len(), 3);
        assert_eq!(filings[0].document_count, 1);
        assert_eq!(filings[1].document_count, 0);
        assert_eq!(filings[2].document_count, 1);
    }

    #[test]
    fn test_failed_back_navigation_stops_the_walk() {
        let rows = vec![filing("F-1"), filing("F-2"), filing("F-3")];

        let filings = collect_with_documents(rows, |f| match f.filing_number.as_str() {
            "F-2" => Err(ScrapeError::NavigationFailed(
                "back navigation did not restore results list".to_string(),
            )),
            other => Ok(vec![pdf(&format!("{}.pdf", other))]),
        });

        // the failed filing is kept with an empty list, the rest are dropped
        assert_eq!(filings.len(), 2);
        assert_eq!(filings[0].filing.filing_number, "F-1");
        assert_eq!(filings[1].filing.filing_number, "F-2");
        assert!(filings[1].documents.is_empty());
    }

    #[test]
    fn test_all_filings_paired_on_clean_run() {
        let rows = vec![filing("F-1"), filing("F-2")];
        let filings = collect_with_documents(rows, |f| Ok(vec![pdf(&f.filing_number)]));

        assert_eq!(filings.len(), 2);
        assert!(filings.iter().all(|f| f.document_count == 1));
    }
}
