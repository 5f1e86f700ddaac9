//! The full scrape flow: session setup, form fill, pagination, sample
//! document harvest, teardown.

use crate::agents::FilingSource;
use crate::browser::LaunchOptions;
use crate::error::{Result, ScrapeError};
use crate::model::{ScrapeOutcome, SearchCriteria, StopReason};
use crate::portal::{CriteriaFormFiller, DocumentExtractor, LiveResultsPage, PortalSession, paginate};

/// Map a scrape-level error onto the failure envelope callers receive.
/// Nothing escapes `scrape_filings` as an error; this is the only boundary.
fn failure_envelope(error: ScrapeError) -> ScrapeOutcome {
    log::error!("scrape failed: {}", error);
    ScrapeOutcome::failure(error.to_string())
}

/// Drive a fresh session through setup and search, landing on the first
/// results page. Shared by the scraper, stats and latest-filings agents.
pub(crate) fn open_to_results(
    options: LaunchOptions,
    criteria: &SearchCriteria,
) -> Result<PortalSession> {
    // Validate criteria before paying for a browser launch
    crate::catalog::state_code(&criteria.state)?;
    crate::catalog::search_params(&criteria.insurance_type)?;

    let mut session = PortalSession::open(options, &criteria.state)?;

    let setup = (|| {
        session.begin_search()?;
        session.accept_agreement()?;
        session.reach_search_form()?;
        CriteriaFormFiller::new(&session).fill(criteria)?;
        session.submit_search()
    })();

    if let Err(e) = setup {
        // Session setup failures abort the call; release the browser here
        if let Err(close_err) = session.finish() {
            log::debug!("teardown after failed setup: {}", close_err);
        }
        return Err(e);
    }

    Ok(session)
}

/// Scrapes filings from the portal: one browser session per call, released
/// on every exit path
pub struct PortalScraper {
    options: LaunchOptions,
}

impl PortalScraper {
    pub fn new() -> Self {
        Self { options: LaunchOptions::default() }
    }

    pub fn with_options(options: LaunchOptions) -> Self {
        Self { options }
    }

    /// Run one full scrape. Never panics or propagates an error across the
    /// boundary: failures come back as a `success: false` envelope.
    pub fn scrape_filings(&self, criteria: &SearchCriteria) -> ScrapeOutcome {
        log::info!(
            "scrape: state={} type={} company={:?} budget={}",
            criteria.state,
            criteria.insurance_type,
            criteria.company_name,
            criteria.page_budget()
        );

        match self.run(criteria) {
            Ok(outcome) => outcome,
            Err(e) => failure_envelope(e),
        }
    }

    fn run(&self, criteria: &SearchCriteria) -> Result<ScrapeOutcome> {
        let mut session = open_to_results(self.options.clone(), criteria)?;

        let harvest = paginate(&mut LiveResultsPage::new(&mut session), criteria.page_budget());

        // Harvest the first filing's documents as a sample; its detail page
        // is expendable, so failures only degrade the sample.
        let sample = match harvest.filings.first() {
            Some(first) => {
                let filing_number = first.filing_number.clone();
                match DocumentExtractor::new(&mut session).extract_for(&filing_number) {
                    Ok(documents) => Some(documents),
                    Err(e) => {
                        log::warn!("sample document harvest failed: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        if let Err(e) = session.finish() {
            log::debug!("session teardown: {}", e);
        }

        let error = match &harvest.stop {
            StopReason::PageError(msg) => Some(format!("pagination aborted: {}", msg)),
            _ => None,
        };

        Ok(ScrapeOutcome {
            success: true,
            pages_scraped: harvest.pages_scraped,
            // Could be more pages upstream; this is where the walk stopped
            total_pages: harvest.pages_scraped,
            stopped_by: Some(harvest.stop),
            filings: harvest.filings,
            sample_filing_documents: sample,
            error,
        })
    }
}

impl Default for PortalScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl FilingSource for PortalScraper {
    fn fetch(&self, criteria: &SearchCriteria) -> ScrapeOutcome {
        self.scrape_filings(criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_failure_becomes_failure_envelope() {
        // A navigation step landing on an unexpected URL surfaces as
        // NavigationFailed from session setup; the caller sees a failure
        // envelope with zero filings, never an error.
        let err = ScrapeError::NavigationFailed(
            "expected agreement page, got https://filingaccess.serff.com/sfa/home/CA".to_string(),
        );

        let outcome = failure_envelope(err);

        assert!(!outcome.success);
        assert!(outcome.filings.is_empty());
        assert_eq!(outcome.pages_scraped, 0);
        assert!(outcome.stopped_by.is_none());
        let error = outcome.error.expect("failure envelope carries an error");
        assert!(error.starts_with("navigation failed:"), "unexpected error: {}", error);
    }

    #[test]
    fn test_session_expiry_becomes_failure_envelope() {
        let err = ScrapeError::SessionExpired("portal reported an expired session".to_string());
        let outcome = failure_envelope(err);

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("session expired"));
    }
}
