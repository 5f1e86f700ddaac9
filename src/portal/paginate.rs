//! Result pagination: the lazy, page-bounded, non-restartable walk over the
//! results table.
//!
//! The loop is written against the [`ResultsPage`] trait so the budget and
//! termination semantics are testable without a browser; [`LiveResultsPage`]
//! is the tab-backed implementation.

use crate::error::Result;
use crate::model::{FilingRecord, StopReason, records_from_rows};
use crate::portal::session::{PortalSession, RESULTS_SETTLE};

/// One results page of the portal, as seen by the pagination loop
pub trait ResultsPage {
    /// Extract the filing rows of the current page. Invalid rows (headers,
    /// filler, empty filing numbers) are already filtered out.
    fn extract_rows(&mut self) -> Result<Vec<FilingRecord>>;

    /// Whether an enabled "next page" affordance is present
    fn next_enabled(&mut self) -> Result<bool>;

    /// Click the next affordance and wait for the new page to render.
    /// Returns false when the click produced no new content.
    fn advance(&mut self) -> Result<bool>;
}

/// Outcome of one pagination run
#[derive(Debug, Clone)]
pub struct PageHarvest {
    /// Concatenation of all per-page row lists, in visit order
    pub filings: Vec<FilingRecord>,
    /// Pages actually visited; always `<=` the budget
    pub pages_scraped: u32,
    /// Which condition ended the loop
    pub stop: StopReason,
}

/// Walk result pages until the data runs out or the page budget is reached.
///
/// The budget is checked before any next-control probing, so a budget of 1
/// never touches pagination controls. A mid-loop page failure ends the walk
/// but keeps the rows already collected.
pub fn paginate<P: ResultsPage>(page: &mut P, max_pages: u32) -> PageHarvest {
    let budget = max_pages.max(1);
    let mut filings: Vec<FilingRecord> = Vec::new();
    let mut visited: u32 = 0;

    let stop = loop {
        match page.extract_rows() {
            Ok(mut rows) => {
                visited += 1;
                log::debug!("page {}: {} filings", visited, rows.len());
                filings.append(&mut rows);
            }
            Err(e) => {
                log::warn!("page {} extraction failed: {}", visited + 1, e);
                break StopReason::PageError(e.to_string());
            }
        }

        if visited >= budget {
            log::info!("reached page budget ({})", budget);
            break StopReason::Budget;
        }

        match page.next_enabled() {
            Ok(false) => {
                log::info!("no more pages after page {}", visited);
                break StopReason::Exhausted;
            }
            Ok(true) => {}
            Err(e) => break StopReason::PageError(e.to_string()),
        }

        match page.advance() {
            Ok(true) => {}
            Ok(false) => {
                // Clicked but nothing new rendered; stop rather than loop
                log::warn!("next click produced no new content after page {}", visited);
                break StopReason::Stalled;
            }
            Err(e) => break StopReason::PageError(e.to_string()),
        }
    };

    log::info!("pagination done: {} filings from {} pages ({:?})", filings.len(), visited, stop);
    PageHarvest { filings, pages_scraped: visited, stop }
}

/// Tab-backed [`ResultsPage`] over a live portal session
pub struct LiveResultsPage<'a> {
    session: &'a mut PortalSession,
}

impl<'a> LiveResultsPage<'a> {
    pub fn new(session: &'a mut PortalSession) -> Self {
        Self { session }
    }

    /// Cheap content fingerprint used to detect whether a next-click actually
    /// rendered a new page
    fn fingerprint(&self) -> Result<String> {
        self.session.browser().eval_json(
            r#"JSON.stringify((function() {
                const rows = document.querySelectorAll('table tbody tr');
                const first = rows.length ? (rows[0].textContent || '').trim() : '';
                return rows.length + '|' + first.slice(0, 120);
            })())"#,
        )
    }
}

impl ResultsPage for LiveResultsPage<'_> {
    fn extract_rows(&mut self) -> Result<Vec<FilingRecord>> {
        let raw: Vec<Vec<String>> =
            self.session.browser().eval_json(include_str!("extract_rows.js"))?;
        Ok(records_from_rows(raw))
    }

    fn next_enabled(&mut self) -> Result<bool> {
        self.session.browser().eval_json(
            r#"JSON.stringify((function() {
                if (document.querySelector('.ui-paginator-next:not(.ui-state-disabled)')) {
                    return true;
                }
                const candidates = Array.from(document.querySelectorAll('a, button'));
                return candidates.some(el =>
                    (el.textContent || '').toLowerCase().includes('next') &&
                    !el.classList.contains('disabled'));
            })())"#,
        )
    }

    fn advance(&mut self) -> Result<bool> {
        let before = self.fingerprint()?;

        let clicked: bool = self.session.browser().eval_json(
            r#"JSON.stringify((function() {
                const pfNext = document.querySelector('.ui-paginator-next:not(.ui-state-disabled)');
                if (pfNext) { pfNext.click(); return true; }
                const candidates = Array.from(document.querySelectorAll('a, button')).filter(el =>
                    (el.textContent || '').toLowerCase().includes('next') &&
                    !el.classList.contains('disabled'));
                if (candidates.length > 0) { candidates[0].click(); return true; }
                return false;
            })())"#,
        )?;

        if !clicked {
            return Ok(false);
        }

        std::thread::sleep(RESULTS_SETTLE);

        let after = self.fingerprint()?;
        if after == before {
            return Ok(false);
        }

        self.session.note_page_advanced()?;
        if let crate::portal::state::PortalStep::Results { page } = self.session.step() {
            self.session.browser().snapshot(&format!("results-page-{}", page));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;

    fn record(filing_number: &str) -> FilingRecord {
        FilingRecord {
            company_name: "Acme".to_string(),
            naic_number: "1".to_string(),
            product_description: "p".to_string(),
            type_of_insurance: "19.0 Personal Auto".to_string(),
            filing_type: "Rate".to_string(),
            status: "Open".to_string(),
            filing_number: filing_number.to_string(),
        }
    }

    /// Scripted fake page: a fixed set of pages, plus probes counting how the
    /// loop touched pagination controls.
    struct FakePages {
        pages: Vec<Vec<FilingRecord>>,
        current: usize,
        next_probes: usize,
        advances: usize,
        fail_on_page: Option<usize>,
    }

    impl FakePages {
        fn new(pages: Vec<Vec<FilingRecord>>) -> Self {
            Self { pages, current: 0, next_probes: 0, advances: 0, fail_on_page: None }
        }

        fn with_rows(page_count: usize, rows_per_page: usize) -> Self {
            let pages = (0..page_count)
                .map(|p| {
                    (0..rows_per_page).map(|r| record(&format!("F-{}-{}", p + 1, r + 1))).collect()
                })
                .collect();
            Self::new(pages)
        }
    }

    impl ResultsPage for FakePages {
        fn extract_rows(&mut self) -> Result<Vec<FilingRecord>> {
            if self.fail_on_page == Some(self.current + 1) {
                return Err(ScrapeError::EvaluationFailed("table vanished".to_string()));
            }
            Ok(self.pages.get(self.current).cloned().unwrap_or_default())
        }

        fn next_enabled(&mut self) -> Result<bool> {
            self.next_probes += 1;
            Ok(self.current + 1 < self.pages.len())
        }

        fn advance(&mut self) -> Result<bool> {
            self.advances += 1;
            if self.current + 1 >= self.pages.len() {
                return Ok(false);
            }
            self.current += 1;
            Ok(true)
        }
    }

    #[test]
    fn test_three_pages_under_budget_ends_naturally() {
        // Scenario: 3 pages of 10 rows, budget 5
        let mut pages = FakePages::with_rows(3, 10);
        let harvest = paginate(&mut pages, 5);

        assert_eq!(harvest.pages_scraped, 3);
        assert_eq!(harvest.filings.len(), 30);
        assert_eq!(harvest.stop, StopReason::Exhausted);
    }

    #[test]
    fn test_budget_cuts_off_five_pages() {
        // Scenario: 5 pages of 10 rows, budget 2
        let mut pages = FakePages::with_rows(5, 10);
        let harvest = paginate(&mut pages, 2);

        assert_eq!(harvest.pages_scraped, 2);
        assert_eq!(harvest.filings.len(), 20);
        assert_eq!(harvest.stop, StopReason::Budget);
    }

    #[test]
    fn test_budget_of_one_never_touches_pagination() {
        let mut pages = FakePages::with_rows(4, 10);
        let harvest = paginate(&mut pages, 1);

        assert_eq!(harvest.pages_scraped, 1);
        assert_eq!(harvest.filings.len(), 10);
        assert_eq!(harvest.stop, StopReason::Budget);
        assert_eq!(pages.next_probes, 0);
        assert_eq!(pages.advances, 0);
    }

    #[test]
    fn test_pages_scraped_never_exceeds_budget() {
        for budget in 1..=6 {
            let mut pages = FakePages::with_rows(4, 3);
            let harvest = paginate(&mut pages, budget);
            assert!(harvest.pages_scraped <= budget);
        }
    }

    #[test]
    fn test_zero_budget_is_treated_as_one() {
        let mut pages = FakePages::with_rows(3, 2);
        let harvest = paginate(&mut pages, 0);
        assert_eq!(harvest.pages_scraped, 1);
    }

    #[test]
    fn test_mid_loop_failure_keeps_collected_rows() {
        let mut pages = FakePages::with_rows(4, 10);
        pages.fail_on_page = Some(3);

        let harvest = paginate(&mut pages, 10);
        assert_eq!(harvest.pages_scraped, 2);
        assert_eq!(harvest.filings.len(), 20);
        assert!(matches!(harvest.stop, StopReason::PageError(_)));
    }

    #[test]
    fn test_stalled_advance_terminates() {
        struct Staller {
            extracted: usize,
        }

        impl ResultsPage for Staller {
            fn extract_rows(&mut self) -> Result<Vec<FilingRecord>> {
                self.extracted += 1;
                Ok(vec![record("F-1")])
            }
            fn next_enabled(&mut self) -> Result<bool> {
                Ok(true)
            }
            fn advance(&mut self) -> Result<bool> {
                // Next looks enabled, but clicking never renders anything new
                Ok(false)
            }
        }

        let mut page = Staller { extracted: 0 };
        let harvest = paginate(&mut page, 50);

        assert_eq!(harvest.stop, StopReason::Stalled);
        assert_eq!(harvest.pages_scraped, 1);
        assert_eq!(page.extracted, 1);
    }

    #[test]
    fn test_first_page_failure_yields_empty_harvest() {
        let mut pages = FakePages::with_rows(2, 5);
        pages.fail_on_page = Some(1);

        let harvest = paginate(&mut pages, 5);
        assert_eq!(harvest.pages_scraped, 0);
        assert!(harvest.filings.is_empty());
        assert!(matches!(harvest.stop, StopReason::PageError(_)));
    }
}
