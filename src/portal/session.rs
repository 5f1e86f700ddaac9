//! Portal navigation: the fixed click-through sequence that must complete
//! before any filing data is visible.
//!
//! Home → Agreement → SearchForm → Results, with each transition verified
//! against the resulting URL or DOM state. Verification failures surface as
//! [`ScrapeError::NavigationFailed`] (or [`ScrapeError::SessionExpired`] when
//! the portal dropped its server-side session); they are never retried here,
//! the caller decides whether to re-run the whole session.

use crate::browser::{BrowserSession, LaunchOptions, STEP_SETTLE};
use crate::catalog::{self, AGREEMENT_MARKER, RESULTS_MARKER, SEARCH_FORM_MARKER};
use crate::error::{Result, ScrapeError};
use crate::portal::locate;
use crate::portal::state::PortalStep;
use std::time::Duration;

/// Settle delay after actions that re-render the results table
pub const RESULTS_SETTLE: Duration = Duration::from_secs(3);

/// One live automation run against the portal.
///
/// Owns the browser session and the navigation step; the browser is released
/// on every exit path (`finish`, `fail`, or drop).
pub struct PortalSession {
    browser: BrowserSession,
    step: PortalStep,
}

impl PortalSession {
    /// Launch a browser and open the portal home page for a state
    pub fn open(options: LaunchOptions, state: &str) -> Result<Self> {
        let url = catalog::state_home_url(state)?;
        let browser = BrowserSession::launch(options)?;

        log::info!("opening portal home for {} at {}", state, url);
        browser.navigate(&url)?;
        std::thread::sleep(STEP_SETTLE);
        browser.snapshot("step1-home");

        Ok(Self { browser, step: PortalStep::Home })
    }

    /// The underlying browser session
    pub fn browser(&self) -> &BrowserSession {
        &self.browser
    }

    /// Current navigation step
    pub fn step(&self) -> PortalStep {
        self.step
    }

    /// Click "Begin Search" on the home page and verify the agreement page
    /// was reached
    pub fn begin_search(&mut self) -> Result<()> {
        log::info!("step 2: begin search");
        self.click_css(&locate::begin_search_button())?;
        self.browser.wait_for_navigation("begin search")?;
        std::thread::sleep(STEP_SETTLE);
        self.browser.snapshot("step2-agreement");

        let url = self.browser.current_url();
        if !url.contains(AGREEMENT_MARKER) {
            self.check_session_alive()?;
            self.step = PortalStep::Failed;
            return Err(ScrapeError::NavigationFailed(format!(
                "expected agreement page, got {}",
                url
            )));
        }

        self.step.advance(PortalStep::AgreementPending)
    }

    /// Submit the click-through acceptance and verify the search form page
    /// was reached
    pub fn accept_agreement(&mut self) -> Result<()> {
        log::info!("step 3: accept agreement");
        self.click_css(&locate::accept_button())?;
        self.browser.wait_for_navigation("accept agreement")?;
        std::thread::sleep(STEP_SETTLE);
        self.browser.snapshot("step3-search-form");

        let url = self.browser.current_url();
        if !url.contains(SEARCH_FORM_MARKER) {
            self.check_session_alive()?;
            self.step = PortalStep::Failed;
            return Err(ScrapeError::NavigationFailed(format!(
                "expected search form, got {}",
                url
            )));
        }

        self.step.advance(PortalStep::SearchFormReady)
    }

    /// Verify the search form's expected markers are present (the business
    /// type dropdown is always rendered on a healthy form page)
    pub fn reach_search_form(&self) -> Result<()> {
        let selector = locate::business_type_select()
            .css()
            .ok_or_else(|| ScrapeError::ElementNotFound("locator has no css form".to_string()))?;
        self.browser
            .wait_for_element(&selector, Duration::from_secs(10))
            .map_err(|_| {
                ScrapeError::NavigationFailed("search form markers not found".to_string())
            })?;
        Ok(())
    }

    /// Click the Search submit button and verify the results page was reached
    pub fn submit_search(&mut self) -> Result<()> {
        log::info!("step 5: submit search");

        let js = locate::search_button()
            .click_js()
            .ok_or_else(|| ScrapeError::ElementNotFound("locator has no click form".to_string()))?;
        let clicked: bool = self.browser.eval_json(&js)?;

        if !clicked {
            self.step = PortalStep::Failed;
            return Err(ScrapeError::ElementNotFound("search submit button".to_string()));
        }

        self.browser.wait_for_navigation("submit search")?;
        std::thread::sleep(RESULTS_SETTLE);
        self.browser.snapshot("step5-results");

        let url = self.browser.current_url();
        if !url.contains(RESULTS_MARKER) {
            self.check_session_alive()?;
            self.step = PortalStep::Failed;
            return Err(ScrapeError::NavigationFailed(format!(
                "expected results page, got {}",
                url
            )));
        }

        self.step.advance(PortalStep::Results { page: 1 })
    }

    /// Record advancing to the next results page (the click itself is done by
    /// the paginator)
    pub fn note_page_advanced(&mut self) -> Result<()> {
        let next = match self.step {
            PortalStep::Results { page } => PortalStep::Results { page: page + 1 },
            other => {
                return Err(ScrapeError::InvalidTransition {
                    from: other.to_string(),
                    to: "results(next page)".to_string(),
                });
            }
        };
        self.step.advance(next)
    }

    /// Record entering a filing's detail view
    pub fn note_detail_entered(&mut self) -> Result<()> {
        let next = match self.step {
            PortalStep::Results { page } => PortalStep::Detail { page },
            other => {
                return Err(ScrapeError::InvalidTransition {
                    from: other.to_string(),
                    to: "detail".to_string(),
                });
            }
        };
        self.step.advance(next)
    }

    /// Record returning from a detail view to the results list
    pub fn note_back_to_results(&mut self) -> Result<()> {
        let next = match self.step {
            PortalStep::Detail { page } => PortalStep::Results { page },
            other => {
                return Err(ScrapeError::InvalidTransition {
                    from: other.to_string(),
                    to: "results".to_string(),
                });
            }
        };
        self.step.advance(next)
    }

    /// Fail the session if the portal reports an expired server-side session
    pub fn check_session_alive(&mut self) -> Result<()> {
        let body = self.browser.body_text().unwrap_or_default();
        if body.contains("Session Expired") {
            self.step = PortalStep::Failed;
            return Err(ScrapeError::SessionExpired(
                "portal reported an expired session".to_string(),
            ));
        }
        Ok(())
    }

    /// Finish the session normally and release the browser
    pub fn finish(mut self) -> Result<()> {
        let _ = self.step.advance(PortalStep::Done);
        self.browser.close()
    }

    fn click_css(&self, locator: &locate::Locator) -> Result<()> {
        let selector = locator
            .css()
            .ok_or_else(|| ScrapeError::ElementNotFound("locator has no css form".to_string()))?;
        let element = self.browser.find_element(&selector)?;
        element
            .click()
            .map_err(|e| ScrapeError::NavigationFailed(format!("click {}: {}", selector, e)))?;
        Ok(())
    }
}
