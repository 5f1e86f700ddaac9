//! Tagged navigation state machine for the portal.
//!
//! The portal only renders data after a fixed click-through sequence, and its
//! server-side session breaks if steps run out of order. Transitions are
//! guarded so an illegal jump (e.g. detail page straight back to the
//! agreement) is an error instead of a silent wrong-page scrape.

use crate::error::{Result, ScrapeError};
use std::fmt;

/// Where in the portal flow a session currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalStep {
    /// State home page, the entry point
    Home,
    /// User-agreement page awaiting acceptance
    AgreementPending,
    /// Search form loaded and ready for criteria
    SearchFormReady,
    /// Results table, 1-based page number
    Results { page: u32 },
    /// Detail view of one filing, remembering the results page to return to
    Detail { page: u32 },
    /// Session finished normally
    Done,
    /// Session aborted; no further transitions allowed
    Failed,
}

impl fmt::Display for PortalStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalStep::Home => write!(f, "home"),
            PortalStep::AgreementPending => write!(f, "agreement"),
            PortalStep::SearchFormReady => write!(f, "search-form"),
            PortalStep::Results { page } => write!(f, "results(page {})", page),
            PortalStep::Detail { page } => write!(f, "detail(from page {})", page),
            PortalStep::Done => write!(f, "done"),
            PortalStep::Failed => write!(f, "failed"),
        }
    }
}

impl PortalStep {
    /// Whether moving to `next` is a legal portal transition.
    ///
    /// Step progression is monotonic except for the results ↔ detail loop;
    /// any live step may move to `Done` (teardown) or `Failed`.
    pub fn allows(&self, next: &PortalStep) -> bool {
        use PortalStep::*;

        match (self, next) {
            (Failed, _) => false,
            (_, Done) | (_, Failed) => true,
            (Home, AgreementPending) => true,
            (AgreementPending, SearchFormReady) => true,
            (SearchFormReady, Results { page: 1 }) => true,
            (Results { page: a }, Results { page: b }) => *b == a + 1,
            (Results { page: a }, Detail { page: b }) => a == b,
            (Detail { page: a }, Results { page: b }) => a == b,
            _ => false,
        }
    }

    /// Move to `next`, failing on an illegal transition
    pub fn advance(&mut self, next: PortalStep) -> Result<()> {
        if !self.allows(&next) {
            return Err(ScrapeError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        log::debug!("portal step: {} -> {}", self, next);
        *self = next;
        Ok(())
    }
}
