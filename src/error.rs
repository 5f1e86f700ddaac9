//! Error types for portal scraping operations.

use thiserror::Error;

/// Errors produced while driving the filing-access portal.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Chrome could not be launched or the initial tab could not be created
    #[error("failed to launch browser: {0}")]
    LaunchFailed(String),

    /// A required element is missing from the page. Indicates a structural
    /// change in the portal markup; never retried.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// A navigation step did not land on the expected page
    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    /// A navigation exceeded its hard per-step timeout
    #[error("navigation timed out: {0}")]
    Timeout(String),

    /// The portal invalidated its server-side session mid-flow
    #[error("portal session expired: {0}")]
    SessionExpired(String),

    /// In-page JavaScript failed to run or returned an unusable value
    #[error("page evaluation failed: {0}")]
    EvaluationFailed(String),

    /// Search criteria reference a state or insurance type with no known
    /// portal code
    #[error("invalid search criteria: {0}")]
    InvalidCriteria(String),

    /// A portal step transition violated the navigation state machine
    #[error("invalid portal transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Tab-level operation failed (close, screenshot, history)
    #[error("tab operation failed: {0}")]
    TabOperationFailed(String),
}

impl ScrapeError {
    /// Classify an error message coming out of `headless_chrome` waits.
    /// The underlying crate reports timeouts as plain strings, so navigation
    /// wrappers use this to keep the taxonomy intact.
    pub(crate) fn from_wait_failure(context: &str, message: String) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("timeout") || lower.contains("timed out") {
            ScrapeError::Timeout(format!("{}: {}", context, message))
        } else {
            ScrapeError::NavigationFailed(format!("{}: {}", context, message))
        }
    }
}

/// Result type alias for scraping operations
pub type Result<T> = std::result::Result<T, ScrapeError>;
