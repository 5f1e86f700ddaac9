//! # filing-watch
//!
//! A browser-automation scraping engine for the SERFF public insurance
//! filing-access portal. The portal exposes no API, only a session-based,
//! multi-step HTML form UI, so everything here drives a real Chrome tab via
//! the Chrome DevTools Protocol (CDP).
//!
//! ## What it does
//!
//! - **Navigation**: walks the portal's fixed Home → Agreement → SearchForm →
//!   Results sequence with per-step verification and a guarded state machine
//! - **Form filling**: maps search criteria onto unversioned form widgets
//!   (fuzzy option/label matching, autocomplete-safe typing, direct date
//!   assignment)
//! - **Pagination**: walks result pages under a page budget, distinguishing
//!   budget exhaustion from natural end of data
//! - **Documents**: opens filing detail views and harvests attached documents
//! - **Monitoring**: sweeps criteria combinations and reports filings not
//!   seen before, against an injectable dedup store
//! - **Stats**: date-bounded filing counts for the current month
//!
//! ## Example
//!
//! ```rust,no_run
//! use filing_watch::{PortalScraper, SearchCriteria};
//!
//! let scraper = PortalScraper::new();
//! let criteria = SearchCriteria::new("California", "Auto Insurance")
//!     .company("21st Century Casualty Company")
//!     .max_pages(5);
//!
//! let outcome = scraper.scrape_filings(&criteria);
//! println!("{} filings from {} pages", outcome.filings.len(), outcome.pages_scraped);
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Chrome session management and configuration
//! - [`portal`]: navigation state machine, form filling, pagination,
//!   document harvesting
//! - [`agents`]: top-level operations (scrape, monitor, stats, latest)
//! - [`catalog`]: portal code mappings (states, insurance types, URLs)
//! - [`model`]: records, criteria and result envelopes
//! - [`error`]: error taxonomy and result alias

pub mod agents;
pub mod browser;
pub mod catalog;
pub mod error;
pub mod model;
pub mod portal;

pub use agents::{
    DedupStore, FilingSink, FilingSource, FilingSummarizer, InMemorySeenSet, LatestFilingsAgent,
    LogSink, MonitorScheduler, PortalScraper, StatsAggregator,
};
pub use browser::{BrowserSession, LaunchOptions};
pub use error::{Result, ScrapeError};
pub use model::{
    FilingDocument, FilingRecord, FilingWithDocuments, LatestFilings, MonitorConfig,
    MonitorReport, MonthlyCount, ScrapeOutcome, SearchCriteria, StopReason,
};
pub use portal::{PortalSession, PortalStep};
