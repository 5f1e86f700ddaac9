//! Top-level agents: the full scrape flow, monitoring, stats and
//! latest-filings operations, plus the collaborator seams they depend on.
//!
//! Each agent owns one browser session per call and releases it on every
//! exit path. None of them throw across the boundary: results come back as
//! envelopes with a `success` flag.

pub mod latest;
pub mod monitor;
pub mod scraper;
pub mod stats;

pub use latest::LatestFilingsAgent;
pub use monitor::{COMBINATION_PAUSE, DedupStore, InMemorySeenSet, MonitorScheduler};
pub use scraper::PortalScraper;
pub use stats::StatsAggregator;

use crate::error::Result;
use crate::model::{FilingRecord, FilingSummary, ScrapeOutcome, SearchCriteria};

/// Source of filing results for one search. The monitor is written against
/// this seam so sweeps are testable without a browser.
pub trait FilingSource {
    fn fetch(&self, criteria: &SearchCriteria) -> ScrapeOutcome;
}

/// Storage collaborator that persists newly observed filings. Persistence is
/// external to this crate; the default sink only logs.
pub trait FilingSink {
    fn store_filings(&self, filings: &[FilingRecord]) -> Result<()>;
}

/// No-op sink that logs what a real store would persist
pub struct LogSink;

impl FilingSink for LogSink {
    fn store_filings(&self, filings: &[FilingRecord]) -> Result<()> {
        log::info!("would store {} new filings", filings.len());
        for filing in filings {
            log::debug!("  {} - {}", filing.filing_number, filing.company_name);
        }
        Ok(())
    }
}

/// Summarization collaborator: consumes one filing record, returns prose and
/// a risk classification. Opaque to this crate; implemented externally.
pub trait FilingSummarizer {
    fn summarize(&self, filing: &FilingRecord) -> Result<FilingSummary>;
}
