//! Periodic monitoring: sweep a cross-product of search combinations and
//! report filings not seen before.
//!
//! The scheduler is cadence-agnostic: one call performs exactly one sweep,
//! and an external trigger (cron, API route) decides how often to run it.
//! Dedup memory is an explicitly passed [`DedupStore`] so tests can seed and
//! inspect it, and production can later swap in persistent storage without
//! touching sweep logic.

use crate::agents::{FilingSink, FilingSource, LogSink};
use crate::model::{CombinationSummary, MonitorConfig, MonitorReport, SearchCriteria};
use chrono::Utc;
use indexmap::IndexSet;
use std::time::Duration;

/// Pause between combinations. Part of the contract: hammering the portal
/// back-to-back measurably raises its defensive failure rate.
pub const COMBINATION_PAUSE: Duration = Duration::from_secs(5);

/// Dedup memory for filings observed across sweeps
pub trait DedupStore {
    fn contains(&self, filing_number: &str) -> bool;

    /// Record a filing as seen; returns true if it was not present before
    fn insert(&mut self, filing_number: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process seen-set, preserving first-seen order. Grows monotonically for
/// the process lifetime; not persisted across restarts.
#[derive(Debug, Default)]
pub struct InMemorySeenSet {
    seen: IndexSet<String>,
}

impl InMemorySeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filing numbers in first-seen order
    pub fn filing_numbers(&self) -> impl Iterator<Item = &str> {
        self.seen.iter().map(String::as_str)
    }
}

impl DedupStore for InMemorySeenSet {
    fn contains(&self, filing_number: &str) -> bool {
        self.seen.contains(filing_number)
    }

    fn insert(&mut self, filing_number: &str) -> bool {
        self.seen.insert(filing_number.to_string())
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}

/// Sweeps configured search combinations and reports newly observed filings
pub struct MonitorScheduler<S: FilingSource> {
    source: S,
    sink: Box<dyn FilingSink>,
    pause: Duration,
}

impl<S: FilingSource> MonitorScheduler<S> {
    pub fn new(source: S) -> Self {
        Self { source, sink: Box::new(LogSink), pause: COMBINATION_PAUSE }
    }

    /// Override the inter-combination pause. Intended for tests; production
    /// sweeps keep the default.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Replace the storage collaborator that receives new filings
    pub fn with_sink(mut self, sink: Box<dyn FilingSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Perform one sweep over the full cross-product of (state ×
    /// insuranceType × company) combinations.
    ///
    /// A filing is new iff its filing number is absent from `store` at the
    /// moment its combination is processed; afterwards every observed filing
    /// is recorded, so a filing appearing in two combinations within one
    /// sweep counts as new only once. A failed combination is reported and
    /// skipped; the sweep continues.
    pub fn sweep(&self, config: &MonitorConfig, store: &mut dyn DedupStore) -> MonitorReport {
        let timestamp = Utc::now();
        log::info!(
            "monitor sweep: {} states, {} insurance types, {} companies",
            config.states.len(),
            config.insurance_types.len(),
            config.companies.len()
        );

        let mut report = MonitorReport {
            success: true,
            timestamp,
            total_filings: 0,
            new_filings: 0,
            errors: Vec::new(),
            summary: Vec::new(),
        };

        // Empty company list means one unfiltered search per combination
        let companies: Vec<Option<&str>> = if config.companies.is_empty() {
            vec![None]
        } else {
            config.companies.iter().map(|c| Some(c.as_str())).collect()
        };

        let total_combinations =
            config.states.len() * config.insurance_types.len() * companies.len();
        let mut processed = 0usize;

        for state in &config.states {
            for insurance_type in &config.insurance_types {
                for company in &companies {
                    processed += 1;
                    self.check_combination(state, insurance_type, *company, store, &mut report);

                    if processed < total_combinations {
                        std::thread::sleep(self.pause);
                    }
                }
            }
        }

        log::info!(
            "sweep done: {} filings total, {} new, {} errors",
            report.total_filings,
            report.new_filings,
            report.errors.len()
        );
        report
    }

    fn check_combination(
        &self,
        state: &str,
        insurance_type: &str,
        company: Option<&str>,
        store: &mut dyn DedupStore,
        report: &mut MonitorReport,
    ) {
        log::info!(
            "checking {} - {}{}",
            state,
            insurance_type,
            company.map(|c| format!(" - {}", c)).unwrap_or_else(|| " (all companies)".to_string())
        );

        let criteria =
            SearchCriteria::new(state, insurance_type).company(company.unwrap_or_default());

        // Monitoring is about existence, not content: no document extraction
        let outcome = self.source.fetch(&criteria);

        if !outcome.success {
            let error = format!(
                "failed to check {} - {}: {}",
                state,
                insurance_type,
                outcome.error.unwrap_or_else(|| "unknown error".to_string())
            );
            log::error!("{}", error);
            report.errors.push(error);
            report.success = false;
            return;
        }

        let found = outcome.filings.len();
        let new: Vec<_> =
            outcome.filings.iter().filter(|f| !store.contains(&f.filing_number)).cloned().collect();

        for filing in &outcome.filings {
            store.insert(&filing.filing_number);
        }

        report.total_filings += found;
        report.new_filings += new.len();
        report.summary.push(CombinationSummary {
            state: state.to_string(),
            insurance_type: insurance_type.to_string(),
            company: company.map(str::to_string),
            filings_found: found,
            new_filings: new.len(),
        });

        log::info!("found {} filings ({} new)", found, new.len());

        if !new.is_empty() {
            if let Err(e) = self.sink.store_filings(&new) {
                log::warn!("filing sink rejected {} new filings: {}", new.len(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seen_set_insert_and_contains() {
        let mut set = InMemorySeenSet::new();
        assert!(set.is_empty());
        assert!(set.insert("F-1"));
        assert!(!set.insert("F-1"));
        assert!(set.contains("F-1"));
        assert!(!set.contains("F-2"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_seen_set_preserves_first_seen_order() {
        let mut set = InMemorySeenSet::new();
        set.insert("F-3");
        set.insert("F-1");
        set.insert("F-2");
        set.insert("F-1");

        let order: Vec<&str> = set.filing_numbers().collect();
        assert_eq!(order, vec!["F-3", "F-1", "F-2"]);
    }
}
