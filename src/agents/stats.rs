//! Monthly filing-count statistics using the same session machinery as the
//! scraper, bounded to a date window, returning a single count.

use crate::agents::scraper::open_to_results;
use crate::browser::LaunchOptions;
use crate::error::Result;
use crate::model::{MonthlyCount, SearchCriteria};
use crate::portal::{LiveResultsPage, ResultsPage};
use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static RESULT_INDICATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)of\s+(\d+)\s+(?:results?|filings?|records?)").expect("valid indicator pattern")
});

/// Parse the portal's textual "Showing 1-25 of 456 results" indicator out of
/// page text
pub fn parse_result_indicator(text: &str) -> Option<u64> {
    RESULT_INDICATOR.captures(text).and_then(|caps| caps.get(1)).and_then(|m| m.as_str().parse().ok())
}

/// Computes date-bounded filing counts from the portal
pub struct StatsAggregator {
    options: LaunchOptions,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self { options: LaunchOptions::default() }
    }

    pub fn with_options(options: LaunchOptions) -> Self {
        Self { options }
    }

    /// Count filings submitted between the first of the current month and
    /// today. Failures come back as a `success: false` envelope.
    pub fn monthly_filing_count(&self, state: &str, insurance_type: Option<&str>) -> MonthlyCount {
        let today = Local::now().date_naive();
        let start = match NaiveDate::from_ymd_opt(today.year(), today.month(), 1) {
            Some(d) => d,
            None => return MonthlyCount::failure("could not compute start of month"),
        };

        let month = start.format("%B").to_string();
        let year = start.year();
        log::info!("monthly stats: {} {} {} ({} to {})", state, month, year, start, today);

        match self.count_in_window(state, insurance_type, start, today) {
            Ok(total_filings) => {
                MonthlyCount { success: true, total_filings, month, year, error: None }
            }
            Err(e) => {
                log::error!("monthly stats failed: {}", e);
                MonthlyCount { total_filings: 0, month, year, ..MonthlyCount::failure(e.to_string()) }
            }
        }
    }

    fn count_in_window(
        &self,
        state: &str,
        insurance_type: Option<&str>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64> {
        let criteria = SearchCriteria::new(state, insurance_type.unwrap_or("All"))
            .date_range(start, end)
            .max_pages(1);

        let mut session = open_to_results(self.options.clone(), &criteria)?;

        // Prefer the on-page "N of M results" indicator; fall back to
        // counting first-page rows. The fallback undercounts when results
        // span multiple pages; a documented limitation of the count path.
        let body = session.browser().body_text().unwrap_or_default();
        let count = match parse_result_indicator(&body) {
            Some(total) => {
                log::debug!("result indicator reports {} filings", total);
                total
            }
            None => {
                let rows = LiveResultsPage::new(&mut session).extract_rows()?;
                log::debug!("no result indicator; counted {} first-page rows", rows.len());
                rows.len() as u64
            }
        };

        if let Err(e) = session.finish() {
            log::debug!("session teardown: {}", e);
        }

        Ok(count)
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_showing_of_results() {
        assert_eq!(parse_result_indicator("Showing 1-25 of 456 results"), Some(456));
    }

    #[test]
    fn test_indicator_of_filings() {
        assert_eq!(parse_result_indicator("Page 1 of 12 filings"), Some(12));
    }

    #[test]
    fn test_indicator_singular_record() {
        assert_eq!(parse_result_indicator("1 of 1 record"), Some(1));
    }

    #[test]
    fn test_indicator_case_insensitive() {
        assert_eq!(parse_result_indicator("OF 99 RESULTS"), Some(99));
    }

    #[test]
    fn test_indicator_absent() {
        assert_eq!(parse_result_indicator("No matching filings were found"), None);
        assert_eq!(parse_result_indicator(""), None);
    }

    #[test]
    fn test_indicator_false_positive_guard() {
        // "of" followed by a number but no results-noun must not match
        assert_eq!(parse_result_indicator("as of 2025 the portal"), None);
    }
}
