//! Boundary behavior of the top-level operations: failures never cross the
//! call boundary as errors, only as `success: false` envelopes.
//!
//! Criteria validation happens before any browser launch, so these run
//! without Chrome.

use filing_watch::{LatestFilingsAgent, PortalScraper, SearchCriteria, StatsAggregator};

#[test]
fn unknown_state_yields_failure_envelope_with_zero_filings() {
    let scraper = PortalScraper::new();
    let criteria = SearchCriteria::new("Atlantis", "Auto Insurance");

    let outcome = scraper.scrape_filings(&criteria);

    assert!(!outcome.success);
    assert!(outcome.filings.is_empty());
    assert_eq!(outcome.pages_scraped, 0);
    let error = outcome.error.expect("failure envelope carries an error");
    assert!(error.contains("invalid search criteria"), "unexpected error: {}", error);
}

#[test]
fn unknown_insurance_type_yields_failure_envelope() {
    let scraper = PortalScraper::new();
    let criteria = SearchCriteria::new("California", "Pet Insurance");

    let outcome = scraper.scrape_filings(&criteria);

    assert!(!outcome.success);
    assert!(outcome.filings.is_empty());
    assert!(outcome.error.is_some());
}

#[test]
fn stats_failure_envelope_keeps_month_context() {
    let stats = StatsAggregator::new();

    let count = stats.monthly_filing_count("Atlantis", None);

    assert!(!count.success);
    assert_eq!(count.total_filings, 0);
    // the window was computed before the failure, so the caller still sees it
    assert!(!count.month.is_empty());
    assert!(count.error.is_some());
}

#[test]
fn latest_failure_envelope_has_no_filings() {
    let agent = LatestFilingsAgent::new();

    let latest = agent.latest_filings_with_docs("Atlantis", Some("Auto Insurance"), Some(3));

    assert!(!latest.success);
    assert!(latest.filings.is_empty());
    assert!(latest.error.is_some());
}

#[test]
fn scrape_envelope_serializes_to_dashboard_shape() {
    let outcome = PortalScraper::new().scrape_filings(&SearchCriteria::new("Atlantis", "Auto Insurance"));
    let json = serde_json::to_value(&outcome).expect("envelope serializes");

    assert_eq!(json["success"], false);
    assert!(json["filings"].as_array().expect("filings array").is_empty());
    assert!(json.get("pagesScraped").is_some());
    assert!(json.get("error").is_some());
}
