//! Data model: search criteria, filing records, documents and the result
//! envelopes returned by the top-level operations.
//!
//! Every envelope carries a `success` flag plus an optional `error` string so
//! callers (API routes, the CLI) always get a structured response instead of
//! a propagated error.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Minimum number of table cells a results row must have to be a filing.
/// Header rows, filler rows and pagination chrome have fewer.
pub const MIN_ROW_CELLS: usize = 7;

/// Default pagination budget when the caller does not set one.
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// One scrape request. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Full state name, e.g. "California"
    pub state: String,

    /// Friendly insurance type name, e.g. "Auto Insurance"
    pub insurance_type: String,

    /// Company name filter; empty means all companies
    #[serde(default)]
    pub company_name: String,

    /// Inclusive start of the submission-date window (MM/DD/YYYY on the wire)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// Inclusive end of the submission-date window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// Pagination budget; values below 1 are treated as 1
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

impl SearchCriteria {
    pub fn new(state: impl Into<String>, insurance_type: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            insurance_type: insurance_type.into(),
            company_name: String::new(),
            start_date: None,
            end_date: None,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn company(mut self, name: impl Into<String>) -> Self {
        self.company_name = name.into();
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Effective pagination budget, never below 1
    pub fn page_budget(&self) -> u32 {
        self.max_pages.max(1)
    }
}

/// One row of the portal's results table.
///
/// `filing_number` is the natural unique key; rows without one are invalid
/// and are dropped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingRecord {
    pub company_name: String,
    pub naic_number: String,
    pub product_description: String,
    pub type_of_insurance: String,
    pub filing_type: String,
    pub status: String,
    pub filing_number: String,
}

impl FilingRecord {
    /// Build a record from raw table cells in portal column order:
    /// company, NAIC, product, TOI, filing type, status, filing number.
    ///
    /// Returns `None` for rows with fewer than [`MIN_ROW_CELLS`] cells or an
    /// empty filing number.
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        if cells.len() < MIN_ROW_CELLS {
            return None;
        }

        let record = Self {
            company_name: cells[0].trim().to_string(),
            naic_number: cells[1].trim().to_string(),
            product_description: cells[2].trim().to_string(),
            type_of_insurance: cells[3].trim().to_string(),
            filing_type: cells[4].trim().to_string(),
            status: cells[5].trim().to_string(),
            filing_number: cells[6].trim().to_string(),
        };

        if record.filing_number.is_empty() {
            return None;
        }

        Some(record)
    }
}

/// Build filing records from raw row cells, silently skipping header/filler
/// rows and rows with an empty filing number.
pub fn records_from_rows(rows: Vec<Vec<String>>) -> Vec<FilingRecord> {
    rows.iter().filter_map(|cells| FilingRecord::from_cells(cells)).collect()
}

/// Kind of attachment found on a filing's detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "PDF")]
    Pdf,
    Document,
}

/// One attachment on a filing's detail page. Belongs to exactly one filing;
/// never mutated after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A filing together with its harvested detail-page documents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingWithDocuments {
    #[serde(flatten)]
    pub filing: FilingRecord,
    pub documents: Vec<FilingDocument>,
    pub document_count: usize,
}

impl FilingWithDocuments {
    pub fn new(filing: FilingRecord, documents: Vec<FilingDocument>) -> Self {
        let document_count = documents.len();
        Self { filing, documents, document_count }
    }
}

/// Why a pagination loop stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// No enabled next control; the data ran out naturally
    Exhausted,
    /// The configured page budget was reached
    Budget,
    /// The next control was clicked but no new content rendered
    Stalled,
    /// A page extraction failed mid-loop; rows already collected are kept
    PageError(String),
}

/// Result of `scrape_filings`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutcome {
    pub success: bool,
    pub filings: Vec<FilingRecord>,
    pub pages_scraped: u32,
    pub total_pages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_by: Option<StopReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_filing_documents: Option<Vec<FilingDocument>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeOutcome {
    /// Failure envelope with zero filings
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            filings: Vec::new(),
            pages_scraped: 0,
            total_pages: 0,
            stopped_by: None,
            sample_filing_documents: None,
            error: Some(error.into()),
        }
    }
}

/// Monitor sweep configuration: the cross-product of states, insurance types
/// and companies to check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    pub states: Vec<String>,
    pub insurance_types: Vec<String>,
    #[serde(default)]
    pub companies: Vec<String>,
}

/// Per-combination outcome within one monitor sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationSummary {
    pub state: String,
    pub insurance_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub filings_found: usize,
    pub new_filings: usize,
}

/// Result of one monitor sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorReport {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub total_filings: usize,
    pub new_filings: usize,
    pub errors: Vec<String>,
    pub summary: Vec<CombinationSummary>,
}

/// Result of `monthly_filing_count`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCount {
    pub success: bool,
    pub total_filings: u64,
    pub month: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MonthlyCount {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            total_filings: 0,
            month: String::new(),
            year: 0,
            error: Some(error.into()),
        }
    }
}

/// Result of `latest_filings_with_docs`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestFilings {
    pub success: bool,
    pub filings: Vec<FilingWithDocuments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LatestFilings {
    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, filings: Vec::new(), error: Some(error.into()) }
    }
}

/// Prose summary plus risk classification produced by the (external)
/// summarization collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingSummary {
    pub summary_text: String,
    pub risk_classification: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_record_from_full_row() {
        let row = cells(&[
            "Acme Insurance Co",
            "12345",
            "Private Passenger Auto",
            "19.0 Personal Auto",
            "Rate",
            "Closed-Approved",
            "ACME-2025-001",
        ]);

        let record = FilingRecord::from_cells(&row).expect("valid row");
        assert_eq!(record.company_name, "Acme Insurance Co");
        assert_eq!(record.filing_number, "ACME-2025-001");
    }

    #[test]
    fn test_record_trims_cell_whitespace() {
        let row = cells(&[" Acme ", " 1 ", " p ", " t ", " Rate ", " ok ", "  F-1  "]);
        let record = FilingRecord::from_cells(&row).unwrap();
        assert_eq!(record.company_name, "Acme");
        assert_eq!(record.filing_number, "F-1");
    }

    #[test]
    fn test_short_row_is_skipped() {
        // Header and filler rows have fewer than 7 cells
        let row = cells(&["Company", "NAIC", "Product"]);
        assert!(FilingRecord::from_cells(&row).is_none());
    }

    #[test]
    fn test_empty_filing_number_is_dropped() {
        let row = cells(&["Acme", "1", "p", "t", "Rate", "ok", "   "]);
        assert!(FilingRecord::from_cells(&row).is_none());
    }

    #[test]
    fn test_records_from_rows_filters_invalid() {
        let rows = vec![
            cells(&["Header"]),
            cells(&["Acme", "1", "p", "t", "Rate", "ok", "F-1"]),
            cells(&["Bad", "1", "p", "t", "Rate", "ok", ""]),
            cells(&["Beta", "2", "p", "t", "Form", "ok", "F-2"]),
        ];

        let records = records_from_rows(rows);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.filing_number.is_empty()));
    }

    #[test]
    fn test_criteria_page_budget_floor() {
        let criteria = SearchCriteria::new("California", "Auto Insurance").max_pages(0);
        assert_eq!(criteria.page_budget(), 1);
    }

    #[test]
    fn test_filing_record_serializes_camel_case() {
        let row = cells(&["Acme", "1", "p", "t", "Rate", "ok", "F-1"]);
        let record = FilingRecord::from_cells(&row).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["companyName"], "Acme");
        assert_eq!(json["filingNumber"], "F-1");
        assert_eq!(json["naicNumber"], "1");
    }

    #[test]
    fn test_document_type_serialization() {
        let doc = FilingDocument {
            name: "rates.pdf".to_string(),
            doc_type: DocumentType::Pdf,
            size: Some("1.2 MB".to_string()),
            url: None,
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "PDF");
        assert_eq!(json["size"], "1.2 MB");
        assert!(json.get("url").is_none());
    }

    #[test]
    fn test_criteria_defaults_on_deserialize() {
        let criteria: SearchCriteria = serde_json::from_value(serde_json::json!({
            "state": "Texas",
            "insuranceType": "Home Insurance"
        }))
        .unwrap();

        assert_eq!(criteria.max_pages, DEFAULT_MAX_PAGES);
        assert!(criteria.company_name.is_empty());
        assert!(criteria.start_date.is_none());
    }
}
