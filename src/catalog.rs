//! Portal code mappings: state codes, insurance-type search parameters and
//! URL/date formats used by the filing-access portal.

use crate::error::{Result, ScrapeError};
use chrono::NaiveDate;

/// Base URL of the public filing-access portal
pub const PORTAL_BASE: &str = "https://filingaccess.serff.com/sfa";

/// URL fragment that identifies the user-agreement page
pub const AGREEMENT_MARKER: &str = "userAgreement.xhtml";

/// URL fragment that identifies the search form page
pub const SEARCH_FORM_MARKER: &str = "filingSearch.xhtml";

/// URL fragment that identifies the search results page
pub const RESULTS_MARKER: &str = "filingSearchResults";

/// Search parameters a friendly insurance-type name maps onto: the
/// business-type select option (matched by token, option text is not
/// contractually stable) and the type-of-insurance checkbox label prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Tokens the business-type option text must all contain
    pub business_type_tokens: &'static [&'static str],
    /// TOI label, e.g. "19.0 Personal Auto"; empty means no TOI filter
    pub toi: &'static str,
}

impl SearchParams {
    /// TOI code prefix used for fuzzy checkbox matching, e.g. "19.0"
    pub fn toi_code(&self) -> &str {
        self.toi.split_whitespace().next().unwrap_or("")
    }

    /// Human-readable TOI name portion, e.g. "Personal Auto"
    pub fn toi_name(&self) -> &str {
        match self.toi.split_once(' ') {
            Some((_, name)) => name,
            None => "",
        }
    }
}

const PROPERTY_CASUALTY: &[&str] = &["Property", "Casualty"];
const LIFE_HEALTH: &[&str] = &["Life", "Health"];

/// Resolve a full state name to its portal state code
pub fn state_code(state: &str) -> Result<&'static str> {
    let code = match state {
        "California" => "CA",
        "Texas" => "TX",
        "New York" => "NY",
        "Florida" => "FL",
        "Illinois" => "IL",
        "Pennsylvania" => "PA",
        "Ohio" => "OH",
        "Michigan" => "MI",
        "Georgia" => "GA",
        "North Carolina" => "NC",
        _ => {
            return Err(ScrapeError::InvalidCriteria(format!(
                "no portal code for state: {}",
                state
            )));
        }
    };
    Ok(code)
}

/// Resolve a friendly insurance-type name to portal search parameters
pub fn search_params(insurance_type: &str) -> Result<SearchParams> {
    let params = match insurance_type {
        "Auto Insurance" => SearchParams {
            business_type_tokens: PROPERTY_CASUALTY,
            toi: "19.0 Personal Auto",
        },
        "Home Insurance" => SearchParams {
            business_type_tokens: PROPERTY_CASUALTY,
            toi: "22.0 Homeowners",
        },
        "Life Insurance" => SearchParams { business_type_tokens: LIFE_HEALTH, toi: "10.0 Life" },
        "Health Insurance" => {
            SearchParams { business_type_tokens: LIFE_HEALTH, toi: "40.0 Health" }
        }
        // No TOI filter; searches all property & casualty filings
        "All Types" | "All" => SearchParams { business_type_tokens: PROPERTY_CASUALTY, toi: "" },
        _ => {
            return Err(ScrapeError::InvalidCriteria(format!(
                "no portal mapping for insurance type: {}",
                insurance_type
            )));
        }
    };
    Ok(params)
}

/// Home page URL for a state, the entry point of every session
pub fn state_home_url(state: &str) -> Result<String> {
    Ok(format!("{}/home/{}", PORTAL_BASE, state_code(state)?))
}

/// Format a date the way the portal's date inputs expect: MM/DD/YYYY
pub fn format_portal_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_state_codes() {
        assert_eq!(state_code("California").unwrap(), "CA");
        assert_eq!(state_code("North Carolina").unwrap(), "NC");
    }

    #[test]
    fn test_unknown_state_is_invalid_criteria() {
        let err = state_code("Atlantis").unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidCriteria(_)));
    }

    #[test]
    fn test_state_home_url() {
        assert_eq!(
            state_home_url("Texas").unwrap(),
            "https://filingaccess.serff.com/sfa/home/TX"
        );
    }

    #[test]
    fn test_auto_insurance_params() {
        let params = search_params("Auto Insurance").unwrap();
        assert_eq!(params.toi, "19.0 Personal Auto");
        assert_eq!(params.toi_code(), "19.0");
        assert_eq!(params.toi_name(), "Personal Auto");
        assert_eq!(params.business_type_tokens, &["Property", "Casualty"]);
    }

    #[test]
    fn test_all_types_has_no_toi_filter() {
        let params = search_params("All Types").unwrap();
        assert!(params.toi.is_empty());
        assert!(params.toi_code().is_empty());
    }

    #[test]
    fn test_unknown_insurance_type_is_invalid_criteria() {
        let err = search_params("Pet Insurance").unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidCriteria(_)));
    }

    #[test]
    fn test_portal_date_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_portal_date(date), "03/07/2025");
    }
}
