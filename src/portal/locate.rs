//! Named selector strategies for the portal's unversioned markup.
//!
//! Control ids and labels on the portal are generated by its framework and
//! change between deployments, so widgets are located by partial-id or
//! fuzzy-label matching instead of exact selectors. Keeping each strategy
//! named and independent means UI drift is handled by swapping a matcher,
//! not rewriting the navigation machinery.

/// Render a Rust string as a JavaScript string literal
pub(crate) fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// A strategy for locating a form control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Exact CSS selector
    Css(String),
    /// Element whose id contains a fragment: `tag[id*="fragment"]`
    IdContains { tag: &'static str, fragment: &'static str },
    /// Match by exact trimmed visible text; has no CSS form, resolved by an
    /// in-page click script
    LabelEquals { tag: &'static str, needle: String },
}

impl Locator {
    /// CSS rendering of this locator, if it has one
    pub fn css(&self) -> Option<String> {
        match self {
            Locator::Css(selector) => Some(selector.clone()),
            Locator::IdContains { tag, fragment } => {
                Some(format!("{}[id*=\"{}\"]", tag, fragment))
            }
            Locator::LabelEquals { .. } => None,
        }
    }

    /// In-page click script for a label-match locator, returning whether a
    /// matching element was found and clicked. CSS-form locators are clicked
    /// through the element API instead and have no script.
    pub fn click_js(&self) -> Option<String> {
        let Locator::LabelEquals { tag, needle } = self else {
            return None;
        };

        Some(format!(
            r#"JSON.stringify((function() {{
                const candidates = Array.from(document.querySelectorAll({tag}));
                const hit = candidates.find(el => (el.textContent || '').trim() === {needle});
                if (hit) {{ hit.click(); return true; }}
                return false;
            }})())"#,
            tag = js_str(tag),
            needle = js_str(needle),
        ))
    }
}

/// The "Begin Search" control on the state home page
pub fn begin_search_button() -> Locator {
    Locator::Css("a.btn.btn-success".to_string())
}

/// The accept control on the user-agreement page
pub fn accept_button() -> Locator {
    Locator::Css("input[type=\"submit\"], button[type=\"submit\"]".to_string())
}

/// The business-type dropdown on the search form
pub fn business_type_select() -> Locator {
    Locator::IdContains { tag: "select", fragment: "businessType" }
}

/// Type-of-insurance checkboxes, rendered only after a business type is
/// chosen
pub fn toi_checkboxes() -> Locator {
    Locator::IdContains { tag: "input[type=\"checkbox\"]", fragment: "availableTois" }
}

/// The company-name text input (has an autocomplete widget attached)
pub fn company_name_input() -> Locator {
    Locator::IdContains { tag: "input", fragment: "companyName" }
}

/// Submission-date range inputs
pub fn start_date_input() -> Locator {
    Locator::IdContains { tag: "input", fragment: "submissionStartDate" }
}

pub fn end_date_input() -> Locator {
    Locator::IdContains { tag: "input", fragment: "submissionEndDate" }
}

/// The search submit button, matched by trimmed text since the form has
/// several submit controls
pub fn search_button() -> Locator {
    Locator::LabelEquals { tag: "button[type=\"submit\"]", needle: "Search".to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_contains_css() {
        let locator = business_type_select();
        assert_eq!(locator.css().unwrap(), "select[id*=\"businessType\"]");
    }

    #[test]
    fn test_checkbox_locator_css() {
        assert_eq!(
            toi_checkboxes().css().unwrap(),
            "input[type=\"checkbox\"][id*=\"availableTois\"]"
        );
    }

    #[test]
    fn test_label_match_has_no_css_form() {
        assert!(search_button().css().is_none());
    }

    #[test]
    fn test_label_locator_click_script() {
        let js = search_button().click_js().unwrap();
        assert!(js.contains("\"Search\""));
        assert!(js.contains("button[type=\\\"submit\\\"]"));
        assert!(js.contains(".trim() ==="));
    }

    #[test]
    fn test_css_locators_have_no_click_script() {
        assert!(begin_search_button().click_js().is_none());
        assert!(business_type_select().click_js().is_none());
    }

    #[test]
    fn test_plain_css_passthrough() {
        assert_eq!(begin_search_button().css().unwrap(), "a.btn.btn-success");
    }

    #[test]
    fn test_js_str_escapes_quotes() {
        assert_eq!(js_str(r#"21st "Century" Co"#), r#""21st \"Century\" Co""#);
    }

    #[test]
    fn test_js_str_plain() {
        assert_eq!(js_str("Acme"), "\"Acme\"");
    }
}
