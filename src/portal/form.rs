//! Criteria form filling: maps a [`SearchCriteria`] onto the portal's search
//! form widgets.
//!
//! The form's controls are framework-generated and unversioned, so everything
//! here works by partial-id and fuzzy-label matching (see
//! [`crate::portal::locate`]). The company-name field carries an autocomplete
//! widget that intercepts keystrokes, so text is typed character-by-character
//! with a delay and dismissed with Escape; date fields are set by direct
//! value assignment because keyboard input opens a date-picker overlay that
//! swallows subsequent clicks.

use crate::catalog::{SearchParams, format_portal_date, search_params};
use crate::error::{Result, ScrapeError};
use crate::model::SearchCriteria;
use crate::portal::locate::{self, Locator, js_str};
use crate::portal::session::PortalSession;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Bounded wait for the TOI checkbox group to appear after the business-type
/// selection triggers its dependent re-render
const TOI_RENDER_WAIT: Duration = Duration::from_secs(3);

/// Inter-character delay while typing into the autocomplete-backed company
/// field
const KEYSTROKE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Deserialize)]
struct CheckboxMatch {
    found: bool,
    #[serde(default)]
    label: String,
}

/// Fills the portal search form from a [`SearchCriteria`]
pub struct CriteriaFormFiller<'a> {
    session: &'a PortalSession,
}

impl<'a> CriteriaFormFiller<'a> {
    pub fn new(session: &'a PortalSession) -> Self {
        Self { session }
    }

    /// Fill every criteria field. Must be called with the session on the
    /// search form page.
    pub fn fill(&self, criteria: &SearchCriteria) -> Result<()> {
        let params = search_params(&criteria.insurance_type)?;

        self.select_business_type(&params)?;

        if !params.toi.is_empty() {
            self.wait_for_toi_checkboxes()?;
            self.check_toi_checkbox(&params)?;
        }

        if !criteria.company_name.is_empty() {
            self.type_company_name(&criteria.company_name)?;
        }

        if let Some(start) = criteria.start_date {
            self.set_date_field(&locate::start_date_input(), format_portal_date(start));
        }
        if let Some(end) = criteria.end_date {
            self.set_date_field(&locate::end_date_input(), format_portal_date(end));
        }

        self.session.browser().snapshot("step4-form-filled");
        Ok(())
    }

    /// Choose the business-type option whose visible text contains every
    /// expected category token. Option text is unversioned, so this is a
    /// contains-match, not an equality check.
    fn select_business_type(&self, params: &SearchParams) -> Result<()> {
        let tokens: Vec<String> = params.business_type_tokens.iter().map(|t| js_str(t)).collect();

        let js = format!(
            r#"JSON.stringify((function() {{
                const select = document.querySelector('select[id*="businessType"]');
                if (!select) return "missing-select";
                const tokens = [{tokens}];
                const options = Array.from(select.options);
                const idx = options.findIndex(o => tokens.every(t => (o.text || '').includes(t)));
                if (idx < 0) return "missing-option";
                select.selectedIndex = idx;
                select.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return "ok";
            }})())"#,
            tokens = tokens.join(", "),
        );

        match self.session.browser().eval_json::<String>(&js)?.as_str() {
            "ok" => {
                log::debug!("business type selected ({:?})", params.business_type_tokens);
                Ok(())
            }
            "missing-select" => {
                Err(ScrapeError::ElementNotFound("business type select".to_string()))
            }
            other => Err(ScrapeError::ElementNotFound(format!(
                "business type option for {:?} ({})",
                params.business_type_tokens, other
            ))),
        }
    }

    /// The TOI checkbox group only exists after the business-type change
    /// re-renders the form. Poll for it within a bounded window.
    fn wait_for_toi_checkboxes(&self) -> Result<()> {
        let selector = locate::toi_checkboxes()
            .css()
            .ok_or_else(|| ScrapeError::ElementNotFound("locator has no css form".to_string()))?;
        let probe = format!(
            "document.querySelectorAll('{}').length > 0",
            selector.replace('\'', "\\'")
        );

        let deadline = Instant::now() + TOI_RENDER_WAIT;
        loop {
            if self.session.browser().eval_bool(&probe)? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ScrapeError::ElementNotFound(
                    "type-of-insurance checkboxes did not render".to_string(),
                ));
            }
            std::thread::sleep(Duration::from_millis(250));
        }
    }

    /// Check the TOI checkbox whose label (or parent text) contains the TOI
    /// code prefix or type name. A miss is logged, not fatal: the search then
    /// runs unfiltered, which the caller can still use.
    fn check_toi_checkbox(&self, params: &SearchParams) -> Result<()> {
        let js = format!(
            r#"JSON.stringify((function() {{
                const boxes = Array.from(document.querySelectorAll('input[type="checkbox"][id*="availableTois"]'));
                const code = {code};
                const name = {name};
                for (const box of boxes) {{
                    const label = document.querySelector('label[for="' + box.id + '"]');
                    const text = (label ? label.textContent : '') ||
                                 (box.parentElement ? box.parentElement.textContent : '') || '';
                    if (text.includes(code) || (name && text.includes(name))) {{
                        box.checked = true;
                        box.dispatchEvent(new Event('change', {{ bubbles: true }}));
                        box.dispatchEvent(new Event('click', {{ bubbles: true }}));
                        return {{ found: true, label: text.trim() }};
                    }}
                }}
                return {{ found: false, label: '' }};
            }})())"#,
            code = js_str(params.toi_code()),
            name = js_str(params.toi_name()),
        );

        let matched: CheckboxMatch = self.session.browser().eval_json(&js)?;
        if matched.found {
            log::debug!("TOI checkbox matched: {}", matched.label);
        } else {
            log::warn!("no TOI checkbox matched {}; search will be unfiltered", params.toi);
        }
        Ok(())
    }

    /// Type the company name character-by-character, dismissing the
    /// autocomplete widget with Escape. A post-type value mismatch is a
    /// warning, not an error: some autocomplete widgets silently reformat
    /// input.
    fn type_company_name(&self, company: &str) -> Result<()> {
        let selector = locate::company_name_input()
            .css()
            .ok_or_else(|| ScrapeError::ElementNotFound("locator has no css form".to_string()))?;

        // A missing company field is a structural change, not a transient
        // condition. Fail fast.
        let element = self.session.browser().find_element(&selector)?;

        self.session.browser().eval(&format!(
            r#"(function() {{
                const input = document.querySelector({sel});
                if (input) {{ input.value = ''; input.focus(); }}
            }})()"#,
            sel = js_str(&selector),
        ))?;
        std::thread::sleep(Duration::from_millis(500));

        element.click().map_err(|e| {
            ScrapeError::ElementNotFound(format!("company name input not clickable: {}", e))
        })?;

        for ch in company.chars() {
            self.session.browser().send_character(ch)?;
            std::thread::sleep(KEYSTROKE_DELAY);
        }

        // Dismiss any open suggestion list
        self.session.browser().press_key("Escape")?;
        std::thread::sleep(Duration::from_millis(500));

        let actual: String = self.session.browser().eval_json(&format!(
            r#"JSON.stringify((function() {{
                const input = document.querySelector({sel});
                return input ? input.value : '';
            }})())"#,
            sel = js_str(&selector),
        ))?;

        if actual != company {
            log::warn!("company name mismatch after typing: got {:?}, expected {:?}", actual, company);
        } else {
            log::debug!("company name entered: {:?}", actual);
        }

        Ok(())
    }

    /// Set a date field by direct value assignment plus change/blur events.
    /// A missing date input is logged and skipped; the date filter is
    /// optional.
    fn set_date_field(&self, locator: &Locator, value: String) {
        let Some(selector) = locator.css() else {
            return;
        };

        let js = format!(
            r#"JSON.stringify((function() {{
                const input = document.querySelector({sel});
                if (!input) return false;
                input.value = {value};
                input.dispatchEvent(new Event('change', {{ bubbles: true }}));
                input.dispatchEvent(new Event('blur', {{ bubbles: true }}));
                return true;
            }})())"#,
            sel = js_str(&selector),
            value = js_str(&value),
        );

        match self.session.browser().eval_json::<bool>(&js) {
            Ok(true) => log::debug!("date field {} set to {}", selector, value),
            Ok(false) => log::warn!("date field {} not found, continuing without it", selector),
            Err(e) => log::warn!("date field {} could not be set: {}", selector, e),
        }
    }
}

