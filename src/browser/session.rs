use crate::browser::config::{LaunchOptions, NAVIGATION_TIMEOUT};
use crate::error::{Result, ScrapeError};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, Element, Tab};
use serde::de::DeserializeOwned;
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// One automated browser with a single owned tab.
///
/// The tab is the session's only external resource; [`BrowserSession::close`]
/// releases it and is called on every exit path by the owning scraper.
pub struct BrowserSession {
    browser: Browser,
    tab: Arc<Tab>,
    snapshot_dir: Option<std::path::PathBuf>,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));
        launch_opts.args.push(OsStr::new("--disable-dev-shm-usage"));
        launch_opts.args.push(OsStr::new("--disable-gpu"));

        // Keep the browser alive across slow portal round-trips (default idle
        // timeout is 30 seconds)
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        let browser =
            Browser::new(launch_opts).map_err(|e| ScrapeError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| ScrapeError::LaunchFailed(format!("failed to create tab: {}", e)))?;
        tab.set_default_timeout(NAVIGATION_TIMEOUT);

        Ok(Self { browser, tab, snapshot_dir: options.snapshot_dir })
    }

    /// The session's owned tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Navigate to a URL and wait for the navigation to complete
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| ScrapeError::NavigationFailed(format!("navigate to {}: {}", url, e)))?;
        self.wait_for_navigation(url)
    }

    /// Wait for an in-flight navigation, classifying timeouts separately
    pub fn wait_for_navigation(&self, context: &str) -> Result<()> {
        self.tab
            .wait_until_navigated()
            .map_err(|e| ScrapeError::from_wait_failure(context, e.to_string()))?;
        Ok(())
    }

    /// URL of the current page
    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }

    /// Find an element by CSS selector
    pub fn find_element(&self, css_selector: &str) -> Result<Element<'_>> {
        self.tab
            .find_element(css_selector)
            .map_err(|e| ScrapeError::ElementNotFound(format!("{}: {}", css_selector, e)))
    }

    /// Wait for an element to appear, with a bounded timeout
    pub fn wait_for_element(&self, css_selector: &str, timeout: Duration) -> Result<Element<'_>> {
        self.tab
            .wait_for_element_with_custom_timeout(css_selector, timeout)
            .map_err(|e| ScrapeError::ElementNotFound(format!("{}: {}", css_selector, e)))
    }

    /// Evaluate JavaScript that returns a JSON string (or a plain JSON value)
    /// and deserialize it.
    ///
    /// In-page scripts in this crate return `JSON.stringify(...)` so the
    /// value crosses the CDP boundary as a single string.
    pub fn eval_json<T: DeserializeOwned>(&self, js: &str) -> Result<T> {
        let result = self
            .tab
            .evaluate(js, false)
            .map_err(|e| ScrapeError::EvaluationFailed(e.to_string()))?;

        let value = result.value.ok_or_else(|| {
            ScrapeError::EvaluationFailed("no value returned from page script".to_string())
        })?;

        if let Some(json_str) = value.as_str() {
            serde_json::from_str(json_str).map_err(|e| {
                ScrapeError::EvaluationFailed(format!("failed to parse page result: {}", e))
            })
        } else {
            serde_json::from_value(value).map_err(|e| {
                ScrapeError::EvaluationFailed(format!("failed to deserialize page result: {}", e))
            })
        }
    }

    /// Evaluate JavaScript for its boolean result
    pub fn eval_bool(&self, js: &str) -> Result<bool> {
        let result = self
            .tab
            .evaluate(js, false)
            .map_err(|e| ScrapeError::EvaluationFailed(e.to_string()))?;
        Ok(result.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    /// Evaluate JavaScript for side effects only
    pub fn eval(&self, js: &str) -> Result<()> {
        self.tab
            .evaluate(js, false)
            .map_err(|e| ScrapeError::EvaluationFailed(e.to_string()))?;
        Ok(())
    }

    /// Full text content of the document body, used for session-expiry and
    /// result-indicator checks
    pub fn body_text(&self) -> Result<String> {
        self.eval_json::<String>("JSON.stringify(document.body ? document.body.textContent : '')")
    }

    /// Type a single character into the focused element
    pub fn send_character(&self, ch: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.tab
            .send_character(ch.encode_utf8(&mut buf))
            .map_err(|e| ScrapeError::EvaluationFailed(format!("send character: {}", e)))?;
        Ok(())
    }

    /// Press a named key ("Escape", "Tab", ...) in the focused element
    pub fn press_key(&self, key: &str) -> Result<()> {
        self.tab
            .press_key(key)
            .map_err(|e| ScrapeError::EvaluationFailed(format!("press {}: {}", key, e)))?;
        Ok(())
    }

    /// Navigate back in browser history and wait for the page to load
    pub fn go_back(&self) -> Result<()> {
        self.eval("window.history.back()")?;
        std::thread::sleep(Duration::from_millis(300));
        self.wait_for_navigation("history back")
    }

    /// Capture a diagnostic snapshot of the page. Advisory only: failures are
    /// logged and never affect control flow.
    pub fn snapshot(&self, label: &str) {
        let Some(dir) = &self.snapshot_dir else {
            return;
        };

        let result = self
            .tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| e.to_string())
            .and_then(|png| {
                std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
                std::fs::write(dir.join(format!("{}.png", label)), png).map_err(|e| e.to_string())
            });

        match result {
            Ok(()) => log::debug!("captured snapshot {}", label),
            Err(e) => log::warn!("snapshot {} failed: {}", label, e),
        }
    }

    /// Close the browser's tabs, releasing the automation resource
    pub fn close(&self) -> Result<()> {
        // Browser has no public close method; closing all tabs shuts the
        // instance down and Drop does the rest
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| ScrapeError::TabOperationFailed(format!("failed to get tabs: {}", e)))?
            .clone();

        for tab in tabs {
            let _ = tab.close(false);
        }
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::debug!("browser teardown: {}", e);
        }
    }
}
