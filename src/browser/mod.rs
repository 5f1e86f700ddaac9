//! Browser session management and configuration
//!
//! Wraps `headless_chrome` with a single-tab session, JSON-returning script
//! evaluation, bounded element waits and advisory page snapshots.

pub mod config;
pub mod session;

pub use config::{LaunchOptions, NAVIGATION_TIMEOUT, STEP_SETTLE};
pub use session::BrowserSession;
