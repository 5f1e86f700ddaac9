use std::path::PathBuf;
use std::time::Duration;

/// Hard per-navigation timeout. A step that exceeds this surfaces as
/// [`crate::ScrapeError::Timeout`] and is never retried automatically.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Settle delay after each navigation step, giving the portal's server-side
/// rendering time to finish before verification
pub const STEP_SETTLE: Duration = Duration::from_secs(2);

/// Options for launching the automated browser
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window (default: true)
    pub headless: bool,

    /// Browser window width in pixels
    pub window_width: u32,

    /// Browser window height in pixels
    pub window_height: u32,

    /// Path to the Chrome/Chromium binary; autodetected when `None`
    pub chrome_path: Option<PathBuf>,

    /// User data directory for the browser profile
    pub user_data_dir: Option<PathBuf>,

    /// Enable the Chrome sandbox (disable in containers)
    pub sandbox: bool,

    /// Directory for advisory page snapshots taken after each navigation
    /// step. Snapshots never affect control flow; `None` disables them.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 1024,
            chrome_path: None,
            user_data_dir: None,
            sandbox: false,
            snapshot_dir: None,
        }
    }
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_options_builder() {
        let opts = LaunchOptions::new().headless(false).window_size(800, 600);

        assert!(!opts.headless);
        assert_eq!(opts.window_width, 800);
        assert_eq!(opts.window_height, 600);
        assert!(opts.snapshot_dir.is_none());
    }

    #[test]
    fn test_snapshot_dir_builder() {
        let opts = LaunchOptions::new().snapshot_dir("/tmp/snaps");
        assert_eq!(opts.snapshot_dir.unwrap(), PathBuf::from("/tmp/snaps"));
    }
}
