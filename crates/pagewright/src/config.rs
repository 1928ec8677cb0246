//! Session configuration.
//!
//! Every timeout and magic number the helpers use lives here so a suite can
//! tune them from one YAML file instead of patching call sites.

use crate::result::{PagewrightError, PagewrightResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default timeout for presence/visibility/clickable waits (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default timeout for disappearance waits (10 seconds)
pub const DEFAULT_DISAPPEAR_TIMEOUT_MS: u64 = 10_000;

/// Default timeout for attribute waits (180 seconds)
pub const DEFAULT_ATTRIBUTE_TIMEOUT_MS: u64 = 180_000;

/// Default timeout for boolean presence probes (5 seconds)
pub const DEFAULT_PRESENCE_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Inputs at least this long are injected instead of typed
pub const DEFAULT_LONG_TEXT_THRESHOLD: usize = 500;

/// Default hold time over a drop target (2 seconds)
pub const DEFAULT_DRAG_PAUSE_MS: u64 = 2_000;

/// Configuration for a [`PageSession`](crate::PageSession)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Presence, visibility and clickable waits
    pub wait_timeout_ms: u64,
    /// Disappearance waits
    pub disappear_timeout_ms: u64,
    /// Attribute/text waits when no timeout is given
    pub attribute_timeout_ms: u64,
    /// `is_element_present` without an explicit timeout
    pub presence_probe_timeout_ms: u64,
    /// Presence probe before an attribute wait
    pub attribute_probe_timeout_ms: u64,
    /// Presence probe before reading text
    pub text_probe_timeout_ms: u64,
    /// Second clickable wait in the click fallback chain
    pub retry_click_timeout_ms: u64,
    /// Settle delay before an attribute wait starts
    pub attribute_settle_delay_ms: u64,
    /// Delay between polls
    pub poll_interval_ms: u64,
    /// Text length at which `enter_text` switches to script injection
    pub long_text_threshold: usize,
    /// Hold time over a drop target
    pub drag_pause_ms: u64,
    /// Pause between clicks in `select_all_buttons`
    pub button_click_pause_ms: u64,
    /// Attempts for stale-tolerant text reads
    pub stale_retry_attempts: u32,
    /// Delay between stale-tolerant text reads
    pub stale_retry_delay_ms: u64,
    /// Directory for screenshots
    pub screenshot_dir: PathBuf,
    /// Length of the random part of screenshot file names
    pub screenshot_name_length: usize,
    /// Treat a cancelled `is_element_present_over_time` as success
    pub interrupt_counts_as_success: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            disappear_timeout_ms: DEFAULT_DISAPPEAR_TIMEOUT_MS,
            attribute_timeout_ms: DEFAULT_ATTRIBUTE_TIMEOUT_MS,
            presence_probe_timeout_ms: DEFAULT_PRESENCE_PROBE_TIMEOUT_MS,
            attribute_probe_timeout_ms: 20_000,
            text_probe_timeout_ms: 25_000,
            retry_click_timeout_ms: 10_000,
            attribute_settle_delay_ms: 2_000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            long_text_threshold: DEFAULT_LONG_TEXT_THRESHOLD,
            drag_pause_ms: DEFAULT_DRAG_PAUSE_MS,
            button_click_pause_ms: 200,
            stale_retry_attempts: 30,
            stale_retry_delay_ms: 500,
            screenshot_dir: PathBuf::from("target/screenshots"),
            screenshot_name_length: 5,
            interrupt_counts_as_success: false,
        }
    }
}

impl PageConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from YAML; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> PagewrightResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> PagewrightResult<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }

    /// Reject values that would make waits spin or never switch strategy
    pub fn validate(&self) -> PagewrightResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(PagewrightError::config("poll_interval_ms must be > 0"));
        }
        if self.long_text_threshold == 0 {
            return Err(PagewrightError::config("long_text_threshold must be > 0"));
        }
        if self.stale_retry_attempts == 0 {
            return Err(PagewrightError::config("stale_retry_attempts must be > 0"));
        }
        Ok(())
    }

    /// Set the presence/visibility/clickable timeout
    #[must_use]
    pub const fn with_wait_timeout(mut self, timeout_ms: u64) -> Self {
        self.wait_timeout_ms = timeout_ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set the long-text threshold
    #[must_use]
    pub const fn with_long_text_threshold(mut self, threshold: usize) -> Self {
        self.long_text_threshold = threshold;
        self
    }

    /// Set the drag-and-drop hold time
    #[must_use]
    pub const fn with_drag_pause(mut self, pause_ms: u64) -> Self {
        self.drag_pause_ms = pause_ms;
        self
    }

    /// Set the screenshot directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Keep the legacy "interrupted means present" behaviour
    #[must_use]
    pub const fn with_interrupt_counts_as_success(mut self, enabled: bool) -> Self {
        self.interrupt_counts_as_success = enabled;
        self
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Drag pause as Duration
    #[must_use]
    pub const fn drag_pause(&self) -> Duration {
        Duration::from_millis(self.drag_pause_ms)
    }
}
