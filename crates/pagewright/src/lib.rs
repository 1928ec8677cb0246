//! Pagewright: Page Object helpers for browser UI tests
//!
//! Pagewright wraps any browser-automation backend that implements
//! [`Driver`] with explicit polling waits, actions that recover from flaky
//! pages, and a text-entry strategy that switches from typing to value
//! injection for long inputs.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────────────────────┐    ┌──────────┐
//! │ Page type    │    │ PageSession                      │    │ Driver   │
//! │ (UrlProvider)│───►│ actions ─► waits ─► poll(clock)  │───►│ (trait)  │
//! └──────────────┘    └──────────────────────────────────┘    └──────────┘
//! ```
//!
//! Everything is synchronous. The only blocking happens in
//! [`Clock::sleep`], so tests run on a [`FakeClock`] and finish instantly.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod actions;
mod clock;
mod config;
mod driver;
mod locator;
mod logging;
mod page_object;
mod result;
mod screenshot;
mod script;
mod text;
mod validation;
mod wait;
mod window;

/// In-memory driver for testing page objects without a browser
#[allow(clippy::missing_panics_doc, clippy::too_many_lines)]
pub mod mock;

pub use clock::{CancellationToken, Clock, FakeClock, SystemClock};
pub use config::{
    PageConfig, DEFAULT_ATTRIBUTE_TIMEOUT_MS, DEFAULT_DISAPPEAR_TIMEOUT_MS, DEFAULT_DRAG_PAUSE_MS,
    DEFAULT_LONG_TEXT_THRESHOLD, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PRESENCE_PROBE_TIMEOUT_MS,
    DEFAULT_WAIT_TIMEOUT_MS,
};
pub use driver::{
    ActionChain, Driver, ElementHandle, Key, KeyInput, PointerAction, Screenshot, ScriptArg,
};
pub use locator::Locator;
pub use logging::{init_logging, init_logging_with, LogFormat, LOG_ENV_VAR};
pub use mock::{MockDriver, MockElement};
pub use page_object::{PageSession, UrlProvider};
pub use result::{PagewrightError, PagewrightResult};
pub use screenshot::screenshot_file_name;
pub use script::{
    ScriptRunner, CLICK_SCRIPT, FOCUS_SCRIPT, HEADER_OFFSET_SCRIPT, SCROLL_INTO_VIEW_SCRIPT,
};
pub use text::{choose_strategy, read_text, write_text, TextEntryStrategy, SET_VALUE_SCRIPT};
pub use validation::{check_password, find_index_of_string, random_string, MIN_PASSWORD_LENGTH};
pub use wait::{poll, WaitCondition, WaitOptions, Waiter, TEXT_PSEUDO_ATTRIBUTE};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        Driver, ElementHandle, Locator, PageConfig, PageSession, PagewrightError,
        PagewrightResult, UrlProvider, WaitCondition, WaitOptions,
    };
}
