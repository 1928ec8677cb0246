//! Page Object Model Support
//!
//! A concrete page implements [`UrlProvider`] and drives the browser through
//! a [`PageSession`]. The session owns the driver, the configuration, the
//! clock all sleeps go through, and the cancellation token that interrupts
//! them. Nothing is global: two sessions never share state.
//!
//! The session's surface is split across modules: waits and lookups live
//! here, resilient actions in `actions`, text reads in `text`, windows and
//! dialogs in `window`, screenshots in `screenshot`.
//!
//! # Example
//!
//! ```
//! use pagewright::{FakeClock, Locator, MockDriver, MockElement, PageSession, UrlProvider};
//! use std::sync::Arc;
//!
//! struct LoginPage;
//!
//! impl UrlProvider for LoginPage {
//!     fn site_url(&self) -> String {
//!         "https://shop.example".into()
//!     }
//!     fn page_url(&self) -> String {
//!         "/login".into()
//!     }
//! }
//!
//! let clock = FakeClock::new();
//! let driver = MockDriver::new(clock.clone()).with_element(MockElement::input("user"));
//! let session = PageSession::new(driver).with_clock(Arc::new(clock));
//!
//! LoginPage.open(&session).unwrap();
//! session.enter_text(&Locator::id("user"), "alice").unwrap();
//! assert_eq!(session.get_text(&Locator::id("user")).unwrap(), "alice");
//! assert_eq!(session.current_url().unwrap(), "https://shop.example/login");
//! ```

use crate::clock::{CancellationToken, Clock, SystemClock};
use crate::config::PageConfig;
use crate::driver::{Driver, ElementHandle};
use crate::locator::Locator;
use crate::result::{PagewrightError, PagewrightResult};
use crate::wait::{WaitCondition, WaitOptions, Waiter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Site and page URL fragments of a concrete page
pub trait UrlProvider {
    /// Base URL of the site (e.g. `"https://shop.example"`)
    fn site_url(&self) -> String;

    /// Path of this page relative to the site (e.g. `"/login"`)
    fn page_url(&self) -> String;

    /// Full URL: `site_url` followed by `page_url`, no separator added
    fn url(&self) -> String {
        format!("{}{}", self.site_url(), self.page_url())
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Navigate `session` to this page
    fn open<D: Driver>(&self, session: &PageSession<D>) -> PagewrightResult<()>
    where
        Self: Sized,
    {
        info!(page = self.page_name(), "opening page");
        session.navigate_to(&self.url())
    }
}

/// Driver session plus the timing policy every helper runs under
#[derive(Debug)]
pub struct PageSession<D: Driver> {
    driver: D,
    config: PageConfig,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
}

impl<D: Driver> PageSession<D> {
    /// Session with default configuration on the wall clock
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            config: PageConfig::default(),
            clock: Arc::new(SystemClock::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the configuration as given.
    ///
    /// Values are not checked; use [`PageSession::try_with_config`] for
    /// configs built in code. `PageConfig::from_yaml_str` and
    /// `PageConfig::from_path` validate on load.
    #[must_use]
    pub fn with_config(mut self, config: PageConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the configuration after [`PageConfig::validate`]
    pub fn try_with_config(self, config: PageConfig) -> PagewrightResult<Self> {
        config.validate()?;
        Ok(self.with_config(config))
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Share a cancellation token with the owner of the session
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Underlying driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Active configuration
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Clock used for all waits and pauses
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Token that interrupts in-progress waits
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Waiter over this session's driver, clock and token
    pub fn waiter(&self) -> Waiter<'_, D> {
        Waiter::new(&self.driver, self.clock.as_ref(), &self.cancel)
    }

    /// Wait options with `timeout_ms` and the configured poll interval
    pub(crate) fn options(&self, timeout_ms: u64) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(self.config.poll_interval_ms)
    }

    /// Sleep on the session clock; fails with `Interrupted` if cancelled
    pub(crate) fn pause(&self, duration: Duration, context: &str) -> PagewrightResult<()> {
        if self.clock.sleep_cancellable(duration, &self.cancel) {
            Ok(())
        } else {
            Err(PagewrightError::Interrupted {
                context: context.to_string(),
            })
        }
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Navigate to `url` and log where the browser ended up
    pub fn navigate_to(&self, url: &str) -> PagewrightResult<()> {
        self.driver.navigate(url)?;
        let current = self.driver.current_url()?;
        info!(url = %current, "navigated");
        Ok(())
    }

    /// Reload the current page
    pub fn refresh_page(&self) -> PagewrightResult<()> {
        debug!("refreshing page");
        self.driver.refresh()
    }

    /// URL of the current page
    pub fn current_url(&self) -> PagewrightResult<String> {
        self.driver.current_url()
    }

    // =========================================================================
    // WAITS
    // =========================================================================

    /// Wait until a matching element exists
    pub fn wait_for_element(&self, locator: &Locator) -> PagewrightResult<ElementHandle> {
        self.wait_for_element_within(locator, self.config.wait_timeout_ms)
    }

    /// Wait until a matching element exists, with an explicit timeout
    pub fn wait_for_element_within(
        &self,
        locator: &Locator,
        timeout_ms: u64,
    ) -> PagewrightResult<ElementHandle> {
        self.waiter()
            .element(locator, &WaitCondition::Present, &self.options(timeout_ms))
    }

    /// Wait until a matching element is displayed
    pub fn wait_for_element_to_be_visible(
        &self,
        locator: &Locator,
    ) -> PagewrightResult<ElementHandle> {
        self.waiter().element(
            locator,
            &WaitCondition::Visible,
            &self.options(self.config.wait_timeout_ms),
        )
    }

    /// Wait until a matching element can receive a click
    pub fn wait_for_element_to_be_clickable(
        &self,
        locator: &Locator,
    ) -> PagewrightResult<ElementHandle> {
        self.wait_for_element_to_be_clickable_within(locator, self.config.wait_timeout_ms)
    }

    /// Clickable wait with an explicit timeout
    pub fn wait_for_element_to_be_clickable_within(
        &self,
        locator: &Locator,
        timeout_ms: u64,
    ) -> PagewrightResult<ElementHandle> {
        self.waiter()
            .element(locator, &WaitCondition::Clickable, &self.options(timeout_ms))
    }

    /// Wait until nothing matches
    pub fn wait_for_element_to_disappear(&self, locator: &Locator) -> PagewrightResult<()> {
        self.waiter()
            .until(
                locator,
                &WaitCondition::Absent,
                &self.options(self.config.disappear_timeout_ms),
            )
            .map(|_| ())
    }

    /// Wait until `attribute` equals `expected` with the default attribute timeout.
    ///
    /// The attribute name `"text"` compares the rendered text.
    pub fn wait_until_element_has_attribute(
        &self,
        locator: &Locator,
        attribute: &str,
        expected: &str,
    ) -> PagewrightResult<()> {
        self.wait_until_element_has_attribute_within(
            locator,
            attribute,
            expected,
            self.config.attribute_timeout_ms,
        )
    }

    /// Attribute wait with an explicit timeout.
    ///
    /// Lets the page settle first, then probes presence before polling the
    /// value. A probe miss is logged and the wait still runs, so a missing
    /// element surfaces as a timeout naming the attribute condition.
    pub fn wait_until_element_has_attribute_within(
        &self,
        locator: &Locator,
        attribute: &str,
        expected: &str,
        timeout_ms: u64,
    ) -> PagewrightResult<()> {
        self.pause(
            Duration::from_millis(self.config.attribute_settle_delay_ms),
            "settling before attribute wait",
        )?;
        if !self.is_element_present_within(locator, self.config.attribute_probe_timeout_ms)? {
            warn!(locator = %locator, attribute, "element not present before attribute wait");
        }
        let condition = WaitCondition::attribute_equals(attribute, expected);
        self.waiter()
            .until(locator, &condition, &self.options(timeout_ms))
            .map(|_| ())
    }

    // =========================================================================
    // PROBES
    // =========================================================================

    /// Whether a matching element appears within the presence probe timeout
    pub fn is_element_present(&self, locator: &Locator) -> PagewrightResult<bool> {
        self.is_element_present_within(locator, self.config.presence_probe_timeout_ms)
    }

    /// Whether a matching element appears within `timeout_ms`
    pub fn is_element_present_within(
        &self,
        locator: &Locator,
        timeout_ms: u64,
    ) -> PagewrightResult<bool> {
        self.waiter().is_present(locator, &self.options(timeout_ms))
    }

    /// Whether the element, once present, stays present for `seconds` checks
    pub fn is_element_present_over_time(
        &self,
        locator: &Locator,
        seconds: u32,
    ) -> PagewrightResult<bool> {
        self.waiter().present_over_time(
            locator,
            seconds,
            &self.options(self.config.wait_timeout_ms),
            self.config.interrupt_counts_as_success,
        )
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    /// First displayed match, if any; no waiting
    pub fn get_visible_element(&self, locator: &Locator) -> PagewrightResult<Option<ElementHandle>> {
        let elements = self.driver.find_all(locator)?;
        debug!(locator = %locator, count = elements.len(), "finding visible element");
        for element in elements {
            if self.driver.is_displayed(&element)? {
                return Ok(Some(element));
            }
        }
        warn!(locator = %locator, "no element was visible");
        Ok(None)
    }

    /// All displayed matches; no waiting
    pub fn get_visible_elements(&self, locator: &Locator) -> PagewrightResult<Vec<ElementHandle>> {
        let mut visible = Vec::new();
        for element in self.driver.find_all(locator)? {
            if self.driver.is_displayed(&element)? {
                visible.push(element);
            }
        }
        debug!(locator = %locator, count = visible.len(), "found visible elements");
        Ok(visible)
    }

    /// Wait for visibility, then return every match
    pub fn get_elements(&self, locator: &Locator) -> PagewrightResult<Vec<ElementHandle>> {
        self.wait_for_element_to_be_visible(locator)?;
        self.driver.find_all(locator)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::mock::{MockDriver, MockElement};

    fn session(elements: Vec<MockElement>) -> (FakeClock, PageSession<MockDriver>) {
        let clock = FakeClock::new();
        let mut driver = MockDriver::new(clock.clone());
        for element in elements {
            driver = driver.with_element(element);
        }
        let session = PageSession::new(driver).with_clock(Arc::new(clock.clone()));
        (clock, session)
    }

    struct Checkout;

    impl UrlProvider for Checkout {
        fn site_url(&self) -> String {
            "https://shop.example".to_string()
        }

        fn page_url(&self) -> String {
            "/checkout".to_string()
        }
    }

    mod url_provider_tests {
        use super::*;

        #[test]
        fn test_url_concatenates_fragments() {
            assert_eq!(Checkout.url(), "https://shop.example/checkout");
        }

        #[test]
        fn test_page_name_defaults_to_type_name() {
            assert!(Checkout.page_name().ends_with("Checkout"));
        }

        #[test]
        fn test_open_navigates() {
            let (_, session) = session(vec![]);
            Checkout.open(&session).unwrap();
            assert_eq!(session.current_url().unwrap(), "https://shop.example/checkout");
            assert!(session.driver().was_called("navigate:https://shop.example/checkout"));
        }
    }

    mod wait_tests {
        use super::*;

        #[test]
        fn test_is_element_present_false_within_budget() {
            let (clock, session) = session(vec![]);
            assert!(!session.is_element_present(&Locator::id("nothing")).unwrap());
            let budget = session.config().presence_probe_timeout_ms + session.config().poll_interval_ms;
            assert!(clock.now_ms() <= budget);
        }

        #[test]
        fn test_wait_for_element_timeout_names_locator_and_condition() {
            let (_, session) = session(vec![]);
            let err = session
                .wait_for_element_within(&Locator::css("#cart"), 1_000)
                .unwrap_err();
            let message = err.to_string();
            assert!(message.contains("By.cssSelector: #cart"));
            assert!(message.contains("present"));
        }

        #[test]
        fn test_attribute_text_wait_resolves_after_transition() {
            let (clock, session) = session(vec![MockElement::new("status")
                .text("Pending")
                .text_at(Duration::from_secs(3), "Done")]);
            session
                .wait_until_element_has_attribute_within(&Locator::id("status"), "text", "Done", 10_000)
                .unwrap();
            assert!(clock.now_ms() >= 3_000);
            assert!(clock.now_ms() < 2_000 + 10_000);
        }

        #[test]
        fn test_attribute_wait_times_out() {
            let (_, session) =
                session(vec![MockElement::new("row").attribute("aria-busy", "true")]);
            let err = session
                .wait_until_element_has_attribute_within(&Locator::id("row"), "aria-busy", "false", 1_000)
                .unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("aria-busy"));
        }

        #[test]
        fn test_disappear_uses_disappear_timeout() {
            let (clock, session) = session(vec![MockElement::new("spinner")]);
            let err = session
                .wait_for_element_to_disappear(&Locator::id("spinner"))
                .unwrap_err();
            assert!(err.is_timeout());
            assert_eq!(clock.now_ms(), session.config().disappear_timeout_ms);
        }

        #[test]
        fn test_present_over_time_interrupt_policy_follows_config() {
            let (_, session) = session(vec![MockElement::new("banner")]);
            let session = session.with_config(PageConfig::new().with_interrupt_counts_as_success(true));
            session.cancellation_token().cancel();
            assert!(session
                .is_element_present_over_time(&Locator::id("banner"), 2)
                .unwrap());
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_try_with_config_rejects_invalid() {
            let (_, session) = session(vec![]);
            let config = PageConfig {
                stale_retry_attempts: 0,
                ..PageConfig::default()
            };
            let err = session.try_with_config(config).unwrap_err();
            assert!(matches!(err, PagewrightError::Config { .. }));
        }

        #[test]
        fn test_try_with_config_accepts_valid() {
            let (_, session) = session(vec![]);
            let session = session
                .try_with_config(PageConfig::new().with_wait_timeout(1_000))
                .unwrap();
            assert_eq!(session.config().wait_timeout_ms, 1_000);
        }
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_get_visible_element_skips_hidden() {
            let (_, session) = session(vec![
                MockElement::new("a").class("item").hidden(),
                MockElement::new("b").class("item"),
            ]);
            let found = session
                .get_visible_element(&Locator::class_name("item"))
                .unwrap()
                .unwrap();
            assert!(found.id().starts_with("b#"));
            assert_eq!(
                session
                    .get_visible_elements(&Locator::class_name("item"))
                    .unwrap()
                    .len(),
                1
            );
        }

        #[test]
        fn test_get_visible_element_none_when_all_hidden() {
            let (_, session) = session(vec![MockElement::new("a").hidden()]);
            assert!(session.get_visible_element(&Locator::id("a")).unwrap().is_none());
        }

        #[test]
        fn test_get_elements_waits_for_visibility() {
            let (clock, session) = session(vec![
                MockElement::new("r1").class("row").appears_at(Duration::from_millis(400)),
                MockElement::new("r2").class("row").appears_at(Duration::from_millis(400)),
            ]);
            let rows = session.get_elements(&Locator::class_name("row")).unwrap();
            assert_eq!(rows.len(), 2);
            assert!(clock.now_ms() >= 400);
        }
    }
}
