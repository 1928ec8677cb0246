//! Wait Mechanisms
//!
//! One polling primitive, [`poll`], backs every wait in the crate. The
//! [`Waiter`] specializes it into element conditions: presence, visibility,
//! clickability, attribute/text equality and absence.
//!
//! Waits never cache a handle between polls. Each probe re-resolves the
//! locator, so a node replaced mid-wait is simply found again.

use crate::clock::{CancellationToken, Clock};
use crate::config::{
    DEFAULT_ATTRIBUTE_TIMEOUT_MS, DEFAULT_DISAPPEAR_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS,
};
use crate::driver::{Driver, ElementHandle};
use crate::locator::Locator;
use crate::result::{PagewrightError, PagewrightResult};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Attribute name that means "the element's rendered text"
pub const TEXT_PSEUDO_ATTRIBUTE: &str = "text";

// =============================================================================
// WAIT CONDITION
// =============================================================================

/// What a wait is waiting for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WaitCondition {
    /// Any matching element exists in the document
    Present,
    /// A matching element is rendered visibly
    Visible,
    /// A matching element is visible and can receive a click
    Clickable,
    /// Attribute equals the value after trimming both sides
    AttributeEquals {
        /// Attribute name
        name: String,
        /// Expected value
        value: String,
    },
    /// Rendered text equals the value after trimming both sides
    TextEquals(String),
    /// No matching element exists
    Absent,
}

impl WaitCondition {
    /// Attribute condition; the reserved name `"text"` (any case) compares
    /// rendered text instead of an attribute.
    #[must_use]
    pub fn attribute_equals(name: &str, value: impl Into<String>) -> Self {
        if name.trim().eq_ignore_ascii_case(TEXT_PSEUDO_ATTRIBUTE) {
            Self::TextEquals(value.into())
        } else {
            Self::AttributeEquals {
                name: name.to_string(),
                value: value.into(),
            }
        }
    }

    /// Default timeout for this condition
    #[must_use]
    pub const fn default_timeout_ms(&self) -> u64 {
        match self {
            Self::Present | Self::Visible | Self::Clickable => DEFAULT_WAIT_TIMEOUT_MS,
            Self::Absent => DEFAULT_DISAPPEAR_TIMEOUT_MS,
            Self::AttributeEquals { .. } | Self::TextEquals(_) => DEFAULT_ATTRIBUTE_TIMEOUT_MS,
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Visible => write!(f, "visible"),
            Self::Clickable => write!(f, "clickable"),
            Self::AttributeEquals { name, value } => {
                write!(f, "having attribute '{name}' equal to '{value}'")
            }
            Self::TextEquals(value) => write!(f, "having text '{value}'"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options using the condition's default timeout
    #[must_use]
    pub fn for_condition(condition: &WaitCondition) -> Self {
        Self::new().with_timeout(condition.default_timeout_ms())
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// POLLING PRIMITIVE
// =============================================================================

/// Evaluate `probe` until it yields a value or the timeout elapses.
///
/// - `Ok(Some(v))` resolves the wait.
/// - `Ok(None)` and transient driver errors keep polling.
/// - Any other error aborts the wait.
///
/// The probe always runs at least once. The last sleep is clipped to the
/// remaining budget, so the call returns within `timeout` plus the time of
/// one probe.
pub fn poll<T, F>(
    clock: &dyn Clock,
    cancel: &CancellationToken,
    options: &WaitOptions,
    target: &str,
    condition: &str,
    mut probe: F,
) -> PagewrightResult<T>
where
    F: FnMut() -> PagewrightResult<Option<T>>,
{
    let start = clock.now();
    let timeout = options.timeout();
    let interval = options.poll_interval().max(Duration::from_millis(1));
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match probe() {
            Ok(Some(value)) => {
                debug!(
                    target_desc = target,
                    condition,
                    attempts,
                    elapsed_ms = clock.now().saturating_sub(start).as_millis() as u64,
                    "wait resolved"
                );
                return Ok(value);
            }
            Ok(None) => {}
            Err(err) if err.is_transient() => {
                debug!(target_desc = target, condition, error = %err, "transient failure while polling");
            }
            Err(err) => return Err(err),
        }

        let elapsed = clock.now().saturating_sub(start);
        if elapsed >= timeout {
            debug!(target_desc = target, condition, attempts, "wait timed out");
            return Err(PagewrightError::timeout(
                target,
                condition,
                options.timeout_ms,
            ));
        }

        if !clock.sleep_cancellable(interval.min(timeout - elapsed), cancel) {
            return Err(PagewrightError::Interrupted {
                context: format!("waiting for {target} to be {condition}"),
            });
        }
    }
}

// =============================================================================
// WAITER
// =============================================================================

/// Element waits over a driver
#[derive(Debug)]
pub struct Waiter<'a, D: Driver + ?Sized> {
    driver: &'a D,
    clock: &'a dyn Clock,
    cancel: &'a CancellationToken,
}

impl<'a, D: Driver + ?Sized> Waiter<'a, D> {
    /// Create a waiter
    pub fn new(driver: &'a D, clock: &'a dyn Clock, cancel: &'a CancellationToken) -> Self {
        Self {
            driver,
            clock,
            cancel,
        }
    }

    /// Wait until `condition` holds for `locator`.
    ///
    /// Returns the matching handle, or `None` for [`WaitCondition::Absent`].
    pub fn until(
        &self,
        locator: &Locator,
        condition: &WaitCondition,
        options: &WaitOptions,
    ) -> PagewrightResult<Option<ElementHandle>> {
        let target = locator.to_string();
        let description = condition.to_string();
        debug!(locator = %target, condition = %description, timeout_ms = options.timeout_ms, "waiting");
        poll(
            self.clock,
            self.cancel,
            options,
            &target,
            &description,
            || self.check(locator, condition),
        )
    }

    /// Like [`Waiter::until`] for conditions that always yield a handle.
    pub fn element(
        &self,
        locator: &Locator,
        condition: &WaitCondition,
        options: &WaitOptions,
    ) -> PagewrightResult<ElementHandle> {
        self.until(locator, condition, options)?
            .ok_or_else(|| PagewrightError::no_such_element(locator.to_string()))
    }

    /// Presence probe: timeouts and missing elements become `false`.
    pub fn is_present(&self, locator: &Locator, options: &WaitOptions) -> PagewrightResult<bool> {
        match self.until(locator, &WaitCondition::Present, options) {
            Ok(_) => Ok(true),
            Err(PagewrightError::Timeout { .. } | PagewrightError::NoSuchElement { .. }) => {
                debug!(locator = %locator, "element not present");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Wait for presence, then require presence at each of `seconds`
    /// one-second ticks.
    ///
    /// A cancelled tick is an error unless `interrupt_counts_as_success`.
    pub fn present_over_time(
        &self,
        locator: &Locator,
        seconds: u32,
        options: &WaitOptions,
        interrupt_counts_as_success: bool,
    ) -> PagewrightResult<bool> {
        self.until(locator, &WaitCondition::Present, options)?;

        for tick in 1..=seconds {
            if !self
                .clock
                .sleep_cancellable(Duration::from_secs(1), self.cancel)
            {
                if interrupt_counts_as_success {
                    warn!(locator = %locator, tick, "presence watch interrupted, reporting success");
                    return Ok(true);
                }
                return Err(PagewrightError::Interrupted {
                    context: format!("watching {locator} for presence (tick {tick} of {seconds})"),
                });
            }
            if self.driver.find_all(locator)?.is_empty() {
                debug!(locator = %locator, tick, "element vanished during presence watch");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Evaluate `condition` once. `Ok(None)` means "not yet".
    pub(crate) fn check(
        &self,
        locator: &Locator,
        condition: &WaitCondition,
    ) -> PagewrightResult<Option<Option<ElementHandle>>> {
        match condition {
            WaitCondition::Present => Ok(self.driver.find_all(locator)?.into_iter().next().map(Some)),
            WaitCondition::Visible => Ok(self.first_visible(locator)?.map(Some)),
            WaitCondition::Clickable => {
                for element in self.driver.find_all(locator)? {
                    if self.driver.is_displayed(&element)? && self.driver.is_interactable(&element)? {
                        return Ok(Some(Some(element)));
                    }
                }
                Ok(None)
            }
            WaitCondition::AttributeEquals { name, value } => {
                let Some(element) = self.driver.find_all(locator)?.into_iter().next() else {
                    return Ok(None);
                };
                let actual = self.driver.attribute(&element, name)?.unwrap_or_default();
                Ok((actual.trim() == value.trim()).then_some(Some(element)))
            }
            WaitCondition::TextEquals(value) => {
                let Some(element) = self.driver.find_all(locator)?.into_iter().next() else {
                    return Ok(None);
                };
                let actual = self.driver.text(&element)?;
                Ok((actual.trim() == value.trim()).then_some(Some(element)))
            }
            WaitCondition::Absent => Ok(self.driver.find_all(locator)?.is_empty().then_some(None)),
        }
    }

    fn first_visible(&self, locator: &Locator) -> PagewrightResult<Option<ElementHandle>> {
        for element in self.driver.find_all(locator)? {
            if self.driver.is_displayed(&element)? {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }
}

// =============================================================================
// TESTS
// =============================================================================
