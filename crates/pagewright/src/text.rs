//! Text entry and retrieval.
//!
//! Writing picks a [`TextEntryStrategy`] from the input length: short text
//! is typed as key events so per-keystroke listeners fire, long text is
//! injected into the form value in one script call.
//!
//! Reading goes through [`read_text`], which falls back from rendered text
//! to the `value` attribute to the `innerText` property and never fails.

use crate::driver::{Driver, ElementHandle, ScriptArg};
use crate::locator::Locator;
use crate::page_object::PageSession;
use crate::result::{PagewrightError, PagewrightResult};
use std::time::Duration;
use tracing::debug;

/// Script that assigns `arguments[1]` to the value of `arguments[0]`
pub const SET_VALUE_SCRIPT: &str = "arguments[0].value = arguments[1];";

/// How `enter_text` writes into a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEntryStrategy {
    /// Empty input: leave the field cleared
    Clear,
    /// Discrete key events
    KeyInput,
    /// Direct value injection via script
    ScriptInjection,
}

/// Pick the strategy for `text`.
///
/// Length is counted in Unicode scalar values; text at or above
/// `threshold` is injected.
#[must_use]
pub fn choose_strategy(text: &str, threshold: usize) -> TextEntryStrategy {
    if text.is_empty() {
        TextEntryStrategy::Clear
    } else if text.chars().count() < threshold {
        TextEntryStrategy::KeyInput
    } else {
        TextEntryStrategy::ScriptInjection
    }
}

/// Write `text` into `element` using `strategy`
pub fn write_text<D: Driver + ?Sized>(
    driver: &D,
    element: &ElementHandle,
    text: &str,
    strategy: TextEntryStrategy,
) -> PagewrightResult<()> {
    match strategy {
        TextEntryStrategy::Clear => Ok(()),
        TextEntryStrategy::KeyInput => driver.send_keys(element, text),
        TextEntryStrategy::ScriptInjection => driver
            .execute_script(SET_VALUE_SCRIPT, &[ScriptArg::from(element), ScriptArg::from(text)])
            .map(|_| ()),
    }
}

/// Best-effort text of an element.
///
/// Tries rendered text, then the `value` attribute, then `innerText`.
/// Read failures count as empty; returns `""` when every source is empty.
pub fn read_text<D: Driver + ?Sized>(driver: &D, element: &ElementHandle) -> String {
    match driver.text(element) {
        Ok(text) if !text.is_empty() => return text,
        Ok(_) => {}
        Err(err) => debug!(element = %element, error = %err, "text read failed"),
    }
    for source in ["value", "innerText"] {
        match driver.attribute(element, source) {
            Ok(Some(text)) if !text.is_empty() => return text,
            Ok(_) => {}
            Err(err) => debug!(element = %element, source, error = %err, "attribute read failed"),
        }
    }
    String::new()
}

impl<D: Driver> PageSession<D> {
    /// Text of the element at `locator`, after a presence probe
    pub fn get_text(&self, locator: &Locator) -> PagewrightResult<String> {
        self.is_element_present_within(locator, self.config().text_probe_timeout_ms)?;
        let element = self.driver().find_one(locator)?;
        Ok(read_text(self.driver(), &element))
    }

    /// Best-effort text of an already resolved element
    pub fn get_element_text(&self, element: &ElementHandle) -> String {
        read_text(self.driver(), element)
    }

    /// Rendered text of a visible element, re-reading while the node is stale.
    ///
    /// Reads at least once even when `stale_retry_attempts` is zero.
    pub fn get_text_value(&self, locator: &Locator) -> PagewrightResult<String> {
        let attempts = self.config().stale_retry_attempts.max(1);
        let delay = Duration::from_millis(self.config().stale_retry_delay_ms);
        for attempt in 1..=attempts {
            let element = self.wait_for_element_to_be_visible(locator)?;
            match self.driver().text(&element) {
                Ok(text) => return Ok(text),
                Err(PagewrightError::StaleReference { .. }) => {
                    debug!(locator = %locator, attempt, "element was stale, retrying");
                    self.pause(delay, "retrying a stale text read")?;
                }
                Err(err) => return Err(err),
            }
        }
        Err(PagewrightError::stale(locator.to_string()))
    }

    /// Attribute of the element at `locator`, after a presence probe
    pub fn get_element_value(
        &self,
        locator: &Locator,
        attribute: &str,
    ) -> PagewrightResult<Option<String>> {
        self.is_element_present_within(locator, self.config().presence_probe_timeout_ms)?;
        let element = self.driver().find_one(locator)?;
        self.driver().attribute(&element, attribute)
    }

    /// Best-effort text of each element
    pub fn get_texts(&self, elements: &[ElementHandle]) -> Vec<String> {
        elements
            .iter()
            .map(|element| read_text(self.driver(), element))
            .collect()
    }
}
