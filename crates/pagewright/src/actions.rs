//! Resilient actions.
//!
//! Each action pairs a wait with the driver call and, where pages are
//! known to be flaky, a fallback chain. Transient failures (stale handle,
//! intercepted click, element not yet there) are absorbed by the chain;
//! only a failure of the last step reaches the caller.

use crate::driver::{ActionChain, Driver, ElementHandle, KeyInput};
use crate::locator::Locator;
use crate::page_object::PageSession;
use crate::result::{PagewrightError, PagewrightResult};
use crate::text::{choose_strategy, read_text, write_text};
use crate::wait::{poll, WaitCondition};
use std::time::Duration;
use tracing::{debug, info, warn};

impl<D: Driver> PageSession<D> {
    // =========================================================================
    // CLICKS
    // =========================================================================

    /// Click with fallbacks.
    ///
    /// 1. Wait until clickable, click.
    /// 2. Move the pointer onto the element (best effort).
    /// 3. Wait until clickable again with the retry timeout, clicking on
    ///    every poll until a click lands.
    /// 4. Re-resolve and click directly. This step's failure propagates.
    ///
    /// Only timeouts and transient driver errors move the chain to the next
    /// step. Anything else, including `Interrupted`, is returned at once.
    pub fn click(&self, locator: &Locator) -> PagewrightResult<()> {
        let first = self
            .wait_for_element_to_be_clickable(locator)
            .and_then(|element| self.driver().click(&element));
        let err = match first {
            Ok(()) => return Ok(()),
            Err(err) if Self::recoverable(&err) => err,
            Err(err) => return Err(err),
        };
        warn!(locator = %locator, error = %err, "click failed, moving pointer onto element");

        if let Err(err) = self.set_focus(locator) {
            debug!(locator = %locator, error = %err, "pointer move failed");
        }

        let retry = self.click_when_clickable(locator, self.config().retry_click_timeout_ms);
        let err = match retry {
            Ok(()) => return Ok(()),
            Err(err) if Self::recoverable(&err) => err,
            Err(err) => return Err(err),
        };
        warn!(locator = %locator, error = %err, "retry click failed, re-finding element");

        let element = self.driver().find_one(locator)?;
        self.driver().click(&element)
    }

    /// Click an already resolved element; no waiting
    pub fn click_element_direct(&self, element: &ElementHandle) -> PagewrightResult<()> {
        self.driver().click(element)
    }

    /// Click once clickable within `timeout_ms`.
    ///
    /// Returns `false` instead of failing when the element never becomes
    /// clickable or the click does not land.
    pub fn click_if_ready(&self, locator: &Locator, timeout_ms: u64) -> PagewrightResult<bool> {
        debug!(locator = %locator, timeout_ms, "waiting for element to be clickable");
        Self::absorb(
            locator,
            self.wait_for_element_to_be_clickable_within(locator, timeout_ms)
                .and_then(|element| self.driver().click(&element)),
        )
    }

    /// Click once visible within `timeout_ms`; `false` if that never happens
    pub fn click_if_visible(&self, locator: &Locator, timeout_ms: u64) -> PagewrightResult<bool> {
        let visible = self
            .waiter()
            .element(locator, &WaitCondition::Visible, &self.options(timeout_ms));
        Self::absorb(
            locator,
            visible.and_then(|element| self.driver().click(&element)),
        )
    }

    // Failures the next step of a fallback chain can still fix.
    fn recoverable(err: &PagewrightError) -> bool {
        err.is_timeout() || err.is_transient()
    }

    fn absorb(locator: &Locator, outcome: PagewrightResult<()>) -> PagewrightResult<bool> {
        match outcome {
            Ok(()) => Ok(true),
            Err(err) if Self::recoverable(&err) => {
                warn!(locator = %locator, error = %err, "element not ready, skipping click");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    // Clickable wait whose probe also performs the click, so an intercepted
    // click keeps the wait going instead of ending it.
    fn click_when_clickable(&self, locator: &Locator, timeout_ms: u64) -> PagewrightResult<()> {
        let waiter = self.waiter();
        let condition = WaitCondition::Clickable;
        poll(
            self.clock(),
            self.cancellation_token(),
            &self.options(timeout_ms),
            &locator.to_string(),
            &condition.to_string(),
            || match waiter.check(locator, &condition)? {
                Some(Some(element)) => {
                    self.driver().click(&element)?;
                    Ok(Some(()))
                }
                _ => Ok(None),
            },
        )
    }

    // =========================================================================
    // TEXT ENTRY
    // =========================================================================

    /// Replace the content of a field with `text`.
    ///
    /// Focus and clear are best effort. A field that still shows content
    /// gets a select-all/delete before writing. Empty `text` leaves the
    /// field cleared.
    pub fn enter_text(&self, locator: &Locator, text: &str) -> PagewrightResult<()> {
        self.wait_for_element(locator)?;
        let element = self.driver().find_one(locator)?;

        if let Err(err) = self.driver().click(&element) {
            debug!(locator = %locator, error = %err, "focus click failed");
        }
        if let Err(err) = self.driver().clear(&element) {
            debug!(locator = %locator, error = %err, "clear failed");
        }
        if !read_text(self.driver(), &element).is_empty() {
            debug!(locator = %locator, "field not empty after clear, selecting all");
            self.driver()
                .send_key_sequence(&element, &KeyInput::select_all_and_delete())?;
        }

        let strategy = choose_strategy(text, self.config().long_text_threshold);
        debug!(locator = %locator, ?strategy, chars = text.chars().count(), "entering text");
        write_text(self.driver(), &element, text, strategy)
    }

    /// Type `value` after a presence wait; an empty value clears instead
    pub fn fill_text_field(&self, locator: &Locator, value: &str) -> PagewrightResult<()> {
        let element = self.wait_for_element(locator)?;
        if value.is_empty() {
            self.driver().clear(&element)
        } else {
            self.driver().send_keys(&element, value)
        }
    }

    /// Clear a field after a presence wait
    pub fn clear_text_field(&self, locator: &Locator) -> PagewrightResult<()> {
        let element = self.wait_for_element(locator)?;
        self.driver().clear(&element)
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    /// Select the option with exactly `text` once it has been populated.
    ///
    /// A control with no options at all is left untouched.
    pub fn select_dropdown_by_visible_text(
        &self,
        locator: &Locator,
        text: &str,
    ) -> PagewrightResult<()> {
        let control = self.wait_for_element(locator)?;
        let options = self
            .driver()
            .find_children(&control, &Locator::tag_name("option"))?;
        if options.is_empty() {
            warn!(locator = %locator, "dropdown has no options, skipping selection");
            return Ok(());
        }
        self.wait_for_element(&Locator::contains_text("option", text))?;
        self.select_by_visible_text(locator, text)
    }

    /// Select the option whose trimmed text equals `text`; no waiting
    pub fn select_by_visible_text(&self, locator: &Locator, text: &str) -> PagewrightResult<()> {
        let control = self.driver().find_one(locator)?;
        for option in self
            .driver()
            .find_children(&control, &Locator::tag_name("option"))?
        {
            if self.driver().text(&option)?.trim() != text.trim() {
                continue;
            }
            if !self.driver().is_selected(&option)? {
                self.driver().click(&option)?;
            }
            info!(locator = %locator, option = text, "option selected");
            return Ok(());
        }
        Err(PagewrightError::no_such_element(format!(
            "{locator} option with text '{text}'"
        )))
    }

    /// Texts of every option of a dropdown
    pub fn dropdown_option_texts(&self, locator: &Locator) -> PagewrightResult<Vec<String>> {
        let control = self.driver().find_one(locator)?;
        let texts: Vec<String> = self
            .driver()
            .find_children(&control, &Locator::tag_name("option"))?
            .iter()
            .map(|option| read_text(self.driver(), option))
            .collect();
        debug!(locator = %locator, options = ?texts, "dropdown options");
        Ok(texts)
    }

    /// Click every unselected checkbox or radio matching `locator`.
    ///
    /// Returns how many were clicked.
    pub fn select_all_buttons(&self, locator: &Locator) -> PagewrightResult<usize> {
        let buttons = self.driver().find_all(locator)?;
        debug!(locator = %locator, count = buttons.len(), "selecting buttons");
        let pause = Duration::from_millis(self.config().button_click_pause_ms);
        let mut clicked = 0;
        for button in &buttons {
            if !self.driver().is_selected(button)? {
                self.driver().click(button)?;
                clicked += 1;
                self.pause(pause, "pausing between button clicks")?;
            }
        }
        Ok(clicked)
    }

    // =========================================================================
    // POINTER GESTURES
    // =========================================================================

    /// Drag `source` onto `target`, holding for the configured pause
    pub fn drag_and_drop(&self, source: &Locator, target: &Locator) -> PagewrightResult<()> {
        self.drag_and_drop_with_pause(source, target, self.config().drag_pause())
    }

    /// Press on `source`, move onto `target`, hold for `pause`, release on `target`
    pub fn drag_and_drop_with_pause(
        &self,
        source: &Locator,
        target: &Locator,
        pause: Duration,
    ) -> PagewrightResult<()> {
        let from = self.driver().find_one(source)?;
        let to = self.driver().find_one(target)?;
        self.driver()
            .perform_actions(&ActionChain::new().press_on(&from).move_to(&to).build())?;
        self.pause(pause, "holding over drop target")?;
        let to = self.driver().find_one(target)?;
        self.driver()
            .perform_actions(&ActionChain::new().release_on(&to).build())?;
        debug!(source = %source, target = %target, "dropped");
        Ok(())
    }

    /// Drag a slider handle by a pixel offset
    pub fn slider(&self, locator: &Locator, x_offset: i32, y_offset: i32) -> PagewrightResult<()> {
        let handle = self.driver().find_one(locator)?;
        self.driver().perform_actions(
            &ActionChain::new()
                .press_on(&handle)
                .move_by(x_offset, y_offset)
                .release()
                .build(),
        )
    }

    /// Move the pointer onto the element
    pub fn hover(&self, locator: &Locator) -> PagewrightResult<()> {
        let element = self.driver().find_one(locator)?;
        self.driver()
            .perform_actions(&ActionChain::new().move_to(&element).build())
    }

    /// Pointer focus; same gesture as [`PageSession::hover`]
    pub fn set_focus(&self, locator: &Locator) -> PagewrightResult<()> {
        self.hover(locator)
    }

    /// Hover `menu` to reveal `item`, then click `item` with the pointer
    pub fn hover_and_click(&self, menu: &Locator, item: &Locator) -> PagewrightResult<()> {
        self.hover(menu)?;
        self.wait_for_element(item)?;
        let target = self.driver().find_one(item)?;
        self.driver()
            .perform_actions(&ActionChain::new().move_to(&target).click().build())
    }
}
