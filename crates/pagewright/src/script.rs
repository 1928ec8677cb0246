//! In-page script helpers.
//!
//! For widgets that ignore synthetic pointer and key events, these run the
//! equivalent DOM call directly through [`Driver::execute_script`].

use crate::driver::{Driver, ScriptArg};
use crate::locator::Locator;
use crate::page_object::PageSession;
use crate::result::PagewrightResult;
use crate::text::SET_VALUE_SCRIPT;
use tracing::debug;

/// Click via the DOM
pub const CLICK_SCRIPT: &str = "arguments[0].click();";
/// Focus via the DOM
pub const FOCUS_SCRIPT: &str = "arguments[0].focus();";
/// Align the element with the top of the viewport
pub const SCROLL_INTO_VIEW_SCRIPT: &str = "arguments[0].scrollIntoView(true);";
/// Nudge the page down so fixed headers do not cover the element
pub const HEADER_OFFSET_SCRIPT: &str = "window.scrollBy(0,-190);";

/// Runs DOM snippets against located elements
#[derive(Debug)]
pub struct ScriptRunner<'a, D: Driver + ?Sized> {
    driver: &'a D,
}

impl<'a, D: Driver + ?Sized> ScriptRunner<'a, D> {
    /// Create a runner over `driver`
    pub fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Run `script` with the element at `locator` as `arguments[0]`
    fn on_element(&self, locator: &Locator, script: &str) -> PagewrightResult<()> {
        let element = self.driver.find_one(locator)?;
        debug!(locator = %locator, script, "running script on element");
        self.driver
            .execute_script(script, &[ScriptArg::from(&element)])
            .map(|_| ())
    }

    /// Click bypassing pointer hit-testing
    pub fn click(&self, locator: &Locator) -> PagewrightResult<()> {
        self.on_element(locator, CLICK_SCRIPT)
    }

    /// Give the element keyboard focus
    pub fn focus(&self, locator: &Locator) -> PagewrightResult<()> {
        self.on_element(locator, FOCUS_SCRIPT)
    }

    /// Scroll the element into view below a fixed header
    pub fn scroll_into_view(&self, locator: &Locator) -> PagewrightResult<()> {
        self.on_element(locator, SCROLL_INTO_VIEW_SCRIPT)?;
        self.driver.execute_script(HEADER_OFFSET_SCRIPT, &[]).map(|_| ())
    }

    /// Assign the form value without key events
    pub fn set_value(&self, locator: &Locator, value: &str) -> PagewrightResult<()> {
        let element = self.driver.find_one(locator)?;
        self.driver
            .execute_script(SET_VALUE_SCRIPT, &[ScriptArg::from(&element), ScriptArg::from(value)])
            .map(|_| ())
    }

    /// Navigate by assigning `window.location`
    pub fn navigate(&self, url: &str) -> PagewrightResult<()> {
        let literal = serde_json::Value::String(url.to_string());
        self.driver
            .execute_script(&format!("window.location = {literal};"), &[])
            .map(|_| ())
    }

    /// Run an arbitrary script
    pub fn run(&self, script: &str, args: &[ScriptArg]) -> PagewrightResult<serde_json::Value> {
        self.driver.execute_script(script, args)
    }
}

impl<D: Driver> PageSession<D> {
    /// Script helpers over this session's driver
    pub fn scripts(&self) -> ScriptRunner<'_, D> {
        ScriptRunner::new(self.driver())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::mock::{MockDriver, MockElement};
    use crate::result::PagewrightError;
    use std::time::Duration;

    fn driver(elements: Vec<MockElement>) -> MockDriver {
        let mut driver = MockDriver::new(FakeClock::new());
        for element in elements {
            driver = driver.with_element(element);
        }
        driver
    }

    #[test]
    fn test_script_click_ignores_overlay() {
        let driver = driver(vec![
            MockElement::new("menu").covered_until(Duration::from_secs(60))
        ]);
        assert!(driver.click(&driver.find_one(&Locator::id("menu")).unwrap()).is_err());
        ScriptRunner::new(&driver).click(&Locator::id("menu")).unwrap();
        assert!(driver.was_called("script:click:menu"));
        assert!(driver.was_called("click:menu"));
    }

    #[test]
    fn test_focus() {
        let driver = driver(vec![MockElement::input("search")]);
        ScriptRunner::new(&driver).focus(&Locator::id("search")).unwrap();
        assert!(driver.was_called("script:focus:search"));
    }

    #[test]
    fn test_scroll_into_view_then_offset() {
        let driver = driver(vec![MockElement::new("footer")]);
        ScriptRunner::new(&driver)
            .scroll_into_view(&Locator::id("footer"))
            .unwrap();
        assert_eq!(
            driver.history(),
            vec!["script:scroll_into_view:footer", "script:scroll_by"]
        );
    }

    #[test]
    fn test_set_value() {
        let driver = driver(vec![MockElement::input("qty").max_length(1)]);
        ScriptRunner::new(&driver)
            .set_value(&Locator::id("qty"), "250")
            .unwrap();
        assert_eq!(driver.element_value("qty").as_deref(), Some("250"));
    }

    #[test]
    fn test_navigate() {
        let driver = driver(vec![]);
        ScriptRunner::new(&driver)
            .navigate("http://automation.example")
            .unwrap();
        assert_eq!(driver.current_url().unwrap(), "http://automation.example");
    }

    #[test]
    fn test_missing_element() {
        let driver = driver(vec![]);
        let err = ScriptRunner::new(&driver)
            .click(&Locator::id("nope"))
            .unwrap_err();
        assert!(matches!(err, PagewrightError::NoSuchElement { .. }));
    }
}
