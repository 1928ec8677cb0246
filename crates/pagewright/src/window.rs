//! Windows, frames and alert dialogs.

use crate::driver::Driver;
use crate::locator::Locator;
use crate::page_object::PageSession;
use crate::result::{PagewrightError, PagewrightResult};
use tracing::{debug, info};

impl<D: Driver> PageSession<D> {
    /// Click a link that opens a window and focus the new window.
    ///
    /// Returns the handle switched to. With several new windows the last
    /// one reported by the driver wins.
    pub fn switch_to_new_window(&self, link: &Locator) -> PagewrightResult<String> {
        let parent = self.driver().current_window_handle()?;
        debug!(parent = %parent, "parent window");
        let element = self.driver().find_one(link)?;
        self.driver().click(&element)?;

        let handles = self.driver().window_handles()?;
        debug!(handles = ?handles, "open windows");
        let Some(handle) = handles.into_iter().rev().find(|h| *h != parent) else {
            return Err(PagewrightError::NoSuchWindow {
                handle: format!("new window opened by {link}"),
            });
        };
        self.driver().switch_to_window(&handle)?;
        info!(handle = %handle, "switched to new window");
        Ok(handle)
    }

    /// Focus a window by handle
    pub fn switch_to_window(&self, handle: &str) -> PagewrightResult<()> {
        self.driver().switch_to_window(handle)?;
        info!(handle, "switched window");
        Ok(())
    }

    /// Focus a frame by name or id
    pub fn switch_to_frame(&self, name: &str) -> PagewrightResult<()> {
        self.driver().switch_to_frame(name)?;
        debug!(frame = name, "switched to frame");
        Ok(())
    }

    /// Leave any frame and return to the top-level document
    pub fn back_to_default(&self) -> PagewrightResult<()> {
        self.driver().switch_to_default_content()
    }

    /// Accept the open alert, returning its text
    pub fn accept_dialog(&self) -> PagewrightResult<String> {
        let text = self.driver().alert_text()?;
        info!(text = %text, "accepting dialog");
        self.driver().accept_alert()?;
        Ok(text)
    }

    /// Accept the open alert, or click `fallback` when there is none.
    ///
    /// Returns the alert text, or `None` if the fallback was clicked.
    pub fn accept_dialog_or_click(&self, fallback: &Locator) -> PagewrightResult<Option<String>> {
        match self.accept_dialog() {
            Ok(text) => Ok(Some(text)),
            Err(PagewrightError::NoAlert) => {
                debug!(locator = %fallback, "no dialog open, clicking instead");
                self.click(fallback)?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::mock::{MockDriver, MockElement};
    use std::sync::Arc;

    fn session(driver: MockDriver, clock: &FakeClock) -> PageSession<MockDriver> {
        PageSession::new(driver).with_clock(Arc::new(clock.clone()))
    }

    mod window_tests {
        use super::*;

        #[test]
        fn test_switch_to_new_window() {
            let clock = FakeClock::new();
            let driver = MockDriver::new(clock.clone())
                .with_element(MockElement::new("terms").tag("a").opens_window("terms-tab"));
            let session = session(driver, &clock);
            let handle = session.switch_to_new_window(&Locator::id("terms")).unwrap();
            assert_eq!(handle, "terms-tab");
            assert_eq!(session.driver().current_window_handle().unwrap(), "terms-tab");

            session.switch_to_window("main").unwrap();
            assert_eq!(session.driver().current_window_handle().unwrap(), "main");
        }

        #[test]
        fn test_no_new_window_is_error() {
            let clock = FakeClock::new();
            let driver = MockDriver::new(clock.clone()).with_element(MockElement::new("inline"));
            let session = session(driver, &clock);
            let err = session.switch_to_new_window(&Locator::id("inline")).unwrap_err();
            assert!(matches!(err, PagewrightError::NoSuchWindow { .. }));
        }
    }

    mod frame_tests {
        use super::*;

        #[test]
        fn test_frame_round_trip() {
            let clock = FakeClock::new();
            let session = session(MockDriver::new(clock.clone()).with_frame("payment"), &clock);
            session.switch_to_frame("payment").unwrap();
            assert_eq!(session.driver().current_frame().as_deref(), Some("payment"));
            session.back_to_default().unwrap();
            assert!(session.driver().current_frame().is_none());
        }

        #[test]
        fn test_unknown_frame() {
            let clock = FakeClock::new();
            let session = session(MockDriver::new(clock.clone()), &clock);
            assert!(matches!(
                session.switch_to_frame("ghost").unwrap_err(),
                PagewrightError::NoSuchFrame { .. }
            ));
        }
    }

    mod dialog_tests {
        use super::*;

        #[test]
        fn test_accept_dialog_returns_text() {
            let clock = FakeClock::new();
            let session = session(MockDriver::new(clock.clone()), &clock);
            session.driver().open_alert("Delete item?");
            assert_eq!(session.accept_dialog().unwrap(), "Delete item?");
            assert!(!session.driver().has_alert());
        }

        #[test]
        fn test_accept_dialog_or_click_falls_back() {
            let clock = FakeClock::new();
            let driver = MockDriver::new(clock.clone()).with_element(MockElement::new("confirm"));
            let session = session(driver, &clock);
            assert_eq!(
                session.accept_dialog_or_click(&Locator::id("confirm")).unwrap(),
                None
            );
            assert!(session.driver().was_called("click:confirm"));

            session.driver().open_alert("Saved");
            assert_eq!(
                session
                    .accept_dialog_or_click(&Locator::id("confirm"))
                    .unwrap()
                    .as_deref(),
                Some("Saved")
            );
            assert_eq!(session.driver().call_count("click:confirm"), 1);
        }
    }
}
