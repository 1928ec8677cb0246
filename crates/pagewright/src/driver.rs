//! Driver - Abstract Browser Automation Capability
//!
//! Pagewright never talks to a browser directly. Everything goes through
//! the [`Driver`] trait, which a WebDriver client, a CDP bridge, or the
//! in-memory [`MockDriver`](crate::mock::MockDriver) can implement.
//!
//! All calls are synchronous and blocking. Handles returned by the driver
//! may go stale at any time; callers re-resolve locators instead of
//! holding on to them.

use crate::locator::Locator;
use crate::result::PagewrightResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Opaque reference to a located element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(String);

impl ElementHandle {
    /// Wrap a driver-issued element id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Driver-issued id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element {}", self.0)
    }
}

/// Non-printable keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Control modifier
    Control,
    /// Shift modifier
    Shift,
    /// Alt modifier
    Alt,
    /// Delete
    Delete,
    /// Backspace
    Backspace,
    /// Enter / Return
    Enter,
    /// Tab
    Tab,
}

impl Key {
    /// WebDriver code point for this key
    #[must_use]
    pub const fn code_point(self) -> char {
        match self {
            Self::Control => '\u{E009}',
            Self::Shift => '\u{E008}',
            Self::Alt => '\u{E00A}',
            Self::Delete => '\u{E017}',
            Self::Backspace => '\u{E003}',
            Self::Enter => '\u{E007}',
            Self::Tab => '\u{E004}',
        }
    }

    /// Whether the key stays held for the rest of a key sequence
    #[must_use]
    pub const fn is_modifier(self) -> bool {
        matches!(self, Self::Control | Self::Shift | Self::Alt)
    }
}

/// One item of a key sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyInput {
    /// A special key
    Special(Key),
    /// Printable text
    Text(String),
}

impl KeyInput {
    /// The "select all, then delete" sequence used to overwrite a field
    #[must_use]
    pub fn select_all_and_delete() -> Vec<Self> {
        vec![
            Self::Special(Key::Control),
            Self::Text("a".to_string()),
            Self::Special(Key::Delete),
        ]
    }
}

/// Single step of a pointer gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerAction {
    /// Move the pointer to the centre of an element
    MoveTo(ElementHandle),
    /// Move the pointer by a pixel offset
    MoveBy {
        /// Horizontal offset
        x: i32,
        /// Vertical offset
        y: i32,
    },
    /// Press the primary button
    Press,
    /// Release the primary button
    Release,
    /// Press and release the primary button
    Click,
}

/// Builder for pointer gestures
#[derive(Debug, Clone, Default)]
pub struct ActionChain {
    actions: Vec<PointerAction>,
}

impl ActionChain {
    /// Start an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move onto an element
    #[must_use]
    pub fn move_to(mut self, element: &ElementHandle) -> Self {
        self.actions.push(PointerAction::MoveTo(element.clone()));
        self
    }

    /// Move by offset
    #[must_use]
    pub fn move_by(mut self, x: i32, y: i32) -> Self {
        self.actions.push(PointerAction::MoveBy { x, y });
        self
    }

    /// Press the button over an element
    #[must_use]
    pub fn press_on(self, element: &ElementHandle) -> Self {
        let mut chain = self.move_to(element);
        chain.actions.push(PointerAction::Press);
        chain
    }

    /// Release the button over an element
    #[must_use]
    pub fn release_on(self, element: &ElementHandle) -> Self {
        let mut chain = self.move_to(element);
        chain.actions.push(PointerAction::Release);
        chain
    }

    /// Release at the current position
    #[must_use]
    pub fn release(mut self) -> Self {
        self.actions.push(PointerAction::Release);
        self
    }

    /// Click at the current position
    #[must_use]
    pub fn click(mut self) -> Self {
        self.actions.push(PointerAction::Click);
        self
    }

    /// Finish the chain
    #[must_use]
    pub fn build(self) -> Vec<PointerAction> {
        self.actions
    }
}

/// Argument passed to an in-page script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptArg {
    /// Element reference, exposed as a DOM node
    Element(ElementHandle),
    /// Plain JSON value
    Value(serde_json::Value),
}

impl From<&ElementHandle> for ScriptArg {
    fn from(element: &ElementHandle) -> Self {
        Self::Element(element.clone())
    }
}

impl From<&str> for ScriptArg {
    fn from(value: &str) -> Self {
        Self::Value(serde_json::Value::String(value.to_string()))
    }
}

/// Captured screenshot
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Timestamp when screenshot was taken
    pub timestamp: SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp: SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if screenshot has data
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Abstract browser capability consumed by the page helpers.
///
/// Error conventions:
/// - `find_one` fails with `NoSuchElement` when nothing matches.
/// - element methods fail with `StaleReference` for handles whose node is gone.
/// - actions on covered or disabled elements fail with `NotInteractable`.
pub trait Driver {
    /// Navigate to URL
    fn navigate(&self, url: &str) -> PagewrightResult<()>;

    /// Get current URL
    fn current_url(&self) -> PagewrightResult<String>;

    /// Reload page
    fn refresh(&self) -> PagewrightResult<()>;

    /// First element matching the locator
    fn find_one(&self, locator: &Locator) -> PagewrightResult<ElementHandle>;

    /// All elements matching the locator (possibly none)
    fn find_all(&self, locator: &Locator) -> PagewrightResult<Vec<ElementHandle>>;

    /// Elements matching the locator inside `parent`
    fn find_children(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> PagewrightResult<Vec<ElementHandle>>;

    /// Click element
    fn click(&self, element: &ElementHandle) -> PagewrightResult<()>;

    /// Type text into element as discrete key events
    fn send_keys(&self, element: &ElementHandle, text: &str) -> PagewrightResult<()>;

    /// Send a key sequence; modifiers stay held until the sequence ends
    fn send_key_sequence(&self, element: &ElementHandle, keys: &[KeyInput])
        -> PagewrightResult<()>;

    /// Clear an editable element
    fn clear(&self, element: &ElementHandle) -> PagewrightResult<()>;

    /// Whether the element is rendered visibly
    fn is_displayed(&self, element: &ElementHandle) -> PagewrightResult<bool>;

    /// Whether the element is enabled
    fn is_enabled(&self, element: &ElementHandle) -> PagewrightResult<bool>;

    /// Whether the element is selected (checkbox, radio, option)
    fn is_selected(&self, element: &ElementHandle) -> PagewrightResult<bool>;

    /// Whether the element can receive a click right now.
    ///
    /// Defaults to "displayed and enabled"; drivers that can detect
    /// occlusion should override this.
    fn is_interactable(&self, element: &ElementHandle) -> PagewrightResult<bool> {
        Ok(self.is_displayed(element)? && self.is_enabled(element)?)
    }

    /// Attribute or property value, `None` if absent
    fn attribute(&self, element: &ElementHandle, name: &str) -> PagewrightResult<Option<String>>;

    /// Rendered text
    fn text(&self, element: &ElementHandle) -> PagewrightResult<String>;

    /// Run a script in the page; `arguments[i]` refers to `args[i]`
    fn execute_script(&self, script: &str, args: &[ScriptArg])
        -> PagewrightResult<serde_json::Value>;

    /// Perform a pointer gesture
    fn perform_actions(&self, actions: &[PointerAction]) -> PagewrightResult<()>;

    /// Handle of the focused window
    fn current_window_handle(&self) -> PagewrightResult<String>;

    /// Handles of all open windows
    fn window_handles(&self) -> PagewrightResult<Vec<String>>;

    /// Focus another window
    fn switch_to_window(&self, handle: &str) -> PagewrightResult<()>;

    /// Focus a frame by name or id
    fn switch_to_frame(&self, name: &str) -> PagewrightResult<()>;

    /// Return to the top-level document
    fn switch_to_default_content(&self) -> PagewrightResult<()>;

    /// Text of the open alert
    fn alert_text(&self) -> PagewrightResult<String>;

    /// Accept the open alert
    fn accept_alert(&self) -> PagewrightResult<()>;

    /// Capture the viewport
    fn screenshot(&self) -> PagewrightResult<Screenshot>;
}
