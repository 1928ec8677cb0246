//! Result and error types for Pagewright.

use thiserror::Error;

/// Result type for Pagewright operations
pub type PagewrightResult<T> = Result<T, PagewrightError>;

/// Errors that can occur while driving a page
#[derive(Debug, Error)]
pub enum PagewrightError {
    /// A wait condition never became true
    #[error("Timed out after {timeout_ms}ms waiting for {locator} to be {condition}")]
    Timeout {
        /// Locator (or target description) that was waited on
        locator: String,
        /// Condition that was being waited for
        condition: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// A previously resolved handle no longer refers to a live node
    #[error("Stale element reference: {locator}")]
    StaleReference {
        /// Locator or handle that went stale
        locator: String,
    },

    /// Element is present but cannot receive the action
    #[error("Element {locator} is not interactable: {message}")]
    NotInteractable {
        /// Locator or handle
        locator: String,
        /// Driver message
        message: String,
    },

    /// Locator matched nothing
    #[error("No such element: {locator}")]
    NoSuchElement {
        /// Locator that matched nothing
        locator: String,
    },

    /// Window handle is unknown to the driver
    #[error("No such window: {handle}")]
    NoSuchWindow {
        /// Window handle
        handle: String,
    },

    /// Frame name is unknown to the driver
    #[error("No such frame: {name}")]
    NoSuchFrame {
        /// Frame name or id
        name: String,
    },

    /// No alert is open
    #[error("No alert is open")]
    NoAlert,

    /// In-page script failed
    #[error("Script execution failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Screenshot capture failed
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Any other driver failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// A sleep was cancelled through a cancellation token
    #[error("Interrupted while {context}")]
    Interrupted {
        /// What was in progress
        context: String,
    },

    /// A page-level check did not hold
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PagewrightError {
    /// Create a timeout error for a locator and condition
    #[must_use]
    pub fn timeout(locator: impl Into<String>, condition: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            locator: locator.into(),
            condition: condition.into(),
            timeout_ms,
        }
    }

    /// Create a stale reference error
    #[must_use]
    pub fn stale(locator: impl Into<String>) -> Self {
        Self::StaleReference {
            locator: locator.into(),
        }
    }

    /// Create a not-interactable error
    #[must_use]
    pub fn not_interactable(locator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotInteractable {
            locator: locator.into(),
            message: message.into(),
        }
    }

    /// Create a no-such-element error
    #[must_use]
    pub fn no_such_element(locator: impl Into<String>) -> Self {
        Self::NoSuchElement {
            locator: locator.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Failures that a re-locate or a later retry can recover from.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StaleReference { .. } | Self::NotInteractable { .. } | Self::NoSuchElement { .. }
        )
    }

    /// Whether this is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_locator_and_condition() {
        let err = PagewrightError::timeout("By.id: submit", "clickable", 30_000);
        let msg = err.to_string();
        assert!(msg.contains("By.id: submit"));
        assert!(msg.contains("clickable"));
        assert!(msg.contains("30000ms"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(PagewrightError::stale("x").is_transient());
        assert!(PagewrightError::not_interactable("x", "covered").is_transient());
        assert!(PagewrightError::no_such_element("x").is_transient());
        assert!(!PagewrightError::timeout("x", "present", 1).is_transient());
        assert!(!PagewrightError::NoAlert.is_transient());
    }

    #[test]
    fn test_is_timeout() {
        assert!(PagewrightError::timeout("x", "present", 1).is_timeout());
        assert!(!PagewrightError::stale("x").is_timeout());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PagewrightError = io.into();
        assert!(matches!(err, PagewrightError::Io(_)));
    }
}
