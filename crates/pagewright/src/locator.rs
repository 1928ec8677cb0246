//! Locators: immutable queries identifying zero or more elements.
//!
//! A locator never caches the element it resolved to. Every wait and
//! action re-resolves it, so a document mutation between steps costs a
//! lookup rather than a stale handle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Query used to find elements in the current document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// Element id attribute
    Id(String),
    /// CSS selector (e.g. "button.primary")
    Css(String),
    /// XPath expression
    XPath(String),
    /// `name` attribute
    Name(String),
    /// Single class name
    ClassName(String),
    /// HTML tag name
    TagName(String),
    /// Anchor with exactly this text
    LinkText(String),
    /// Anchor whose text contains this fragment
    PartialLinkText(String),
}

impl Locator {
    /// Locate by id
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Locate by XPath
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Locate by `name` attribute
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Locate by class name
    #[must_use]
    pub fn class_name(class: impl Into<String>) -> Self {
        Self::ClassName(class.into())
    }

    /// Locate by tag name
    #[must_use]
    pub fn tag_name(tag: impl Into<String>) -> Self {
        Self::TagName(tag.into())
    }

    /// Locate an anchor by its exact text
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Locate an anchor by part of its text
    #[must_use]
    pub fn partial_link_text(text: impl Into<String>) -> Self {
        Self::PartialLinkText(text.into())
    }

    /// XPath for any `tag` anywhere in the document whose text contains `text`.
    ///
    /// `Locator::contains_text("option", "Kenya")` renders
    /// `//option[contains(.,'Kenya')]`.
    #[must_use]
    pub fn contains_text(tag: &str, text: &str) -> Self {
        Self::contains_text_at(tag, text, true)
    }

    /// Like [`Locator::contains_text`], anchored at the document root when
    /// `global` is false.
    #[must_use]
    pub fn contains_text_at(tag: &str, text: &str, global: bool) -> Self {
        let start = if global { "//" } else { "/" };
        Self::XPath(format!("{start}{tag}[contains(.,{})]", xpath_literal(text)))
    }

    /// Short name of the query kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Css(_) => "cssSelector",
            Self::XPath(_) => "xpath",
            Self::Name(_) => "name",
            Self::ClassName(_) => "className",
            Self::TagName(_) => "tagName",
            Self::LinkText(_) => "linkText",
            Self::PartialLinkText(_) => "partialLinkText",
        }
    }

    /// Raw query value
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v)
            | Self::Css(v)
            | Self::XPath(v)
            | Self::Name(v)
            | Self::ClassName(v)
            | Self::TagName(v)
            | Self::LinkText(v)
            | Self::PartialLinkText(v) => v,
        }
    }
}

/// XPath 1.0 string literal for `text`.
///
/// XPath has no escape sequences, so text holding both quote kinds is
/// split on `'` and rebuilt with `concat()`.
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{text}'")
    } else if !text.contains('"') {
        format!("\"{text}\"")
    } else {
        let parts: Vec<String> = text.split('\'').map(|part| format!("'{part}'")).collect();
        format!("concat({})", parts.join(",\"'\","))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "By.{}: {}", self.kind(), self.value())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod construction_tests {
        use super::*;

        #[test]
        fn test_constructors_pick_the_right_variant() {
            assert_eq!(Locator::id("submit"), Locator::Id("submit".into()));
            assert_eq!(Locator::css("#submit"), Locator::Css("#submit".into()));
            assert_eq!(Locator::xpath("//a"), Locator::XPath("//a".into()));
            assert_eq!(Locator::name("q"), Locator::Name("q".into()));
            assert_eq!(Locator::class_name("btn"), Locator::ClassName("btn".into()));
            assert_eq!(Locator::tag_name("option"), Locator::TagName("option".into()));
            assert_eq!(Locator::link_text("Home"), Locator::LinkText("Home".into()));
            assert_eq!(
                Locator::partial_link_text("Ho"),
                Locator::PartialLinkText("Ho".into())
            );
        }

        #[test]
        fn test_value_returns_raw_query() {
            assert_eq!(Locator::css("div > span").value(), "div > span");
        }
    }

    mod contains_text_tests {
        use super::*;

        #[test]
        fn test_global_contains_text() {
            let locator = Locator::contains_text("option", "Kenya");
            assert_eq!(locator, Locator::xpath("//option[contains(.,'Kenya')]"));
        }

        #[test]
        fn test_apostrophe_uses_double_quotes() {
            let locator = Locator::contains_text("option", "Cote d'Ivoire");
            assert_eq!(locator.value(), r#"//option[contains(.,"Cote d'Ivoire")]"#);
        }

        #[test]
        fn test_both_quote_kinds_use_concat() {
            let locator = Locator::contains_text("td", r#"O'Brien said "hi""#);
            assert_eq!(
                locator.value(),
                r#"//td[contains(.,concat('O',"'",'Brien said "hi"'))]"#
            );
        }

        #[test]
        fn test_rooted_contains_text() {
            let locator = Locator::contains_text_at("div", "Welcome", false);
            assert_eq!(locator.value(), "/div[contains(.,'Welcome')]");
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_display_includes_kind_and_value() {
            assert_eq!(Locator::id("submit").to_string(), "By.id: submit");
            assert_eq!(
                Locator::css("#country").to_string(),
                "By.cssSelector: #country"
            );
        }

        #[test]
        fn test_serde_shape() {
            let json = serde_json::to_string(&Locator::id("submit")).unwrap();
            assert_eq!(json, r#"{"by":"id","value":"submit"}"#);
            let back: Locator = serde_json::from_str(&json).unwrap();
            assert_eq!(back, Locator::id("submit"));
        }
    }
}
