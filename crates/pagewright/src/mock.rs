//! In-memory driver for unit testing page objects.
//!
//! [`MockDriver`] keeps a flat list of [`MockElement`]s whose presence,
//! text and occlusion can change over virtual time. It shares a
//! [`FakeClock`] with the session under test, so a wait that "takes" three
//! seconds finishes instantly while still observing the scripted changes.
//!
//! Handles encode the element id and a generation (`"submit#0"`).
//! [`MockDriver::replace_element`] bumps the generation, which makes every
//! outstanding handle stale the way a re-rendered node would be.

use crate::clock::{Clock, FakeClock};
use crate::driver::{
    Driver, ElementHandle, Key, KeyInput, PointerAction, ScriptArg, Screenshot,
};
use crate::locator::Locator;
use crate::result::{PagewrightError, PagewrightResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Placeholder PNG signature returned when no screenshot was configured
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Scripted element in the mock document
#[derive(Debug, Clone)]
pub struct MockElement {
    id: String,
    tag: String,
    classes: Vec<String>,
    name: Option<String>,
    aliases: Vec<Locator>,
    text: String,
    text_changes: Vec<(Duration, String)>,
    value: Option<String>,
    attributes: HashMap<String, String>,
    failing_attributes: Vec<String>,
    displayed: bool,
    enabled: bool,
    selected: bool,
    appears_at: Duration,
    removed_at: Option<Duration>,
    covered_until: Duration,
    parent: Option<String>,
    max_length: Option<usize>,
    counter_for: Option<(String, usize)>,
    opens_window: Option<String>,
    clear_fails: bool,
    stale_reads: u32,
    generation: u32,
    key_events: usize,
}

impl MockElement {
    /// Visible, enabled `div` with the given id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: "div".to_string(),
            classes: Vec::new(),
            name: None,
            aliases: Vec::new(),
            text: String::new(),
            text_changes: Vec::new(),
            value: None,
            attributes: HashMap::new(),
            failing_attributes: Vec::new(),
            displayed: true,
            enabled: true,
            selected: false,
            appears_at: Duration::ZERO,
            removed_at: None,
            covered_until: Duration::ZERO,
            parent: None,
            max_length: None,
            counter_for: None,
            opens_window: None,
            clear_fails: false,
            stale_reads: 0,
            generation: 0,
            key_events: 0,
        }
    }

    /// Text input with an empty value
    #[must_use]
    pub fn input(id: impl Into<String>) -> Self {
        Self::new(id).tag("input").value("")
    }

    /// `option` child of a `select`
    #[must_use]
    pub fn option(id: impl Into<String>, select: &str, text: &str) -> Self {
        Self::new(id).tag("option").parent(select).text(text)
    }

    /// Set tag name
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Add a class
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the `name` attribute
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Extra locator that matches this element verbatim
    #[must_use]
    pub fn alias(mut self, locator: Locator) -> Self {
        self.aliases.push(locator);
        self
    }

    /// Initial rendered text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Change the rendered text at a point in virtual time
    #[must_use]
    pub fn text_at(mut self, at: Duration, text: impl Into<String>) -> Self {
        self.text_changes.push((at, text.into()));
        self.text_changes.sort_by_key(|(when, _)| *when);
        self
    }

    /// Set the form value
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Make reads of this attribute fail
    #[must_use]
    pub fn failing_attribute(mut self, name: impl Into<String>) -> Self {
        self.failing_attributes.push(name.into());
        self
    }

    /// Not rendered
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Initial selection state
    #[must_use]
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Attach to the document at this time
    #[must_use]
    pub fn appears_at(mut self, at: Duration) -> Self {
        self.appears_at = at;
        self
    }

    /// Detach from the document at this time
    #[must_use]
    pub fn removed_at(mut self, at: Duration) -> Self {
        self.removed_at = Some(at);
        self
    }

    /// Clicks are intercepted by an overlay until this time
    #[must_use]
    pub fn covered_until(mut self, until: Duration) -> Self {
        self.covered_until = until;
        self
    }

    /// Parent element id
    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Typed input is truncated to this many characters
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Render `max - len(input value)` as text
    #[must_use]
    pub fn counter_for(mut self, input_id: impl Into<String>, max: usize) -> Self {
        self.counter_for = Some((input_id.into(), max));
        self
    }

    /// Clicking opens a new window with this handle
    #[must_use]
    pub fn opens_window(mut self, handle: impl Into<String>) -> Self {
        self.opens_window = Some(handle.into());
        self
    }

    /// `clear` fails on this element
    #[must_use]
    pub fn clear_fails(mut self) -> Self {
        self.clear_fails = true;
        self
    }

    /// The next `count` text reads fail as stale
    #[must_use]
    pub fn stale_reads(mut self, count: u32) -> Self {
        self.stale_reads = count;
        self
    }

    fn handle(&self) -> ElementHandle {
        ElementHandle::new(format!("{}#{}", self.id, self.generation))
    }

    fn is_attached(&self, now: Duration) -> bool {
        now >= self.appears_at && self.removed_at.map_or(true, |at| now < at)
    }

    fn is_editable(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea")
    }

    fn current_text(&self, now: Duration) -> String {
        self.text_changes
            .iter()
            .rev()
            .find(|(at, _)| *at <= now)
            .map_or_else(|| self.text.clone(), |(_, text)| text.clone())
    }

    fn matches(&self, locator: &Locator, now: Duration) -> bool {
        if self.aliases.contains(locator) {
            return true;
        }
        match locator {
            Locator::Id(id) => &self.id == id,
            Locator::Css(css) => self.matches_css(css),
            Locator::XPath(xpath) => self.matches_contains_xpath(xpath, now),
            Locator::Name(name) => self.name.as_deref() == Some(name.as_str()),
            Locator::ClassName(class) => self.classes.iter().any(|c| c == class),
            Locator::TagName(tag) => self.tag.eq_ignore_ascii_case(tag),
            Locator::LinkText(text) => self.tag == "a" && self.current_text(now) == *text,
            Locator::PartialLinkText(text) => {
                self.tag == "a" && self.current_text(now).contains(text.as_str())
            }
        }
    }

    fn matches_css(&self, css: &str) -> bool {
        if let Some(id) = css.strip_prefix('#') {
            return self.id == id;
        }
        if let Some(class) = css.strip_prefix('.') {
            return self.classes.iter().any(|c| c == class);
        }
        if let Some((tag, id)) = css.split_once('#') {
            return self.tag == tag && self.id == id;
        }
        self.tag == css
    }

    // Understands `//tag[contains(.,<literal>)]` and `/tag[contains(.,<literal>)]`.
    fn matches_contains_xpath(&self, xpath: &str, now: Duration) -> bool {
        let body = xpath.trim_start_matches('/');
        let Some((tag, rest)) = body.split_once("[contains(.,") else {
            return false;
        };
        let Some(needle) = rest.strip_suffix(")]").and_then(parse_xpath_literal) else {
            return false;
        };
        self.tag == tag && self.current_text(now).contains(&needle)
    }
}

/// Decode `'…'`, `"…"` or `concat(…)` of quoted parts.
fn parse_xpath_literal(expr: &str) -> Option<String> {
    let Some(args) = expr.strip_prefix("concat(").and_then(|r| r.strip_suffix(')')) else {
        let (value, tail) = split_quoted(expr)?;
        return tail.is_empty().then(|| value.to_string());
    };
    let mut decoded = String::new();
    let mut rest = args.trim_start();
    while !rest.is_empty() {
        let (part, tail) = split_quoted(rest)?;
        decoded.push_str(part);
        rest = tail.trim_start();
        if let Some(next) = rest.strip_prefix(',') {
            rest = next.trim_start();
        } else if !rest.is_empty() {
            return None;
        }
    }
    Some(decoded)
}

fn split_quoted(input: &str) -> Option<(&str, &str)> {
    let quote = input.chars().next().filter(|c| matches!(*c, '\'' | '"'))?;
    let body = &input[1..];
    let end = body.find(quote)?;
    Some((&body[..end], &body[end + 1..]))
}

#[derive(Debug)]
struct MockState {
    elements: Vec<MockElement>,
    url: String,
    windows: Vec<String>,
    current_window: String,
    frames: Vec<String>,
    current_frame: Option<String>,
    alert: Option<String>,
    hovered: Option<String>,
    pressed: Option<String>,
    focused: Option<String>,
    screenshot: Option<Vec<u8>>,
    history: Vec<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            url: "about:blank".to_string(),
            windows: vec!["main".to_string()],
            current_window: "main".to_string(),
            frames: Vec::new(),
            current_frame: None,
            alert: None,
            hovered: None,
            pressed: None,
            focused: None,
            screenshot: None,
            history: Vec::new(),
        }
    }
}

/// Mock driver for unit testing
#[derive(Debug)]
pub struct MockDriver {
    clock: FakeClock,
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create an empty document on `clock`
    #[must_use]
    pub fn new(clock: FakeClock) -> Self {
        Self {
            clock,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Add an element (builder form)
    #[must_use]
    pub fn with_element(self, element: MockElement) -> Self {
        self.add_element(element);
        self
    }

    /// Register a frame name
    #[must_use]
    pub fn with_frame(self, name: impl Into<String>) -> Self {
        self.state().frames.push(name.into());
        self
    }

    /// Add an element
    pub fn add_element(&self, element: MockElement) {
        self.state().elements.push(element);
    }

    /// Detach an element now
    pub fn remove_element(&self, id: &str) {
        let now = self.clock.now();
        if let Some(element) = self.state().elements.iter_mut().find(|e| e.id == id) {
            element.removed_at = Some(now);
        }
    }

    /// Re-render an element; outstanding handles become stale
    pub fn replace_element(&self, id: &str) {
        if let Some(element) = self.state().elements.iter_mut().find(|e| e.id == id) {
            element.generation += 1;
        }
    }

    /// Open an alert
    pub fn open_alert(&self, text: impl Into<String>) {
        self.state().alert = Some(text.into());
    }

    /// Configure screenshot bytes
    pub fn set_screenshot(&self, data: Vec<u8>) {
        self.state().screenshot = Some(data);
    }

    /// Current form value of an element
    #[must_use]
    pub fn element_value(&self, id: &str) -> Option<String> {
        self.state()
            .elements
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.value.clone())
    }

    /// Selection state of an element
    #[must_use]
    pub fn is_element_selected(&self, id: &str) -> bool {
        self.state()
            .elements
            .iter()
            .any(|e| e.id == id && e.selected)
    }

    /// Number of key events delivered to an element
    #[must_use]
    pub fn key_events(&self, id: &str) -> usize {
        self.state()
            .elements
            .iter()
            .find(|e| e.id == id)
            .map_or(0, |e| e.key_events)
    }

    /// Frame currently focused, if any
    #[must_use]
    pub fn current_frame(&self) -> Option<String> {
        self.state().current_frame.clone()
    }

    /// Whether an alert is open
    #[must_use]
    pub fn has_alert(&self) -> bool {
        self.state().alert.is_some()
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Check if a call with this prefix was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state().history.iter().any(|c| c.starts_with(prefix))
    }

    /// Number of calls with this prefix
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.state()
            .history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live_index(state: &MockState, now: Duration, handle: &ElementHandle) -> PagewrightResult<usize> {
        let (id, generation) = handle
            .id()
            .rsplit_once('#')
            .ok_or_else(|| PagewrightError::stale(handle.id()))?;
        state
            .elements
            .iter()
            .position(|e| {
                e.id == id && e.generation.to_string() == generation && e.is_attached(now)
            })
            .ok_or_else(|| PagewrightError::stale(handle.id()))
    }

    fn rendered_text(state: &MockState, now: Duration, index: usize) -> String {
        let element = &state.elements[index];
        if let Some((input_id, max)) = &element.counter_for {
            let used = state
                .elements
                .iter()
                .find(|e| &e.id == input_id)
                .and_then(|e| e.value.as_ref())
                .map_or(0, |v| v.chars().count());
            return max.saturating_sub(used).to_string();
        }
        if element.tag == "input" {
            return String::new();
        }
        element.current_text(now)
    }

    fn click_index(state: &mut MockState, now: Duration, index: usize) -> PagewrightResult<()> {
        let element = &state.elements[index];
        let handle = element.handle();
        if !element.displayed {
            return Err(PagewrightError::not_interactable(handle.id(), "element not visible"));
        }
        if !element.enabled {
            return Err(PagewrightError::not_interactable(handle.id(), "element disabled"));
        }
        if now < element.covered_until {
            return Err(PagewrightError::not_interactable(
                handle.id(),
                "element click intercepted by overlay",
            ));
        }

        let id = element.id.clone();
        let tag = element.tag.clone();
        let parent = element.parent.clone();
        let opens_window = element.opens_window.clone();

        if tag == "option" {
            for other in state.elements.iter_mut() {
                if other.tag == "option" && other.parent == parent {
                    other.selected = false;
                }
            }
            state.elements[index].selected = true;
        } else if tag == "input" {
            let kind = state.elements[index].attributes.get("type").cloned();
            if matches!(kind.as_deref(), Some("checkbox" | "radio")) {
                let element = &mut state.elements[index];
                element.selected = !element.selected;
            }
        }
        if let Some(window) = opens_window {
            if !state.windows.contains(&window) {
                state.windows.push(window);
            }
        }
        state.focused = Some(id.clone());
        state.history.push(format!("click:{id}"));
        Ok(())
    }

    fn type_into(element: &mut MockElement, text: &str) {
        let value = element.value.get_or_insert_with(String::new);
        for ch in text.chars() {
            if element.max_length.is_some_and(|max| value.chars().count() >= max) {
                break;
            }
            value.push(ch);
        }
        element.key_events += text.chars().count();
    }
}

impl Driver for MockDriver {
    fn navigate(&self, url: &str) -> PagewrightResult<()> {
        let mut state = self.state();
        state.history.push(format!("navigate:{url}"));
        state.url = url.to_string();
        Ok(())
    }

    fn current_url(&self) -> PagewrightResult<String> {
        Ok(self.state().url.clone())
    }

    fn refresh(&self) -> PagewrightResult<()> {
        self.state().history.push("refresh".to_string());
        Ok(())
    }

    fn find_one(&self, locator: &Locator) -> PagewrightResult<ElementHandle> {
        self.find_all(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| PagewrightError::no_such_element(locator.to_string()))
    }

    fn find_all(&self, locator: &Locator) -> PagewrightResult<Vec<ElementHandle>> {
        let now = self.clock.now();
        Ok(self
            .state()
            .elements
            .iter()
            .filter(|e| e.is_attached(now) && e.matches(locator, now))
            .map(MockElement::handle)
            .collect())
    }

    fn find_children(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> PagewrightResult<Vec<ElementHandle>> {
        let now = self.clock.now();
        let state = self.state();
        let index = Self::live_index(&state, now, parent)?;
        let parent_id = &state.elements[index].id;
        Ok(state
            .elements
            .iter()
            .filter(|e| {
                e.parent.as_ref() == Some(parent_id)
                    && e.is_attached(now)
                    && e.matches(locator, now)
            })
            .map(MockElement::handle)
            .collect())
    }

    fn click(&self, element: &ElementHandle) -> PagewrightResult<()> {
        let now = self.clock.now();
        let mut state = self.state();
        let index = Self::live_index(&state, now, element)?;
        Self::click_index(&mut state, now, index)
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> PagewrightResult<()> {
        let now = self.clock.now();
        let mut state = self.state();
        let index = Self::live_index(&state, now, element)?;
        let target = &mut state.elements[index];
        if !target.displayed || !target.enabled {
            return Err(PagewrightError::not_interactable(element.id(), "cannot type"));
        }
        Self::type_into(target, text);
        let entry = format!("send_keys:{}:{}", target.id, text.chars().count());
        state.history.push(entry);
        Ok(())
    }

    fn send_key_sequence(
        &self,
        element: &ElementHandle,
        keys: &[KeyInput],
    ) -> PagewrightResult<()> {
        let now = self.clock.now();
        let mut state = self.state();
        let index = Self::live_index(&state, now, element)?;
        let target = &mut state.elements[index];
        let mut control = false;
        let mut all_selected = false;
        for key in keys {
            match key {
                KeyInput::Special(Key::Control) => control = true,
                KeyInput::Special(Key::Delete | Key::Backspace) if all_selected => {
                    target.value = Some(String::new());
                    all_selected = false;
                }
                KeyInput::Special(Key::Backspace) => {
                    if let Some(value) = target.value.as_mut() {
                        value.pop();
                    }
                }
                KeyInput::Special(_) => {}
                KeyInput::Text(text) if control && text.eq_ignore_ascii_case("a") => {
                    all_selected = true;
                }
                KeyInput::Text(text) => Self::type_into(target, text),
            }
        }
        let entry = format!("key_sequence:{}", target.id);
        state.history.push(entry);
        Ok(())
    }

    fn clear(&self, element: &ElementHandle) -> PagewrightResult<()> {
        let now = self.clock.now();
        let mut state = self.state();
        let index = Self::live_index(&state, now, element)?;
        let target = &mut state.elements[index];
        if target.clear_fails {
            return Err(PagewrightError::not_interactable(element.id(), "clear rejected"));
        }
        if target.is_editable() {
            target.value = Some(String::new());
        }
        let entry = format!("clear:{}", target.id);
        state.history.push(entry);
        Ok(())
    }

    fn is_displayed(&self, element: &ElementHandle) -> PagewrightResult<bool> {
        let now = self.clock.now();
        let state = self.state();
        let index = Self::live_index(&state, now, element)?;
        Ok(state.elements[index].displayed)
    }

    fn is_enabled(&self, element: &ElementHandle) -> PagewrightResult<bool> {
        let now = self.clock.now();
        let state = self.state();
        let index = Self::live_index(&state, now, element)?;
        Ok(state.elements[index].enabled)
    }

    fn is_selected(&self, element: &ElementHandle) -> PagewrightResult<bool> {
        let now = self.clock.now();
        let state = self.state();
        let index = Self::live_index(&state, now, element)?;
        Ok(state.elements[index].selected)
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> PagewrightResult<Option<String>> {
        let now = self.clock.now();
        let state = self.state();
        let index = Self::live_index(&state, now, element)?;
        let target = &state.elements[index];
        if target.failing_attributes.iter().any(|a| a == name) {
            return Err(PagewrightError::Driver {
                message: format!("cannot read attribute {name}"),
            });
        }
        Ok(match name {
            "value" => target.value.clone(),
            "innerText" => Some(Self::rendered_text(&state, now, index)),
            "id" => Some(target.id.clone()),
            "name" => target.name.clone(),
            _ => target.attributes.get(name).cloned(),
        })
    }

    fn text(&self, element: &ElementHandle) -> PagewrightResult<String> {
        let now = self.clock.now();
        let mut state = self.state();
        let index = Self::live_index(&state, now, element)?;
        if state.elements[index].stale_reads > 0 {
            state.elements[index].stale_reads -= 1;
            return Err(PagewrightError::stale(element.id()));
        }
        if !state.elements[index].displayed {
            return Ok(String::new());
        }
        Ok(Self::rendered_text(&state, now, index))
    }

    fn execute_script(
        &self,
        script: &str,
        args: &[ScriptArg],
    ) -> PagewrightResult<serde_json::Value> {
        let now = self.clock.now();
        let mut state = self.state();
        let target = match args.first() {
            Some(ScriptArg::Element(handle)) => Some(Self::live_index(&state, now, handle)?),
            _ => None,
        };

        if script.contains("arguments[0].value") {
            let index = target.ok_or_else(|| PagewrightError::Script {
                message: "value injection needs an element".to_string(),
            })?;
            let value = match args.get(1) {
                Some(ScriptArg::Value(serde_json::Value::String(s))) => s.clone(),
                Some(ScriptArg::Value(other)) => other.to_string(),
                _ => String::new(),
            };
            let id = state.elements[index].id.clone();
            state.elements[index].value = Some(value);
            state.history.push(format!("script:set_value:{id}"));
        } else if script.contains("arguments[0].click()") {
            let index = target.ok_or_else(|| PagewrightError::Script {
                message: "click needs an element".to_string(),
            })?;
            let id = state.elements[index].id.clone();
            state.history.push(format!("script:click:{id}"));
            // Script clicks bypass overlays
            let covered = std::mem::take(&mut state.elements[index].covered_until);
            let result = Self::click_index(&mut state, now, index);
            state.elements[index].covered_until = covered;
            result?;
        } else if script.contains("arguments[0].focus()") {
            let index = target.ok_or_else(|| PagewrightError::Script {
                message: "focus needs an element".to_string(),
            })?;
            let id = state.elements[index].id.clone();
            state.focused = Some(id.clone());
            state.history.push(format!("script:focus:{id}"));
        } else if script.contains("scrollIntoView") {
            let id = target.map_or_else(String::new, |i| state.elements[i].id.clone());
            state.history.push(format!("script:scroll_into_view:{id}"));
        } else if script.contains("window.scrollBy") {
            state.history.push("script:scroll_by".to_string());
        } else if let Some(rest) = script.strip_prefix("window.location = ") {
            let url = rest.trim_end_matches(';').trim_matches('\'').trim_matches('"');
            state.url = url.to_string();
            state.history.push(format!("script:navigate:{url}"));
        } else {
            state.history.push(format!("script:{script}"));
        }
        Ok(serde_json::Value::Null)
    }

    fn perform_actions(&self, actions: &[PointerAction]) -> PagewrightResult<()> {
        let now = self.clock.now();
        let mut state = self.state();
        for action in actions {
            match action {
                PointerAction::MoveTo(handle) => {
                    let index = Self::live_index(&state, now, handle)?;
                    let id = state.elements[index].id.clone();
                    state.history.push(format!("pointer:move_to:{id}"));
                    state.hovered = Some(id);
                }
                PointerAction::MoveBy { x, y } => {
                    state.history.push(format!("pointer:move_by:{x}:{y}"));
                }
                PointerAction::Press => {
                    let hovered = state.hovered.clone();
                    let id = hovered.clone().unwrap_or_default();
                    state.pressed = hovered;
                    state.history.push(format!("pointer:press:{id}"));
                }
                PointerAction::Release => {
                    let source = state.pressed.take().unwrap_or_default();
                    let target = state.hovered.clone().unwrap_or_default();
                    state.history.push(format!("pointer:release:{source}->{target}"));
                }
                PointerAction::Click => {
                    let id = state.hovered.clone().ok_or_else(|| PagewrightError::Driver {
                        message: "pointer click with no hovered element".to_string(),
                    })?;
                    let index = state
                        .elements
                        .iter()
                        .position(|e| e.id == id && e.is_attached(now))
                        .ok_or_else(|| PagewrightError::stale(id.clone()))?;
                    Self::click_index(&mut state, now, index)?;
                }
            }
        }
        Ok(())
    }

    fn current_window_handle(&self) -> PagewrightResult<String> {
        Ok(self.state().current_window.clone())
    }

    fn window_handles(&self) -> PagewrightResult<Vec<String>> {
        Ok(self.state().windows.clone())
    }

    fn switch_to_window(&self, handle: &str) -> PagewrightResult<()> {
        let mut state = self.state();
        if !state.windows.iter().any(|w| w == handle) {
            return Err(PagewrightError::NoSuchWindow {
                handle: handle.to_string(),
            });
        }
        state.current_window = handle.to_string();
        state.history.push(format!("switch_window:{handle}"));
        Ok(())
    }

    fn switch_to_frame(&self, name: &str) -> PagewrightResult<()> {
        let mut state = self.state();
        if !state.frames.iter().any(|f| f == name) {
            return Err(PagewrightError::NoSuchFrame {
                name: name.to_string(),
            });
        }
        state.current_frame = Some(name.to_string());
        state.history.push(format!("switch_frame:{name}"));
        Ok(())
    }

    fn switch_to_default_content(&self) -> PagewrightResult<()> {
        let mut state = self.state();
        state.current_frame = None;
        state.history.push("switch_default_content".to_string());
        Ok(())
    }

    fn alert_text(&self) -> PagewrightResult<String> {
        self.state().alert.clone().ok_or(PagewrightError::NoAlert)
    }

    fn accept_alert(&self) -> PagewrightResult<()> {
        let mut state = self.state();
        state.alert.take().ok_or(PagewrightError::NoAlert)?;
        state.history.push("accept_alert".to_string());
        Ok(())
    }

    fn screenshot(&self) -> PagewrightResult<Screenshot> {
        let data = self
            .state()
            .screenshot
            .clone()
            .unwrap_or_else(|| PNG_SIGNATURE.to_vec());
        Ok(Screenshot::new(data))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn driver() -> (FakeClock, MockDriver) {
        let clock = FakeClock::new();
        (clock.clone(), MockDriver::new(clock))
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_locator_kinds() {
            let (_, driver) = driver();
            let driver = driver.with_element(
                MockElement::new("go")
                    .tag("button")
                    .class("primary")
                    .name("submit")
                    .text("Go"),
            );
            assert_eq!(driver.find_all(&Locator::id("go")).unwrap().len(), 1);
            assert_eq!(driver.find_all(&Locator::css("#go")).unwrap().len(), 1);
            assert_eq!(driver.find_all(&Locator::css(".primary")).unwrap().len(), 1);
            assert_eq!(driver.find_all(&Locator::css("button")).unwrap().len(), 1);
            assert_eq!(driver.find_all(&Locator::css("button#go")).unwrap().len(), 1);
            assert_eq!(driver.find_all(&Locator::name("submit")).unwrap().len(), 1);
            assert_eq!(
                driver
                    .find_all(&Locator::contains_text("button", "G"))
                    .unwrap()
                    .len(),
                1
            );
            assert!(driver.find_all(&Locator::id("stop")).unwrap().is_empty());
        }

        #[test]
        fn test_contains_text_follows_scripted_text() {
            let (clock, driver) = driver();
            let driver = driver.with_element(
                MockElement::new("status")
                    .tag("span")
                    .text("Pending")
                    .text_at(Duration::from_secs(2), "Shipped"),
            );
            let shipped = Locator::contains_text("span", "Shipped");
            assert!(driver.find_all(&shipped).unwrap().is_empty());
            clock.advance(Duration::from_secs(2));
            assert_eq!(driver.find_all(&shipped).unwrap().len(), 1);
            assert!(driver
                .find_all(&Locator::contains_text("span", "Pending"))
                .unwrap()
                .is_empty());
        }

        #[test]
        fn test_contains_text_with_quotes() {
            let (_, driver) = driver();
            let driver = driver
                .with_element(MockElement::new("ci").tag("option").text("Cote d'Ivoire"))
                .with_element(MockElement::new("q").tag("td").text(r#"O'Brien said "hi""#));
            assert_eq!(
                driver
                    .find_all(&Locator::contains_text("option", "d'Ivoire"))
                    .unwrap()
                    .len(),
                1
            );
            assert_eq!(
                driver
                    .find_all(&Locator::contains_text("td", r#"O'Brien said "hi""#))
                    .unwrap()
                    .len(),
                1
            );
            assert!(driver
                .find_all(&Locator::xpath("//option[contains(.,'Cote d'Ivoire')]"))
                .unwrap()
                .is_empty());
        }

        #[test]
        fn test_find_one_missing_is_no_such_element() {
            let (_, driver) = driver();
            let err = driver.find_one(&Locator::id("missing")).unwrap_err();
            assert!(matches!(err, PagewrightError::NoSuchElement { .. }));
        }

        #[test]
        fn test_presence_follows_clock() {
            let (clock, driver) = driver();
            let driver = driver.with_element(
                MockElement::new("flash")
                    .appears_at(Duration::from_secs(1))
                    .removed_at(Duration::from_secs(2)),
            );
            assert!(driver.find_all(&Locator::id("flash")).unwrap().is_empty());
            clock.advance(Duration::from_secs(1));
            assert_eq!(driver.find_all(&Locator::id("flash")).unwrap().len(), 1);
            clock.advance(Duration::from_secs(1));
            assert!(driver.find_all(&Locator::id("flash")).unwrap().is_empty());
        }
    }

    mod staleness_tests {
        use super::*;

        #[test]
        fn test_replaced_element_handle_is_stale() {
            let (_, driver) = driver();
            let driver = driver.with_element(MockElement::new("row").text("a"));
            let old = driver.find_one(&Locator::id("row")).unwrap();
            driver.replace_element("row");
            assert!(matches!(
                driver.text(&old).unwrap_err(),
                PagewrightError::StaleReference { .. }
            ));
            let fresh = driver.find_one(&Locator::id("row")).unwrap();
            assert_eq!(driver.text(&fresh).unwrap(), "a");
        }

        #[test]
        fn test_removed_element_handle_is_stale() {
            let (_, driver) = driver();
            let driver = driver.with_element(MockElement::new("row"));
            let handle = driver.find_one(&Locator::id("row")).unwrap();
            driver.remove_element("row");
            assert!(driver.click(&handle).is_err());
        }
    }

    mod input_tests {
        use super::*;

        #[test]
        fn test_send_keys_respects_max_length() {
            let (_, driver) = driver();
            let driver = driver.with_element(MockElement::input("name").max_length(3));
            let handle = driver.find_one(&Locator::id("name")).unwrap();
            driver.send_keys(&handle, "abcdef").unwrap();
            assert_eq!(driver.element_value("name").as_deref(), Some("abc"));
        }

        #[test]
        fn test_select_all_delete_clears() {
            let (_, driver) = driver();
            let driver = driver.with_element(MockElement::input("name").value("old"));
            let handle = driver.find_one(&Locator::id("name")).unwrap();
            driver
                .send_key_sequence(&handle, &KeyInput::select_all_and_delete())
                .unwrap();
            assert_eq!(driver.element_value("name").as_deref(), Some(""));
        }

        #[test]
        fn test_input_text_is_empty_but_value_is_readable() {
            let (_, driver) = driver();
            let driver = driver.with_element(MockElement::input("name").value("typed"));
            let handle = driver.find_one(&Locator::id("name")).unwrap();
            assert_eq!(driver.text(&handle).unwrap(), "");
            assert_eq!(
                driver.attribute(&handle, "value").unwrap().as_deref(),
                Some("typed")
            );
        }

        #[test]
        fn test_counter_tracks_input_length() {
            let (_, driver) = driver();
            let driver = driver
                .with_element(MockElement::input("bio"))
                .with_element(MockElement::new("left").counter_for("bio", 5));
            let input = driver.find_one(&Locator::id("bio")).unwrap();
            let counter = driver.find_one(&Locator::id("left")).unwrap();
            assert_eq!(driver.text(&counter).unwrap(), "5");
            driver.send_keys(&input, "ab").unwrap();
            assert_eq!(driver.text(&counter).unwrap(), "3");
        }
    }

    mod click_tests {
        use super::*;

        #[test]
        fn test_overlay_intercepts_until_uncovered() {
            let (clock, driver) = driver();
            let driver = driver
                .with_element(MockElement::new("submit").covered_until(Duration::from_secs(2)));
            let handle = driver.find_one(&Locator::id("submit")).unwrap();
            assert!(driver.click(&handle).is_err());
            assert!(driver.is_interactable(&handle).unwrap());
            clock.advance(Duration::from_secs(2));
            driver.click(&handle).unwrap();
            assert!(driver.was_called("click:submit"));
        }

        #[test]
        fn test_option_click_selects_exclusively() {
            let (_, driver) = driver();
            let driver = driver
                .with_element(MockElement::new("country").tag("select"))
                .with_element(MockElement::option("ke", "country", "Kenya").selected(true))
                .with_element(MockElement::option("ug", "country", "Uganda"));
            let uganda = driver.find_one(&Locator::id("ug")).unwrap();
            driver.click(&uganda).unwrap();
            assert!(driver.is_element_selected("ug"));
            assert!(!driver.is_element_selected("ke"));
        }

        #[test]
        fn test_window_opening_link() {
            let (_, driver) = driver();
            let driver = driver.with_element(MockElement::new("help").opens_window("popup"));
            let link = driver.find_one(&Locator::id("help")).unwrap();
            driver.click(&link).unwrap();
            assert_eq!(driver.window_handles().unwrap(), vec!["main", "popup"]);
        }
    }

    mod context_tests {
        use super::*;

        #[test]
        fn test_frames_and_alerts() {
            let (_, driver) = driver();
            let driver = driver.with_frame("editor");
            assert!(driver.switch_to_frame("other").is_err());
            driver.switch_to_frame("editor").unwrap();
            assert_eq!(driver.current_frame().as_deref(), Some("editor"));
            driver.switch_to_default_content().unwrap();
            assert!(driver.current_frame().is_none());

            assert!(matches!(driver.accept_alert(), Err(PagewrightError::NoAlert)));
            driver.open_alert("Saved");
            assert_eq!(driver.alert_text().unwrap(), "Saved");
            driver.accept_alert().unwrap();
            assert!(!driver.has_alert());
        }

        #[test]
        fn test_default_screenshot_is_png() {
            let (_, driver) = driver();
            let shot = driver.screenshot().unwrap();
            assert!(shot.data.starts_with(&PNG_SIGNATURE));
        }
    }
}
