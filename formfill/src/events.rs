//! Synthetic DOM event construction and dispatch.
//!
//! Frameworks on the page listen for events rather than trusting raw property
//! assignment, so every value mutation goes through the element's native value
//! setter followed by the event sequence a real user interaction would produce.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::element::DomElement;
use crate::errors::FillError;

/// DOM event types the engine knows how to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    KeyDown,
    KeyPress,
    KeyUp,
    BeforeInput,
    Input,
    Change,
    Focus,
    Blur,
    MouseOver,
    MouseDown,
    MouseUp,
    Click,
}

impl EventKind {
    /// The DOM event name, as page-side listeners see it.
    pub fn dom_name(&self) -> &'static str {
        match self {
            EventKind::KeyDown => "keydown",
            EventKind::KeyPress => "keypress",
            EventKind::KeyUp => "keyup",
            EventKind::BeforeInput => "beforeinput",
            EventKind::Input => "input",
            EventKind::Change => "change",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
            EventKind::MouseOver => "mouseover",
            EventKind::MouseDown => "mousedown",
            EventKind::MouseUp => "mouseup",
            EventKind::Click => "click",
        }
    }

    /// The most specific event class available for this type.
    pub fn preferred_class(&self) -> EventClass {
        match self {
            EventKind::KeyDown | EventKind::KeyPress | EventKind::KeyUp => EventClass::Keyboard,
            EventKind::BeforeInput | EventKind::Input => EventClass::Input,
            EventKind::MouseOver | EventKind::MouseDown | EventKind::MouseUp | EventKind::Click => {
                EventClass::Mouse
            }
            _ => EventClass::Generic,
        }
    }
}

/// Which event constructor a backend should use for a dispatch.
///
/// Pages observe `InputEvent`/`KeyboardEvent`/`MouseEvent` instances for the
/// corresponding types; `Generic` is the plain-`Event` fallback used when a
/// backend reports the specific class unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Input,
    Keyboard,
    Mouse,
    Generic,
}

/// A fully described event, ready for a backend to construct and dispatch.
///
/// `bubbles`, `cancelable` and `composed` are always set so listeners
/// delegated high in the tree still observe the event.
#[derive(Debug, Clone)]
pub struct SyntheticEvent {
    pub kind: EventKind,
    pub class: EventClass,
    /// Key name for keyboard events.
    pub key: Option<String>,
    /// Inserted/deleted data for input events.
    pub data: Option<String>,
    /// `inputType` for input events ("insertText", "deleteContent").
    pub input_type: Option<&'static str>,
    pub bubbles: bool,
    pub cancelable: bool,
    pub composed: bool,
}

impl SyntheticEvent {
    fn new(kind: EventKind) -> Self {
        Self {
            kind,
            class: kind.preferred_class(),
            key: None,
            data: None,
            input_type: None,
            bubbles: true,
            cancelable: true,
            composed: true,
        }
    }

    /// A plain event with no payload (change, blur, focus).
    pub fn simple(kind: EventKind) -> Self {
        Self::new(kind)
    }

    /// A keyboard event carrying the pressed key.
    pub fn keyboard(kind: EventKind, key: impl Into<String>) -> Self {
        let mut ev = Self::new(kind);
        ev.key = Some(key.into());
        ev
    }

    /// An input/beforeinput event carrying the mutated data.
    pub fn input(kind: EventKind, data: impl Into<String>, input_type: &'static str) -> Self {
        let mut ev = Self::new(kind);
        ev.data = Some(data.into());
        ev.input_type = Some(input_type);
        ev
    }

    /// A pointer event.
    pub fn mouse(kind: EventKind) -> Self {
        Self::new(kind)
    }

    /// The same event downgraded to the generic constructor.
    pub fn as_generic(&self) -> Self {
        let mut ev = self.clone();
        ev.class = EventClass::Generic;
        ev
    }
}

/// The unintercepted write path to an element's value.
///
/// Framework-managed inputs frequently shadow the instance `value` setter with
/// a wrapper that skips the framework's internal state sync. Backends resolve
/// the control prototype's original setter once, before any page script could
/// have overridden it, and expose it through this capability. It is captured
/// at [`Page`](crate::Page) construction and injected into every widget.
pub trait NativeValueWriter: Send + Sync {
    fn write(&self, element: &DomElement, value: &str) -> Result<(), FillError>;
}

/// Builds and dispatches synthetic events, best effort.
///
/// Dispatch failures never propagate: a specific event class the backend
/// cannot construct falls back to a generic event, and anything else is
/// logged and swallowed so one hostile listener cannot abort a fill.
pub struct EventSynthesizer;

impl EventSynthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn fire(&self, element: &DomElement, event: SyntheticEvent) {
        match element.dispatch(&event) {
            Ok(()) => {}
            Err(FillError::UnsupportedEvent(_)) if event.class != EventClass::Generic => {
                debug!(
                    event = event.kind.dom_name(),
                    "specific event class unavailable, falling back to generic"
                );
                if let Err(e) = element.dispatch(&event.as_generic()) {
                    debug!(event = event.kind.dom_name(), error = %e, "generic dispatch failed");
                }
            }
            Err(e) => {
                debug!(event = event.kind.dom_name(), error = %e, "event dispatch failed");
            }
        }
    }

    /// The pointer sequence a real click produces, ending with an actual
    /// `click()` call so click-bound listeners fire identically to a user
    /// click. Falls back to the synthetic click event if the call errors.
    pub fn pointer_click(&self, element: &DomElement) {
        self.fire(element, SyntheticEvent::mouse(EventKind::MouseOver));
        self.fire(element, SyntheticEvent::mouse(EventKind::MouseDown));
        self.fire(element, SyntheticEvent::mouse(EventKind::MouseUp));
        if let Err(e) = element.click() {
            debug!(error = %e, "native click failed, dispatching synthetic click");
            self.fire(element, SyntheticEvent::mouse(EventKind::Click));
        }
    }
}

impl Default for EventSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience alias used across widgets.
pub type SharedWriter = Arc<dyn NativeValueWriter>;
