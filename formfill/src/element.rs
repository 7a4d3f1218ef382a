use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::errors::FillError;
use crate::events::SyntheticEvent;

/// The control kinds the engine drives, inferred from tag and attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Text,
    TextArea,
    Checkbox,
    Radio,
    Select,
    Combobox,
    ContentEditable,
}

/// One `<option>` of a native select.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

/// Represents an editable element of the live document.
///
/// Only valid for the duration of the fill invocation that resolved it; the
/// page's own reactive code may replace nodes between invocations, so targets
/// are recomputed every call and never cached.
#[derive(Debug)]
pub struct DomElement {
    inner: Box<dyn DomElementImpl>,
}

impl DomElement {
    pub fn new(impl_: impl DomElementImpl + 'static) -> Self {
        Self {
            inner: Box::new(impl_),
        }
    }

    pub fn tag(&self) -> String {
        self.inner.tag()
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.inner.attr(name)
    }

    pub fn id(&self) -> Option<String> {
        self.attr("id")
    }

    pub fn name_attr(&self) -> Option<String> {
        self.attr("name")
    }

    pub fn placeholder(&self) -> Option<String> {
        self.attr("placeholder")
    }

    pub fn role(&self) -> Option<String> {
        self.attr("role")
    }

    pub fn aria_label(&self) -> Option<String> {
        self.attr("aria-label")
    }

    pub fn aria_controls(&self) -> Option<String> {
        self.attr("aria-controls")
    }

    pub fn aria_labelledby(&self) -> Option<String> {
        self.attr("aria-labelledby")
    }

    pub fn data_value(&self) -> Option<String> {
        self.attr("data-value")
    }

    /// The input `type`, lowercased, defaulting to `text` for inputs.
    pub fn input_type(&self) -> String {
        self.attr("type")
            .map(|t| t.to_lowercase())
            .unwrap_or_else(|| "text".to_string())
    }

    /// Infer the control kind this element must be driven as.
    pub fn control_kind(&self) -> ControlKind {
        let tag = self.tag().to_lowercase();
        match tag.as_str() {
            "textarea" => ControlKind::TextArea,
            "select" => ControlKind::Select,
            "input" => {
                if self.role().as_deref() == Some("combobox") {
                    return ControlKind::Combobox;
                }
                match self.input_type().as_str() {
                    "checkbox" => ControlKind::Checkbox,
                    "radio" => ControlKind::Radio,
                    _ => ControlKind::Text,
                }
            }
            _ if self.is_content_editable() => ControlKind::ContentEditable,
            _ => ControlKind::Text,
        }
    }

    pub fn value(&self) -> String {
        self.inner.value()
    }

    pub fn checked(&self) -> bool {
        self.inner.checked()
    }

    pub fn set_checked(&self, state: bool) {
        self.inner.set_checked(state)
    }

    pub fn is_content_editable(&self) -> bool {
        self.inner.is_content_editable()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.is_visible()
    }

    pub fn options(&self) -> Vec<SelectOption> {
        self.inner.options()
    }

    pub fn select_option_at(&self, index: usize) -> Result<(), FillError> {
        self.inner.select_option_at(index)
    }

    /// Plain (interceptable) property assignment. Last-resort path only;
    /// widgets write through the captured native setter.
    pub fn set_value_raw(&self, value: &str) {
        self.inner.set_value_raw(value)
    }

    pub fn dispatch(&self, event: &SyntheticEvent) -> Result<(), FillError> {
        self.inner.dispatch(event)
    }

    pub fn focus(&self) -> Result<(), FillError> {
        self.inner.focus()
    }

    pub fn select_all(&self) -> Result<(), FillError> {
        self.inner.select_all()
    }

    pub fn click(&self) -> Result<(), FillError> {
        self.inner.click()
    }

    pub fn text(&self) -> String {
        self.inner.text()
    }

    pub fn insert_editor_text(&self, text: &str) -> Result<(), FillError> {
        self.inner.insert_editor_text(text)
    }

    pub fn delete_editor_content(&self) -> Result<(), FillError> {
        self.inner.delete_editor_content()
    }

    /// Submit the containing form through its native submission mechanism.
    /// Returns `Ok(false)` when the element is not inside a form.
    pub fn submit_form(&self) -> Result<bool, FillError> {
        self.inner.submit_form()
    }

    /// Enable downcasting to concrete backend element types.
    pub fn as_any(&self) -> &dyn std::any::Any {
        self.inner.as_any()
    }
}

impl Clone for DomElement {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_box(),
        }
    }
}

/// Interface for backend-specific element implementations.
///
/// The engine runs against whatever document a backend exposes; this trait is
/// the per-element half of that seam (the document half is
/// [`DomBackend`](crate::backends::DomBackend)).
pub trait DomElementImpl: Send + Sync + Debug {
    fn tag(&self) -> String;
    fn attr(&self, name: &str) -> Option<String>;
    fn value(&self) -> String;
    fn checked(&self) -> bool;
    fn set_checked(&self, state: bool);
    fn is_content_editable(&self) -> bool;
    fn is_visible(&self) -> bool;
    fn options(&self) -> Vec<SelectOption>;
    fn select_option_at(&self, index: usize) -> Result<(), FillError>;
    fn set_value_raw(&self, value: &str);
    fn dispatch(&self, event: &SyntheticEvent) -> Result<(), FillError>;
    fn focus(&self) -> Result<(), FillError>;
    fn select_all(&self) -> Result<(), FillError>;
    fn click(&self) -> Result<(), FillError>;
    fn text(&self) -> String;
    fn insert_editor_text(&self, text: &str) -> Result<(), FillError>;
    fn delete_editor_content(&self) -> Result<(), FillError>;
    fn submit_form(&self) -> Result<bool, FillError>;
    fn as_any(&self) -> &dyn std::any::Any;
    fn clone_box(&self) -> Box<dyn DomElementImpl>;
}
