use crate::element::DomElement;
use crate::errors::FillError;
use crate::events::SharedWriter;

/// The common trait every document backend must implement.
///
/// A backend is the engine's view of one live page: the editable controls in
/// document order, the label/listbox structure around them, and the captured
/// native value setters. All queries reflect the document at call time — the
/// page's own scripts are expected to mutate it between the engine's steps.
pub trait DomBackend: Send + Sync {
    /// Hostname of the page, for profile activation predicates.
    fn hostname(&self) -> String;

    /// Every `input`, `textarea`, `select` and contenteditable element,
    /// in document order.
    fn form_controls(&self) -> Result<Vec<DomElement>, FillError>;

    /// All native selects, in document order.
    fn selects(&self) -> Result<Vec<DomElement>, FillError> {
        Ok(self
            .form_controls()?
            .into_iter()
            .filter(|el| el.tag().eq_ignore_ascii_case("select"))
            .collect())
    }

    /// Look up an element by its `id` attribute.
    fn element_by_id(&self, id: &str) -> Result<Option<DomElement>, FillError>;

    /// Text of the `<label for=…>` associated with a control id, if any.
    fn label_text_for(&self, control_id: &str) -> Option<String>;

    /// Option-like entries of an ARIA listbox. `listbox_id` comes from the
    /// combobox's `aria-controls`; `None` falls back to the first
    /// `[role=listbox]` in the document.
    fn listbox_options(&self, listbox_id: Option<&str>) -> Result<Vec<DomElement>, FillError>;

    /// Submit-capable controls: buttons, submit/button inputs and
    /// `[role=button]` elements, in document order.
    fn submit_candidates(&self) -> Result<Vec<DomElement>, FillError>;

    /// Resolve the unintercepted value write path once, at engine
    /// initialization, before page code could shadow instance setters.
    fn native_value_writer(&self) -> SharedWriter;
}

pub mod memory;
