//! In-memory document backend.
//!
//! A deterministic stand-in for a live page: elements carry attributes,
//! values and toggle state, and every interaction the engine performs is
//! recorded in a per-element journal. This is the harness all engine tests
//! run against, and doubles as a dry-run backend for embedders that want to
//! inspect what a fill would do before pointing it at a real page.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::backends::DomBackend;
use crate::element::{DomElement, DomElementImpl, SelectOption};
use crate::errors::FillError;
use crate::events::{EventClass, EventKind, NativeValueWriter, SharedWriter, SyntheticEvent};

/// One recorded interaction with an element.
#[derive(Debug, Clone, PartialEq)]
pub enum JournalEntry {
    Event(EventKind),
    NativeWrite(String),
    RawWrite(String),
    EditorInsert(String),
    EditorDelete,
    Focus,
    SelectAll,
    Click,
    FormSubmit,
}

#[derive(Debug)]
struct ElementState {
    tag: String,
    attrs: HashMap<String, String>,
    value: String,
    text: String,
    checked: bool,
    content_editable: bool,
    visible: bool,
    options: Vec<SelectOption>,
    selected_index: Option<usize>,
    /// Listbox id this element is an option of, if any.
    parent_listbox: Option<String>,
    /// Form element id this control belongs to, if any.
    form: Option<String>,
    /// Simulates a page where the specific event constructors are
    /// unavailable, forcing the generic fallback.
    reject_specific_events: bool,
    journal: Vec<JournalEntry>,
}

#[derive(Debug)]
struct DocState {
    hostname: String,
    elements: Vec<ElementState>,
    /// `<label for=…>` text keyed by control id.
    labels: HashMap<String, String>,
}

/// Declarative description of one element, consumed by [`MemoryDom::insert`].
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    attrs: HashMap<String, String>,
    value: String,
    text: String,
    checked: bool,
    content_editable: bool,
    hidden: bool,
    options: Vec<SelectOption>,
    parent_listbox: Option<String>,
    form: Option<String>,
    reject_specific_events: bool,
}

impl ElementSpec {
    pub fn input(input_type: &str) -> Self {
        Self {
            tag: "input".into(),
            ..Default::default()
        }
        .attr("type", input_type)
    }

    pub fn text_input() -> Self {
        Self::input("text")
    }

    pub fn textarea() -> Self {
        Self {
            tag: "textarea".into(),
            ..Default::default()
        }
    }

    pub fn select(options: &[(&str, &str)]) -> Self {
        Self {
            tag: "select".into(),
            options: options
                .iter()
                .map(|(value, text)| SelectOption {
                    value: (*value).into(),
                    text: (*text).into(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn checkbox() -> Self {
        Self::input("checkbox")
    }

    pub fn radio() -> Self {
        Self::input("radio")
    }

    pub fn button(text: &str) -> Self {
        Self {
            tag: "button".into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn form() -> Self {
        Self {
            tag: "form".into(),
            ..Default::default()
        }
    }

    pub fn editable_div() -> Self {
        Self {
            tag: "div".into(),
            content_editable: true,
            ..Default::default()
        }
    }

    pub fn listbox() -> Self {
        Self {
            tag: "ul".into(),
            ..Default::default()
        }
        .attr("role", "listbox")
    }

    /// An option row inside the listbox with the given id.
    pub fn listbox_option(listbox_id: &str, text: &str) -> Self {
        Self {
            tag: "li".into(),
            text: text.into(),
            parent_listbox: Some(listbox_id.into()),
            ..Default::default()
        }
        .attr("role", "option")
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn name(self, name: &str) -> Self {
        self.attr("name", name)
    }

    pub fn placeholder(self, placeholder: &str) -> Self {
        self.attr("placeholder", placeholder)
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.into();
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.into();
        self
    }

    pub fn checked(mut self, state: bool) -> Self {
        self.checked = state;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn in_form(mut self, form_id: &str) -> Self {
        self.form = Some(form_id.into());
        self
    }

    pub fn reject_specific_events(mut self) -> Self {
        self.reject_specific_events = true;
        self
    }
}

/// An in-memory document.
#[derive(Clone)]
pub struct MemoryDom {
    doc: Arc<Mutex<DocState>>,
}

impl MemoryDom {
    pub fn new(hostname: &str) -> Self {
        Self {
            doc: Arc::new(Mutex::new(DocState {
                hostname: hostname.into(),
                elements: Vec::new(),
                labels: HashMap::new(),
            })),
        }
    }

    /// Append an element in document order, returning its index.
    pub fn insert(&self, spec: ElementSpec) -> usize {
        let mut doc = self.doc.lock().unwrap();
        doc.elements.push(ElementState {
            tag: spec.tag,
            attrs: spec.attrs,
            value: spec.value,
            text: spec.text,
            checked: spec.checked,
            content_editable: spec.content_editable,
            visible: !spec.hidden,
            options: spec.options,
            selected_index: None,
            parent_listbox: spec.parent_listbox,
            form: spec.form,
            reject_specific_events: spec.reject_specific_events,
            journal: Vec::new(),
        });
        doc.elements.len() - 1
    }

    /// Associate `<label for=control_id>` text with a control.
    pub fn add_label(&self, control_id: &str, text: &str) {
        let mut doc = self.doc.lock().unwrap();
        doc.labels.insert(control_id.into(), text.into());
    }

    fn index_of_id(&self, id: &str) -> Option<usize> {
        let doc = self.doc.lock().unwrap();
        doc.elements
            .iter()
            .position(|el| el.attrs.get("id").map(String::as_str) == Some(id))
    }

    fn handle(&self, index: usize) -> DomElement {
        DomElement::new(MemoryElement {
            doc: self.doc.clone(),
            index,
        })
    }

    // ---- inspection API for tests and dry runs ----

    pub fn value_of(&self, id: &str) -> Option<String> {
        let index = self.index_of_id(id)?;
        let doc = self.doc.lock().unwrap();
        let el = &doc.elements[index];
        Some(if el.content_editable {
            el.text.clone()
        } else {
            el.value.clone()
        })
    }

    pub fn checked_of(&self, id: &str) -> Option<bool> {
        let index = self.index_of_id(id)?;
        let doc = self.doc.lock().unwrap();
        Some(doc.elements[index].checked)
    }

    /// Index of the option carrying the selected flag, for selects.
    pub fn selected_index_of(&self, id: &str) -> Option<usize> {
        let index = self.index_of_id(id)?;
        let doc = self.doc.lock().unwrap();
        doc.elements[index].selected_index
    }

    pub fn journal_of(&self, id: &str) -> Vec<JournalEntry> {
        match self.index_of_id(id) {
            Some(index) => self.doc.lock().unwrap().elements[index].journal.clone(),
            None => Vec::new(),
        }
    }

    pub fn journal_at(&self, index: usize) -> Vec<JournalEntry> {
        self.doc.lock().unwrap().elements[index].journal.clone()
    }

    pub fn clear_journals(&self) {
        let mut doc = self.doc.lock().unwrap();
        for el in &mut doc.elements {
            el.journal.clear();
        }
    }
}

impl DomBackend for MemoryDom {
    fn hostname(&self) -> String {
        self.doc.lock().unwrap().hostname.clone()
    }

    fn form_controls(&self) -> Result<Vec<DomElement>, FillError> {
        let doc = self.doc.lock().unwrap();
        let indices: Vec<usize> = doc
            .elements
            .iter()
            .enumerate()
            .filter(|(_, el)| {
                matches!(el.tag.as_str(), "input" | "textarea" | "select") || el.content_editable
            })
            .map(|(i, _)| i)
            .collect();
        drop(doc);
        Ok(indices.into_iter().map(|i| self.handle(i)).collect())
    }

    fn element_by_id(&self, id: &str) -> Result<Option<DomElement>, FillError> {
        Ok(self.index_of_id(id).map(|i| self.handle(i)))
    }

    fn label_text_for(&self, control_id: &str) -> Option<String> {
        self.doc.lock().unwrap().labels.get(control_id).cloned()
    }

    fn listbox_options(&self, listbox_id: Option<&str>) -> Result<Vec<DomElement>, FillError> {
        let doc = self.doc.lock().unwrap();
        let target_id = match listbox_id {
            Some(id) => Some(id.to_string()),
            // Fall back to the first [role=listbox] in the document.
            None => doc
                .elements
                .iter()
                .find(|el| el.attrs.get("role").map(String::as_str) == Some("listbox"))
                .and_then(|el| el.attrs.get("id").cloned()),
        };
        let Some(target_id) = target_id else {
            return Ok(Vec::new());
        };
        let indices: Vec<usize> = doc
            .elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.parent_listbox.as_deref() == Some(target_id.as_str()))
            .map(|(i, _)| i)
            .collect();
        drop(doc);
        Ok(indices.into_iter().map(|i| self.handle(i)).collect())
    }

    fn submit_candidates(&self) -> Result<Vec<DomElement>, FillError> {
        let doc = self.doc.lock().unwrap();
        let indices: Vec<usize> = doc
            .elements
            .iter()
            .enumerate()
            .filter(|(_, el)| {
                el.tag == "button"
                    || (el.tag == "input"
                        && matches!(
                            el.attrs.get("type").map(String::as_str),
                            Some("submit") | Some("button")
                        ))
                    || el.attrs.get("role").map(String::as_str) == Some("button")
            })
            .map(|(i, _)| i)
            .collect();
        drop(doc);
        Ok(indices.into_iter().map(|i| self.handle(i)).collect())
    }

    fn native_value_writer(&self) -> SharedWriter {
        Arc::new(MemoryWriter {
            doc: self.doc.clone(),
        })
    }
}

/// The memory document's unintercepted write path. Writes land directly in
/// element state, the analog of calling the control prototype's value setter.
struct MemoryWriter {
    doc: Arc<Mutex<DocState>>,
}

impl NativeValueWriter for MemoryWriter {
    fn write(&self, element: &DomElement, value: &str) -> Result<(), FillError> {
        let target = element
            .as_any()
            .downcast_ref::<MemoryElement>()
            .ok_or_else(|| {
                FillError::UnsupportedOperation("element belongs to a different backend".into())
            })?;
        let mut doc = self.doc.lock().unwrap();
        let el = &mut doc.elements[target.index];
        if el.content_editable {
            el.text = value.into();
        } else {
            el.value = value.into();
        }
        el.journal.push(JournalEntry::NativeWrite(value.into()));
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct MemoryElement {
    doc: Arc<Mutex<DocState>>,
    index: usize,
}

impl MemoryElement {
    fn with_state<R>(&self, f: impl FnOnce(&ElementState) -> R) -> R {
        let doc = self.doc.lock().unwrap();
        f(&doc.elements[self.index])
    }

    fn with_state_mut<R>(&self, f: impl FnOnce(&mut ElementState) -> R) -> R {
        let mut doc = self.doc.lock().unwrap();
        f(&mut doc.elements[self.index])
    }
}

impl DomElementImpl for MemoryElement {
    fn tag(&self) -> String {
        self.with_state(|el| el.tag.clone())
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.with_state(|el| el.attrs.get(name).cloned())
    }

    fn value(&self) -> String {
        self.with_state(|el| {
            if el.content_editable {
                el.text.clone()
            } else {
                el.value.clone()
            }
        })
    }

    fn checked(&self) -> bool {
        self.with_state(|el| el.checked)
    }

    fn set_checked(&self, state: bool) {
        self.with_state_mut(|el| el.checked = state)
    }

    fn is_content_editable(&self) -> bool {
        self.with_state(|el| el.content_editable)
    }

    fn is_visible(&self) -> bool {
        self.with_state(|el| el.visible)
    }

    fn options(&self) -> Vec<SelectOption> {
        self.with_state(|el| el.options.clone())
    }

    fn select_option_at(&self, index: usize) -> Result<(), FillError> {
        self.with_state_mut(|el| {
            let value = el
                .options
                .get(index)
                .ok_or_else(|| FillError::InvalidValue(format!("no option at index {index}")))?
                .value
                .clone();
            el.value = value;
            el.selected_index = Some(index);
            Ok(())
        })
    }

    fn set_value_raw(&self, value: &str) {
        self.with_state_mut(|el| {
            if el.content_editable {
                el.text = value.into();
            } else {
                el.value = value.into();
            }
            el.journal.push(JournalEntry::RawWrite(value.into()));
        })
    }

    fn dispatch(&self, event: &SyntheticEvent) -> Result<(), FillError> {
        self.with_state_mut(|el| {
            if el.reject_specific_events && event.class != EventClass::Generic {
                return Err(FillError::UnsupportedEvent(
                    event.kind.dom_name().to_string(),
                ));
            }
            el.journal.push(JournalEntry::Event(event.kind));
            Ok(())
        })
    }

    fn focus(&self) -> Result<(), FillError> {
        self.with_state_mut(|el| el.journal.push(JournalEntry::Focus));
        Ok(())
    }

    fn select_all(&self) -> Result<(), FillError> {
        self.with_state_mut(|el| el.journal.push(JournalEntry::SelectAll));
        Ok(())
    }

    fn click(&self) -> Result<(), FillError> {
        self.with_state_mut(|el| {
            let input_type = el.attrs.get("type").cloned();
            match input_type.as_deref() {
                Some("checkbox") => el.checked = !el.checked,
                Some("radio") => el.checked = true,
                _ => {}
            }
            el.journal.push(JournalEntry::Click);
        });
        Ok(())
    }

    fn text(&self) -> String {
        self.with_state(|el| el.text.clone())
    }

    fn insert_editor_text(&self, text: &str) -> Result<(), FillError> {
        self.with_state_mut(|el| {
            el.text.push_str(text);
            el.journal.push(JournalEntry::EditorInsert(text.into()));
        });
        Ok(())
    }

    fn delete_editor_content(&self) -> Result<(), FillError> {
        self.with_state_mut(|el| {
            el.text.clear();
            el.journal.push(JournalEntry::EditorDelete);
        });
        Ok(())
    }

    fn submit_form(&self) -> Result<bool, FillError> {
        let mut doc = self.doc.lock().unwrap();
        let Some(form_id) = doc.elements[self.index].form.clone() else {
            return Ok(false);
        };
        let form_index = doc
            .elements
            .iter()
            .position(|el| el.tag == "form" && el.attrs.get("id").map(String::as_str) == Some(form_id.as_str()))
            .ok_or_else(|| FillError::ElementNotFound(form_id.clone()))?;
        doc.elements[form_index].journal.push(JournalEntry::FormSubmit);
        Ok(true)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn clone_box(&self) -> Box<dyn DomElementImpl> {
        Box::new(self.clone())
    }
}
