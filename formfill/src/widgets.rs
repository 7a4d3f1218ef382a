//! Per-control-type input strategies.
//!
//! Each handler knows the event contract of its control: what a real user
//! interaction looks like to page-side listeners, and in which order the
//! value mutation and the events must interleave.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use crate::backends::DomBackend;
use crate::config::FillConfig;
use crate::element::{ControlKind, DomElement};
use crate::events::{EventKind, EventSynthesizer, SharedWriter, SyntheticEvent};
use crate::resolver::ResolvedTarget;
use crate::timing::DelaySource;
use crate::types::FieldValue;

/// Terminal states of the combobox state machine. `Failed` is silent and
/// non-fatal: the field is left as typed text with no selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboboxOutcome {
    Picked,
    Failed,
}

/// The full widget-handler set for one fill invocation.
pub struct WidgetSet<'a> {
    synth: EventSynthesizer,
    writer: SharedWriter,
    delays: Arc<dyn DelaySource>,
    config: &'a FillConfig,
}

impl<'a> WidgetSet<'a> {
    pub fn new(writer: SharedWriter, delays: Arc<dyn DelaySource>, config: &'a FillConfig) -> Self {
        Self {
            synth: EventSynthesizer::new(),
            writer,
            delays,
            config,
        }
    }

    pub fn synthesizer(&self) -> &EventSynthesizer {
        &self.synth
    }

    /// Apply a value to a resolved target using the strategy its control
    /// kind requires.
    pub async fn apply(
        &self,
        backend: &dyn DomBackend,
        target: &ResolvedTarget,
        value: &FieldValue,
    ) {
        match target.kind {
            ControlKind::Text | ControlKind::TextArea | ControlKind::ContentEditable => {
                self.type_text(&target.element, &value.as_text()).await;
            }
            ControlKind::Checkbox | ControlKind::Radio => {
                self.set_toggled(&target.element, value.as_flag());
            }
            ControlKind::Select => {
                self.select_value(&target.element, &value.as_text());
            }
            ControlKind::Combobox => {
                self.pick_combobox(backend, &target.element, &value.as_text(), None)
                    .await;
            }
        }
    }

    /// Character-level typed input.
    ///
    /// Focus + select-all, clear, then per character: `keydown`, `keypress`,
    /// `beforeinput`, native write of the accumulated prefix, `input`,
    /// `keyup`, with a randomized pause before the next character. Finalized
    /// with `change` then `blur`. An empty value still runs the clear step,
    /// so the field is blanked rather than skipped.
    #[instrument(level = "debug", skip(self, element, text), fields(chars = text.chars().count()))]
    pub async fn type_text(&self, element: &DomElement, text: &str) {
        if let Err(e) = element.focus() {
            debug!(error = %e, "focus failed");
        }
        if let Err(e) = element.select_all() {
            debug!(error = %e, "select-all failed");
        }

        self.clear(element);
        self.synth.fire(
            element,
            SyntheticEvent::input(EventKind::Input, "", "deleteContent"),
        );

        let editable = element.is_content_editable();
        let mut prefix = String::with_capacity(text.len());
        for ch in text.chars() {
            let key = ch.to_string();
            self.synth
                .fire(element, SyntheticEvent::keyboard(EventKind::KeyDown, &key));
            self.synth
                .fire(element, SyntheticEvent::keyboard(EventKind::KeyPress, &key));
            self.synth.fire(
                element,
                SyntheticEvent::input(EventKind::BeforeInput, &key, "insertText"),
            );

            prefix.push(ch);
            if editable {
                if element.insert_editor_text(&key).is_err() {
                    element.set_value_raw(&prefix);
                }
            } else if let Err(e) = self.writer.write(element, &prefix) {
                debug!(error = %e, "native write failed, falling back to property assignment");
                element.set_value_raw(&prefix);
            }

            self.synth.fire(
                element,
                SyntheticEvent::input(EventKind::Input, &key, "insertText"),
            );
            self.synth
                .fire(element, SyntheticEvent::keyboard(EventKind::KeyUp, &key));

            sleep(self.delays.pause(self.config.typing_delay_ms)).await;
        }

        self.synth
            .fire(element, SyntheticEvent::simple(EventKind::Change));
        self.synth
            .fire(element, SyntheticEvent::simple(EventKind::Blur));
    }

    fn clear(&self, element: &DomElement) {
        if element.is_content_editable() {
            if element.delete_editor_content().is_err() {
                element.set_value_raw("");
            }
        } else if let Err(e) = self.writer.write(element, "") {
            debug!(error = %e, "native clear failed, falling back to property assignment");
            element.set_value_raw("");
        }
    }

    /// Checkbox/radio handling through a real pointer interaction.
    ///
    /// Skipped entirely when a checkbox already holds the desired state, so
    /// no spurious `change` fires; radios only ever transition to checked.
    pub fn set_toggled(&self, element: &DomElement, want: bool) {
        let is_radio = element.control_kind() == ControlKind::Radio;
        if is_radio {
            if element.checked() {
                return;
            }
        } else if element.checked() == want {
            return;
        }

        self.synth
            .fire(element, SyntheticEvent::mouse(EventKind::MouseOver));
        self.synth
            .fire(element, SyntheticEvent::mouse(EventKind::MouseDown));
        self.synth
            .fire(element, SyntheticEvent::mouse(EventKind::MouseUp));
        if let Err(e) = element.click() {
            debug!(error = %e, "click failed, assigning checked state directly");
            element.set_checked(if is_radio { true } else { want });
        }

        self.synth
            .fire(element, SyntheticEvent::simple(EventKind::Change));
        self.synth
            .fire(element, SyntheticEvent::simple(EventKind::Blur));
    }

    /// Native select handling: match by option value, then by trimmed
    /// lowercased option text; assign the raw value as a last resort.
    pub fn select_value(&self, element: &DomElement, value: &str) {
        let options = element.options();
        let wanted = value.trim().to_lowercase();
        let position = options
            .iter()
            .position(|o| o.value == value)
            .or_else(|| {
                options
                    .iter()
                    .position(|o| o.text.trim().to_lowercase() == wanted)
            });

        match position {
            Some(index) => {
                if let Err(e) = element.select_option_at(index) {
                    debug!(error = %e, "selecting option failed");
                }
            }
            None => element.set_value_raw(value),
        }

        self.synth
            .fire(element, SyntheticEvent::simple(EventKind::Input));
        self.synth
            .fire(element, SyntheticEvent::simple(EventKind::Change));
        self.synth
            .fire(element, SyntheticEvent::simple(EventKind::Blur));
    }

    /// ARIA combobox handling (country pickers and the like).
    ///
    /// Open, filter by typing the label through the native setter, wait for
    /// the page's filtered-list rendering to settle, then pick the matching
    /// option from the controlled listbox. No match re-opens and retries a
    /// bounded number of times; exhaustion leaves the typed text in place.
    #[instrument(level = "debug", skip(self, backend, element))]
    pub async fn pick_combobox(
        &self,
        backend: &dyn DomBackend,
        element: &DomElement,
        label: &str,
        code: Option<&str>,
    ) -> ComboboxOutcome {
        if let Err(e) = element.focus() {
            debug!(error = %e, "combobox focus failed");
        }
        self.synth.pointer_click(element);

        if self.writer.write(element, "").is_err() {
            element.set_value_raw("");
        }
        self.synth
            .fire(element, SyntheticEvent::input(EventKind::Input, "", "deleteContent"));
        if self.writer.write(element, label).is_err() {
            element.set_value_raw(label);
        }
        self.synth.fire(
            element,
            SyntheticEvent::input(EventKind::Input, label, "insertText"),
        );

        let settle = std::time::Duration::from_millis(self.config.settle_delay_ms);
        sleep(settle).await;

        let mut attempts_left = self.config.combobox_retries;
        loop {
            if let Some(option) = self.find_listbox_option(backend, element, label, code) {
                self.synth.pointer_click(&option);
                self.synth
                    .fire(element, SyntheticEvent::simple(EventKind::Change));
                self.synth
                    .fire(element, SyntheticEvent::simple(EventKind::Blur));
                return ComboboxOutcome::Picked;
            }
            if attempts_left == 0 {
                break;
            }
            attempts_left -= 1;
            // Re-open and give the page another rendering window.
            self.synth.pointer_click(element);
            sleep(settle).await;
        }

        warn!(label, "no listbox option matched; leaving typed text in place");
        ComboboxOutcome::Failed
    }

    fn find_listbox_option(
        &self,
        backend: &dyn DomBackend,
        element: &DomElement,
        label: &str,
        code: Option<&str>,
    ) -> Option<DomElement> {
        let listbox_id = element.aria_controls();
        let options = match backend.listbox_options(listbox_id.as_deref()) {
            Ok(options) => options,
            Err(e) => {
                debug!(error = %e, "listbox lookup failed");
                return None;
            }
        };

        let want = label.to_lowercase();
        let code = code.map(|c| c.to_lowercase()).unwrap_or_default();
        // Label containment wins over the code heuristic: "ID" is a
        // substring of unrelated option texts ("India"), so the code is
        // only consulted when no option carries the label.
        let by_label = options.iter().position(|option| {
            let text = option.text().to_lowercase();
            let value = option.data_value().unwrap_or_default().to_lowercase();
            text.contains(&want) || (!value.is_empty() && value.contains(&want))
        });
        let position = by_label.or_else(|| {
            if code.is_empty() {
                return None;
            }
            options.iter().position(|option| {
                let text = option.text().to_lowercase();
                let value = option.data_value().unwrap_or_default().to_lowercase();
                value == code || text.contains(&code)
            })
        });
        position.map(|i| options[i].clone())
    }
}
