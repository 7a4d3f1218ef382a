//! Tiered mapping from semantic keys to editable elements.

use tracing::debug;

use crate::backends::DomBackend;
use crate::element::{ControlKind, DomElement};
use crate::errors::FillError;

/// One level of the fallback strategy for locating an element.
///
/// Ordered: the first tier producing a match wins and lower tiers are never
/// consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    /// `name` or `id` equals the key verbatim.
    ExactAttribute,
    /// Lowercased `name` or `id` contains the lowercased key.
    SubstringAttribute,
    /// Placeholder text or associated `<label for=…>` text contains the key.
    PlaceholderOrLabel,
    /// `aria-label`, or text joined from `aria-labelledby` references,
    /// contains the key. Only consulted for specialized flows.
    AriaLabel,
}

/// An element located for a key, valid for the current invocation only.
#[derive(Debug)]
pub struct ResolvedTarget {
    pub element: DomElement,
    pub kind: ControlKind,
    pub tier: MatchTier,
}

/// Locates the best-matching editable element for a semantic key.
///
/// Snapshots the document's controls at construction; one resolver lives for
/// exactly one fill invocation.
pub struct FieldResolver<'a> {
    backend: &'a dyn DomBackend,
    controls: Vec<DomElement>,
    include_aria: bool,
}

impl<'a> FieldResolver<'a> {
    pub fn new(backend: &'a dyn DomBackend) -> Result<Self, FillError> {
        Ok(Self {
            backend,
            controls: backend.form_controls()?,
            include_aria: false,
        })
    }

    /// Enable the ARIA tier (address and other specialized flows).
    pub fn with_aria(mut self) -> Self {
        self.include_aria = true;
        self
    }

    pub fn controls(&self) -> &[DomElement] {
        &self.controls
    }

    /// Resolve a single semantic key. `None` means "skip this field".
    pub fn resolve(&self, key: &str) -> Option<ResolvedTarget> {
        self.resolve_any(&[key])
    }

    /// Resolve against a keyword set, e.g. `["city", "town", "kota"]`.
    /// The tier ladder is identical; within a tier any needle may match and
    /// ties resolve to the first element in document order.
    pub fn resolve_any(&self, needles: &[&str]) -> Option<ResolvedTarget> {
        let lowered: Vec<String> = needles.iter().map(|n| n.to_lowercase()).collect();

        let found = self
            .exact_attribute(needles)
            .map(|el| (el, MatchTier::ExactAttribute))
            .or_else(|| {
                self.substring_attribute(&lowered)
                    .map(|el| (el, MatchTier::SubstringAttribute))
            })
            .or_else(|| {
                self.placeholder_or_label(&lowered)
                    .map(|el| (el, MatchTier::PlaceholderOrLabel))
            })
            .or_else(|| {
                if self.include_aria {
                    self.aria_label(&lowered).map(|el| (el, MatchTier::AriaLabel))
                } else {
                    None
                }
            });

        match found {
            Some((element, tier)) => {
                let kind = element.control_kind();
                debug!(?tier, ?kind, keys = ?needles, "resolved field");
                Some(ResolvedTarget {
                    element,
                    kind,
                    tier,
                })
            }
            None => {
                debug!(keys = ?needles, "no element matched any tier");
                None
            }
        }
    }

    fn exact_attribute(&self, needles: &[&str]) -> Option<DomElement> {
        self.controls
            .iter()
            .find(|el| {
                let name = el.name_attr();
                let id = el.id();
                needles.iter().any(|n| {
                    name.as_deref() == Some(*n) || id.as_deref() == Some(*n)
                })
            })
            .cloned()
    }

    fn substring_attribute(&self, needles: &[String]) -> Option<DomElement> {
        self.controls
            .iter()
            .find(|el| {
                let name = el.name_attr().unwrap_or_default().to_lowercase();
                let id = el.id().unwrap_or_default().to_lowercase();
                needles.iter().any(|n| {
                    (!name.is_empty() && name.contains(n)) || (!id.is_empty() && id.contains(n))
                })
            })
            .cloned()
    }

    fn placeholder_or_label(&self, needles: &[String]) -> Option<DomElement> {
        self.controls
            .iter()
            .find(|el| {
                let placeholder = el.placeholder().unwrap_or_default().to_lowercase();
                if needles.iter().any(|n| !placeholder.is_empty() && placeholder.contains(n)) {
                    return true;
                }
                let label = el
                    .id()
                    .and_then(|id| self.backend.label_text_for(&id))
                    .unwrap_or_default()
                    .to_lowercase();
                needles.iter().any(|n| !label.is_empty() && label.contains(n))
            })
            .cloned()
    }

    fn aria_label(&self, needles: &[String]) -> Option<DomElement> {
        self.controls
            .iter()
            .find(|el| {
                let text = self.aria_text(el).unwrap_or_default().to_lowercase();
                needles.iter().any(|n| !text.is_empty() && text.contains(n))
            })
            .cloned()
    }

    /// `aria-label`, falling back to the joined text of every element
    /// referenced by `aria-labelledby`.
    fn aria_text(&self, el: &DomElement) -> Option<String> {
        if let Some(label) = el.aria_label() {
            if !label.is_empty() {
                return Some(label);
            }
        }
        let ids = el.aria_labelledby()?;
        let joined: Vec<String> = ids
            .split_whitespace()
            .filter_map(|id| self.backend.element_by_id(id).ok().flatten())
            .map(|referenced| referenced.text())
            .collect();
        if joined.is_empty() {
            None
        } else {
            Some(joined.join(" "))
        }
    }
}
