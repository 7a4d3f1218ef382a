//! Page-specific overrides of generic field resolution.
//!
//! Known-structured (or known-hostile) pages get a fixed key→element-id map
//! evaluated before any heuristic matching. Profiles are an ordered list of
//! predicate+override records; extending coverage to a new page never touches
//! the generic resolver.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backends::DomBackend;

/// One fixed mapping: any of `keys` (lowercased semantic keys) fills the
/// element with id `element_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileField {
    pub keys: Vec<String>,
    pub element_id: String,
}

/// A page-specific field map plus activation predicate.
///
/// At most one profile is active per fill invocation; for the keys it covers
/// it fully replaces generic resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainProfile {
    pub name: String,
    /// Active when the page hostname contains any of these fragments…
    pub host_fragments: Vec<String>,
    /// …or when this element id is present in the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_id: Option<String>,
    pub fields: Vec<ProfileField>,
    /// Fixed id of the password-confirmation element, mirrored from the
    /// password value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_id: Option<String>,
    /// When set, the profile schedules a deferred submit of this control
    /// after filling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_control_id: Option<String>,
}

impl DomainProfile {
    pub fn is_active(&self, backend: &dyn DomBackend) -> bool {
        let host = backend.hostname().to_lowercase();
        if self.host_fragments.iter().any(|f| host.contains(f.as_str())) {
            return true;
        }
        match &self.signature_id {
            Some(id) => matches!(backend.element_by_id(id), Ok(Some(_))),
            None => false,
        }
    }

    /// The fixed element id covering a semantic key, if any.
    pub fn element_for(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.keys.iter().any(|k| k.as_str() == key))
            .map(|f| f.element_id.as_str())
    }

    pub fn covers(&self, key: &str) -> bool {
        self.element_for(key).is_some()
    }
}

/// The first active profile from an ordered list, if any.
pub fn active_profile<'a>(
    profiles: &'a [DomainProfile],
    backend: &dyn DomBackend,
) -> Option<&'a DomainProfile> {
    let profile = profiles.iter().find(|p| p.is_active(backend));
    if let Some(p) = profile {
        debug!(profile = %p.name, "domain profile active, bypassing generic resolution");
    }
    profile
}

static BUILTIN: Lazy<Vec<DomainProfile>> = Lazy::new(|| {
    vec![
        // The hosted registration form with fixed ap_* element ids.
        DomainProfile {
            name: "hosted-registration".into(),
            host_fragments: vec!["amazon.".into(), "kdp.amazon".into()],
            signature_id: Some("ap_customer_name".into()),
            fields: vec![
                ProfileField {
                    keys: vec!["customername".into(), "name".into(), "fullname".into()],
                    element_id: "ap_customer_name".into(),
                },
                ProfileField {
                    keys: vec!["email".into()],
                    element_id: "ap_email".into(),
                },
                ProfileField {
                    keys: vec!["password".into(), "pass".into(), "pwd".into()],
                    element_id: "ap_password".into(),
                },
            ],
            confirm_id: Some("ap_password_check".into()),
            submit_control_id: Some("continue".into()),
        },
    ]
});

/// The profiles shipped with the engine.
pub fn builtin_profiles() -> &'static [DomainProfile] {
    &BUILTIN
}
