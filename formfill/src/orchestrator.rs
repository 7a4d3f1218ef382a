//! Top-level fill sequencing.
//!
//! One orchestrator is constructed per invocation and discarded at its end;
//! fields are filled strictly sequentially because concurrent focus/typing
//! would race for the single keyboard-focus resource.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::backends::DomBackend;
use crate::config::FillConfig;
use crate::element::{ControlKind, DomElement};
use crate::errors::FillError;
use crate::events::{EventKind, SharedWriter, SyntheticEvent};
use crate::profiles::{self, DomainProfile};
use crate::resolver::{FieldResolver, ResolvedTarget};
use crate::timing::DelaySource;
use crate::types::{AddressPayload, CodePayload, FieldValue, FieldValueMap, PhonePayload};
use crate::widgets::WidgetSet;

pub struct FillOrchestrator<'a> {
    backend: &'a dyn DomBackend,
    widgets: WidgetSet<'a>,
    profiles: &'a [DomainProfile],
    config: &'a FillConfig,
}

impl<'a> FillOrchestrator<'a> {
    pub fn new(
        backend: &'a dyn DomBackend,
        writer: SharedWriter,
        delays: Arc<dyn DelaySource>,
        profiles: &'a [DomainProfile],
        config: &'a FillConfig,
    ) -> Self {
        Self {
            backend,
            widgets: WidgetSet::new(writer, delays, config),
            profiles,
            config,
        }
    }

    /// Generic key→value fill.
    ///
    /// An active domain profile takes the keys it covers; everything else
    /// goes through tiered resolution. Unresolved keys are logged and
    /// skipped, never aborting the remaining fields.
    #[instrument(level = "debug", skip_all, fields(fields = values.len()))]
    pub async fn fill_fields(&self, values: &FieldValueMap) -> Result<(), FillError> {
        let resolver = FieldResolver::new(self.backend)?;
        let profile = profiles::active_profile(self.profiles, self.backend);

        if let Some(profile) = profile {
            for field in &profile.fields {
                let Some(value) = values.first_of(&field.keys) else {
                    continue;
                };
                match self.backend.element_by_id(&field.element_id)? {
                    Some(element) => {
                        self.widgets.type_text(&element, &value.as_text()).await;
                    }
                    None => debug!(id = %field.element_id, "profile element missing, skipping"),
                }
            }
        }

        for (key, value) in values.iter() {
            if profile.is_some_and(|p| p.covers(key)) {
                continue;
            }
            match resolver.resolve(key) {
                Some(target) => {
                    let value = self.value_for_target(&target, value);
                    info!(key = %key, kind = ?target.kind, "filling field");
                    self.widgets.apply(self.backend, &target, &value).await;
                }
                None => debug!(key = %key, "no match for key, skipping"),
            }
        }

        self.fill_password_confirmation(values, &resolver, profile)
            .await?;

        if let Some(profile) = profile {
            if let Some(control_id) = &profile.submit_control_id {
                sleep(Duration::from_millis(self.config.post_fill_submit_delay_ms)).await;
                self.submit_control(control_id).await?;
            }
        } else if self.config.auto_submit_generic {
            // Off by default; the generic flow only fills.
            self.attempt_submit().await?;
        }

        Ok(())
    }

    /// Derive and fill a password-confirmation field whenever a password
    /// value was supplied, mirroring the same value.
    async fn fill_password_confirmation(
        &self,
        values: &FieldValueMap,
        resolver: &FieldResolver<'_>,
        profile: Option<&DomainProfile>,
    ) -> Result<(), FillError> {
        let Some(password) = values
            .first_of(&self.config.password_keys)
            .map(|v| v.as_text())
            .filter(|v| !v.is_empty())
        else {
            return Ok(());
        };

        if let Some(confirm_id) = profile.and_then(|p| p.confirm_id.as_deref()) {
            if let Some(element) = self.backend.element_by_id(confirm_id)? {
                info!(id = %confirm_id, "filling profile confirmation field");
                self.widgets.type_text(&element, &password).await;
                return Ok(());
            }
        }

        let hit = resolver.controls().iter().find(|el| {
            let name = el.name_attr().unwrap_or_default().to_lowercase();
            let id = el.id().unwrap_or_default().to_lowercase();
            let placeholder = el.placeholder().unwrap_or_default().to_lowercase();
            self.config
                .confirm_name_hints
                .iter()
                .any(|h| !name.is_empty() && name.contains(h.as_str()))
                || self
                    .config
                    .confirm_id_hints
                    .iter()
                    .any(|h| !id.is_empty() && id.contains(h.as_str()))
                || self
                    .config
                    .confirm_placeholder_hints
                    .iter()
                    .any(|h| !placeholder.is_empty() && placeholder.contains(h.as_str()))
        });

        if let Some(element) = hit {
            info!("filling password-confirmation field");
            self.widgets.type_text(element, &password).await;
        }
        Ok(())
    }

    fn value_for_target(&self, target: &ResolvedTarget, value: &FieldValue) -> FieldValue {
        if target.kind == ControlKind::Text && target.element.input_type() == "date" {
            if let FieldValue::Text(raw) = value {
                return FieldValue::Text(normalize_date(raw));
            }
        }
        value.clone()
    }

    /// Address/identity fill with the ARIA tier enabled and localized
    /// keyword sets per field.
    #[instrument(level = "debug", skip_all)]
    pub async fn fill_address(&self, data: &AddressPayload) -> Result<(), FillError> {
        let resolver = FieldResolver::new(self.backend)?.with_aria();

        if let Some(full_name) = &data.full_name {
            self.type_into_any(&resolver, &["full name", "name", "legal name"], full_name)
                .await;
        }

        if let Some(address1) = &data.address1 {
            // A known identity form carries this fixed id; prefer it.
            let target = self
                .backend
                .element_by_id("identity-form-address-line-1")?
                .map(|element| ResolvedTarget {
                    kind: element.control_kind(),
                    tier: crate::resolver::MatchTier::ExactAttribute,
                    element,
                })
                .or_else(|| {
                    resolver.resolve_any(&["address line 1", "address1", "street", "address"])
                });
            if let Some(target) = target {
                self.widgets.type_text(&target.element, address1).await;
            }
        }

        if let Some(city) = &data.city {
            self.type_into_any(&resolver, &["city", "town", "kota"], city)
                .await;
        }
        if let Some(state) = &data.state {
            self.type_into_any(
                &resolver,
                &["state", "province", "region", "provinsi"],
                state,
            )
            .await;
        }
        if let Some(postal) = &data.postal_code {
            self.type_into_any(&resolver, &["postal", "zip", "postcode", "kode pos"], postal)
                .await;
        }

        if let Some(dob) = &data.dob {
            if let Some(target) = resolver.resolve_any(&["date of birth", "dob", "birth"]) {
                let value = if target.element.input_type() == "date" {
                    normalize_date(dob)
                } else {
                    dob.clone()
                };
                self.widgets.type_text(&target.element, &value).await;
            }
        }

        if let Some(phone) = &data.phone {
            self.type_into_any(&resolver, &["phone", "mobile", "telepon", "hp"], phone)
                .await;
        }

        if let Some(country) = &data.country {
            let code = data.country_code.as_deref();
            match resolver.resolve_any(&["country", "negara"]) {
                Some(target) => match target.kind {
                    ControlKind::Select => self.select_country(&target.element, country, code),
                    ControlKind::Combobox => {
                        self.widgets
                            .pick_combobox(self.backend, &target.element, country, code)
                            .await;
                    }
                    _ => self.widgets.type_text(&target.element, country).await,
                },
                None => debug!("no country control found"),
            }
        }

        Ok(())
    }

    async fn type_into_any(&self, resolver: &FieldResolver<'_>, needles: &[&str], value: &str) {
        match resolver.resolve_any(needles) {
            Some(target) => self.widgets.type_text(&target.element, value).await,
            None => debug!(keys = ?needles, "no match, skipping"),
        }
    }

    /// Country select matching is looser than the generic select widget:
    /// option text/value may contain the label, or match the two-letter code.
    fn select_country(&self, element: &DomElement, country: &str, code: Option<&str>) {
        let want = country.to_lowercase();
        let code = code.map(|c| c.to_lowercase()).unwrap_or_default();
        let options = element.options();
        // Same precedence as the combobox handler: label containment first,
        // the short country code only as a fallback.
        let position = options
            .iter()
            .position(|o| {
                let value = o.value.to_lowercase();
                let text = o.text.to_lowercase();
                text.contains(&want) || value.contains(&want)
            })
            .or_else(|| {
                if code.is_empty() {
                    return None;
                }
                options.iter().position(|o| {
                    o.value.to_lowercase() == code || o.text.to_lowercase().contains(&code)
                })
            });

        match position {
            Some(index) => {
                if let Err(e) = element.select_option_at(index) {
                    debug!(error = %e, "selecting country option failed");
                }
                self.widgets
                    .synthesizer()
                    .fire(element, SyntheticEvent::simple(EventKind::Change));
            }
            None => debug!(country, "no country option matched"),
        }
    }

    /// Phone-verification fill: country select by code, number into the
    /// tel/phone input, then the continue control.
    #[instrument(level = "debug", skip_all)]
    pub async fn fill_phone(&self, data: &PhonePayload) -> Result<(), FillError> {
        let code = data.country_code.to_lowercase();
        for select in self.backend.selects()? {
            let options = select.options();
            let position = options.iter().position(|o| {
                o.value.eq_ignore_ascii_case(&data.country_code)
                    || o.text.to_lowercase().contains(&code)
            });
            if let Some(index) = position {
                if let Err(e) = select.select_option_at(index) {
                    debug!(error = %e, "selecting country option failed");
                }
                self.widgets
                    .synthesizer()
                    .fire(&select, SyntheticEvent::simple(EventKind::Change));
                info!(country = %data.country, "selected phone country");
                break;
            }
        }

        let resolver = FieldResolver::new(self.backend)?;
        let target = resolver.resolve("phone").or_else(|| {
            resolver
                .controls()
                .iter()
                .find(|el| el.input_type() == "tel")
                .cloned()
                .map(|element| ResolvedTarget {
                    kind: element.control_kind(),
                    tier: crate::resolver::MatchTier::SubstringAttribute,
                    element,
                })
        });
        match target {
            Some(target) => self.widgets.type_text(&target.element, &data.number).await,
            None => warn!("phone input not found"),
        }

        match self.find_continue_control(&["continue", "next", "submit", "collect"])? {
            Some(control) => {
                sleep(Duration::from_millis(self.config.post_fill_submit_delay_ms)).await;
                self.widgets.synthesizer().pointer_click(&control);
            }
            None => warn!("continue control not found"),
        }
        Ok(())
    }

    /// OTP-code fill: code input, then the verify control.
    #[instrument(level = "debug", skip_all)]
    pub async fn fill_code(&self, data: &CodePayload) -> Result<(), FillError> {
        let resolver = FieldResolver::new(self.backend)?;
        match resolver.resolve("code") {
            Some(target) => self.widgets.type_text(&target.element, &data.code).await,
            None => warn!("code input not found"),
        }

        match self.find_verify_control()? {
            Some(control) => {
                sleep(Duration::from_millis(self.config.post_fill_submit_delay_ms)).await;
                self.widgets.synthesizer().pointer_click(&control);
            }
            None => warn!("verify control not found"),
        }
        Ok(())
    }

    fn find_continue_control(&self, keywords: &[&str]) -> Result<Option<DomElement>, FillError> {
        if let Some(el) = self.backend.element_by_id("continue")? {
            return Ok(Some(el));
        }
        let candidates = self.backend.submit_candidates()?;
        if let Some(el) = candidates
            .iter()
            .find(|el| el.name_attr().as_deref() == Some("cvf_action"))
        {
            return Ok(Some(el.clone()));
        }
        Ok(candidates
            .into_iter()
            .find(|el| {
                let id = el.id().unwrap_or_default().to_lowercase();
                let name = el.name_attr().unwrap_or_default().to_lowercase();
                let value = el.value().to_lowercase();
                let text = el.text().to_lowercase();
                keywords.iter().any(|k| {
                    id.contains(k) || name.contains(k) || value.contains(k) || text.contains(k)
                })
            }))
    }

    fn find_verify_control(&self) -> Result<Option<DomElement>, FillError> {
        let candidates = self.backend.submit_candidates()?;
        if let Some(el) = candidates.iter().find(|el| {
            el.name_attr().as_deref() == Some("cvf_action") && el.value() == "code"
        }) {
            return Ok(Some(el.clone()));
        }
        Ok(candidates.into_iter().find(|el| {
            el.name_attr()
                .unwrap_or_default()
                .to_lowercase()
                .contains("cvf_action")
                || el
                    .aria_label()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains("verify otp")
                || el.value().to_lowercase().contains("code")
        }))
    }

    /// Deferred profile submit: the designated control's form via native
    /// submission where available, else a synthetic click on it; a missing
    /// control falls back to the generic submit search.
    async fn submit_control(&self, control_id: &str) -> Result<(), FillError> {
        match self.backend.element_by_id(control_id)? {
            Some(control) => {
                info!(id = %control_id, "submitting via designated control");
                match control.submit_form() {
                    Ok(true) => {}
                    _ => self.widgets.synthesizer().pointer_click(&control),
                }
                Ok(())
            }
            None => self.attempt_submit().await,
        }
    }

    /// Locate a submit-like control and drive it, with bounded retries to
    /// ride out late-rendering pages.
    pub async fn attempt_submit(&self) -> Result<(), FillError> {
        for attempt in 0..self.config.submit_max_attempts {
            sleep(Duration::from_millis(self.config.submit_retry_delay_ms)).await;
            if let Some(control) = self.find_submit_like()? {
                debug!(attempt, "submit control located");
                match control.submit_form() {
                    Ok(true) => {}
                    _ => self.widgets.synthesizer().pointer_click(&control),
                }
                return Ok(());
            }
        }
        warn!("submit control not found after retries");
        Ok(())
    }

    /// The submit-control search: explicit ids first, then visible
    /// candidates by keyword, then any submit-typed control, then the first
    /// visible candidate at all.
    pub fn find_submit_like(&self) -> Result<Option<DomElement>, FillError> {
        for id in &self.config.explicit_submit_ids {
            if let Some(el) = self.backend.element_by_id(id)? {
                if el.is_visible() {
                    return Ok(Some(el));
                }
            }
        }

        let candidates: Vec<DomElement> = self
            .backend
            .submit_candidates()?
            .into_iter()
            .filter(|el| el.is_visible())
            .collect();

        let keyword_hit = candidates.iter().find(|el| {
            let id = el.id().unwrap_or_default().to_lowercase();
            let value = el.value().to_lowercase();
            let text = el.text().to_lowercase();
            let aria = el.aria_label().unwrap_or_default().to_lowercase();
            self.config.submit_keywords.iter().any(|k| {
                id.contains(k.as_str())
                    || value.contains(k.as_str())
                    || text.contains(k.as_str())
                    || aria.contains(k.as_str())
            })
        });
        if let Some(el) = keyword_hit {
            return Ok(Some(el.clone()));
        }

        if let Some(el) = candidates
            .iter()
            .find(|el| el.attr("type").as_deref() == Some("submit"))
        {
            return Ok(Some(el.clone()));
        }

        Ok(candidates.into_iter().next())
    }
}

/// `MM/DD/YYYY` → `YYYY-MM-DD`, applied only when the target control is a
/// date input. Anything unrecognized is written verbatim.
pub(crate) fn normalize_date(raw: &str) -> String {
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() == 3 {
        let (mm, dd, yyyy) = (parts[0], parts[1], parts[2]);
        let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if numeric(mm) && numeric(dd) && numeric(yyyy) && yyyy.len() == 4 && mm.len() <= 2 && dd.len() <= 2
        {
            return format!("{yyyy}-{mm:0>2}-{dd:0>2}");
        }
    }
    raw.to_string()
}
