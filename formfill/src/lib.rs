//! Web form automation through synthetic DOM interaction
//!
//! This crate maps abstract semantic keys ("email", "address1", "dob", …)
//! onto the concrete form elements of an arbitrary page and drives those
//! elements through realistic, event-accurate input sequences, so page-side
//! validation and frameworks — which listen to DOM events rather than
//! trusting raw property assignment — accept the input exactly as they would
//! from a real user.

use std::sync::Arc;

use tracing::{error, instrument};

pub mod backends;
pub mod command;
pub mod config;
pub mod element;
pub mod errors;
pub mod events;
pub mod orchestrator;
pub mod profiles;
pub mod resolver;
#[cfg(test)]
mod tests;
pub mod timing;
pub mod types;
pub mod widgets;

pub use backends::DomBackend;
pub use command::{FillCommand, FillResponse};
pub use config::FillConfig;
pub use element::{ControlKind, DomElement};
pub use errors::FillError;
pub use profiles::DomainProfile;
pub use resolver::{FieldResolver, MatchTier, ResolvedTarget};
pub use types::{AddressPayload, CodePayload, FieldValue, FieldValueMap, PhonePayload};

use events::SharedWriter;
use orchestrator::FillOrchestrator;
use timing::{DelaySource, UniformDelay};

/// The main entry point for filling one page.
///
/// Holds the document backend, the native value writer (captured once at
/// construction, before any page script could shadow instance setters), the
/// delay source and the configuration. Carries no per-fill state: every
/// invocation resolves its targets fresh against the live document.
pub struct Page {
    backend: Arc<dyn DomBackend>,
    writer: SharedWriter,
    delays: Arc<dyn DelaySource>,
    profiles: Vec<DomainProfile>,
    config: FillConfig,
}

impl Page {
    pub fn new(backend: Arc<dyn DomBackend>) -> Self {
        let writer = backend.native_value_writer();
        Self {
            backend,
            writer,
            delays: Arc::new(UniformDelay),
            profiles: profiles::builtin_profiles().to_vec(),
            config: FillConfig::default(),
        }
    }

    /// Override the fill configuration.
    pub fn with_config(mut self, config: FillConfig) -> Self {
        self.config = config;
        self
    }

    /// Substitute the delay source (tests use [`timing::NoDelay`]).
    pub fn with_delay_source(mut self, delays: Arc<dyn DelaySource>) -> Self {
        self.delays = delays;
        self
    }

    /// Replace the domain-profile list evaluated before generic resolution.
    pub fn with_profiles(mut self, profiles: Vec<DomainProfile>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    fn orchestrator(&self) -> FillOrchestrator<'_> {
        FillOrchestrator::new(
            &*self.backend,
            self.writer.clone(),
            self.delays.clone(),
            &self.profiles,
            &self.config,
        )
    }

    /// Fill fields from a semantic key → value map.
    #[instrument(skip(self, values))]
    pub async fn fill(&self, values: &FieldValueMap) -> Result<(), FillError> {
        self.orchestrator().fill_fields(values).await
    }

    /// Fill an address/identity form.
    #[instrument(skip(self, address))]
    pub async fn fill_address(&self, address: &AddressPayload) -> Result<(), FillError> {
        self.orchestrator().fill_address(address).await
    }

    /// Fill a phone-verification form and press its continue control.
    #[instrument(skip(self, phone))]
    pub async fn fill_phone(&self, phone: &PhonePayload) -> Result<(), FillError> {
        self.orchestrator().fill_phone(phone).await
    }

    /// Fill an OTP-code form and press its verify control.
    #[instrument(skip(self, code))]
    pub async fn fill_code(&self, code: &CodePayload) -> Result<(), FillError> {
        self.orchestrator().fill_code(code).await
    }

    /// Handle one routed command, reducing the outcome to the single
    /// aggregate result the router expects. Recoverable conditions (missing
    /// elements, dispatch failures, combobox misses) never surface here;
    /// only an error escaping the fill loop is reported, and fields filled
    /// before it remain filled.
    pub async fn handle(&self, command: FillCommand) -> FillResponse {
        let outcome = match &command {
            FillCommand::Fill(values) => self.fill(values).await,
            FillCommand::FillAddress(address) => self.fill_address(address).await,
            FillCommand::FillPhone(phone) => self.fill_phone(phone).await,
            FillCommand::FillCode(code) => self.fill_code(code).await,
        };
        match outcome {
            Ok(()) => FillResponse::ok(),
            Err(e) => {
                error!(error = %e, "fill invocation failed");
                FillResponse::failed(e.to_string())
            }
        }
    }
}

impl Clone for Page {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            writer: self.writer.clone(),
            delays: self.delays.clone(),
            profiles: self.profiles.clone(),
            config: self.config.clone(),
        }
    }
}
