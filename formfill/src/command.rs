//! The typed boundary to the message-routing collaborator.
//!
//! The router dispatches one command per invocation and expects a single
//! aggregate success/failure back; no per-field result is surfaced.

use serde::{Deserialize, Serialize};

use crate::types::{AddressPayload, CodePayload, FieldValueMap, PhonePayload};

/// One fill invocation, as delivered by the routing layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum FillCommand {
    /// Generic semantic key → value fill.
    Fill(FieldValueMap),
    /// Address/identity form fill.
    FillAddress(AddressPayload),
    /// Phone-verification form fill.
    FillPhone(PhonePayload),
    /// OTP-code form fill.
    FillCode(CodePayload),
}

impl FillCommand {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The aggregate result reported back to the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FillResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
