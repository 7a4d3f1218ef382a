//! Phone/OTP flow and command-boundary tests.

use std::sync::Arc;

use crate::backends::memory::{ElementSpec, JournalEntry, MemoryDom};
use crate::backends::DomBackend;
use crate::command::{FillCommand, FillResponse};
use crate::element::DomElement;
use crate::errors::FillError;
use crate::events::{NativeValueWriter, SharedWriter};
use crate::types::{CodePayload, FieldValueMap, PhonePayload};
use crate::Page;

use super::instant_page;

fn phone_payload() -> PhonePayload {
    PhonePayload {
        country: "Indonesia".into(),
        country_code: "ID".into(),
        number: "+62 812 000 111".into(),
    }
}

#[tokio::test]
async fn phone_flow_selects_country_fills_number_and_continues() {
    let dom = MemoryDom::new("verify.example.com");
    dom.insert(
        ElementSpec::select(&[("US", "United States +1"), ("ID", "Indonesia +62")]).id("country"),
    );
    dom.insert(ElementSpec::input("tel").id("num").name("phoneNumber"));
    dom.insert(ElementSpec::input("submit").id("continue").value("Continue"));

    instant_page(&dom)
        .fill_phone(&phone_payload())
        .await
        .expect("phone fill succeeds");

    assert_eq!(dom.value_of("country").as_deref(), Some("ID"));
    assert_eq!(dom.value_of("num").as_deref(), Some("+62 812 000 111"));
    assert!(dom.journal_of("continue").contains(&JournalEntry::Click));
}

#[tokio::test]
async fn phone_flow_falls_back_to_tel_input_and_cvf_control() {
    let dom = MemoryDom::new("verify.example.com");
    dom.insert(ElementSpec::input("tel").id("bare-tel"));
    dom.insert(ElementSpec::input("submit").id("next-btn").name("cvf_action"));

    instant_page(&dom)
        .fill_phone(&phone_payload())
        .await
        .expect("phone fill succeeds");

    assert_eq!(dom.value_of("bare-tel").as_deref(), Some("+62 812 000 111"));
    assert!(dom.journal_of("next-btn").contains(&JournalEntry::Click));
}

#[tokio::test]
async fn code_flow_fills_and_verifies() {
    let dom = MemoryDom::new("verify.example.com");
    dom.insert(
        ElementSpec::text_input()
            .id("otp")
            .placeholder("Enter the code we sent you"),
    );
    dom.insert(
        ElementSpec::input("submit")
            .id("verify")
            .name("cvf_action")
            .value("code"),
    );

    instant_page(&dom)
        .fill_code(&CodePayload { code: "481516".into() })
        .await
        .expect("code fill succeeds");

    assert_eq!(dom.value_of("otp").as_deref(), Some("481516"));
    assert!(dom.journal_of("verify").contains(&JournalEntry::Click));
}

#[tokio::test]
async fn handle_reports_aggregate_success_even_when_fields_miss() {
    let dom = MemoryDom::new("verify.example.com");
    dom.insert(ElementSpec::text_input().id("u").name("username"));

    let values: FieldValueMap = [("email", "a@b.com")].into_iter().collect();
    let response = instant_page(&dom).handle(FillCommand::Fill(values)).await;

    assert!(response.success, "resolver misses are recovered, not surfaced");
    assert!(response.error.is_none());
}

/// A backend whose document access always fails, exercising the one error
/// path that must surface to the caller.
struct BrokenDom;

struct BrokenWriter;

impl NativeValueWriter for BrokenWriter {
    fn write(&self, _element: &DomElement, _value: &str) -> Result<(), FillError> {
        Err(FillError::BackendError("document detached".into()))
    }
}

impl DomBackend for BrokenDom {
    fn hostname(&self) -> String {
        "gone.example.com".into()
    }

    fn form_controls(&self) -> Result<Vec<DomElement>, FillError> {
        Err(FillError::BackendError("document detached".into()))
    }

    fn element_by_id(&self, _id: &str) -> Result<Option<DomElement>, FillError> {
        Err(FillError::BackendError("document detached".into()))
    }

    fn label_text_for(&self, _control_id: &str) -> Option<String> {
        None
    }

    fn listbox_options(&self, _listbox_id: Option<&str>) -> Result<Vec<DomElement>, FillError> {
        Err(FillError::BackendError("document detached".into()))
    }

    fn submit_candidates(&self) -> Result<Vec<DomElement>, FillError> {
        Err(FillError::BackendError("document detached".into()))
    }

    fn native_value_writer(&self) -> SharedWriter {
        Arc::new(BrokenWriter)
    }
}

#[tokio::test]
async fn handle_reports_failure_when_the_document_is_gone() {
    let page = Page::new(Arc::new(BrokenDom));
    let values: FieldValueMap = [("email", "a@b.com")].into_iter().collect();

    let response = page.handle(FillCommand::Fill(values)).await;

    assert!(!response.success);
    assert!(response.error.unwrap().contains("document detached"));
}

#[test]
fn commands_round_trip_through_the_router_wire_format() {
    let command = FillCommand::from_json(
        r#"{"type":"fillPhone","data":{"country":"Indonesia","countryCode":"ID","number":"+62 1"}}"#,
    )
    .expect("wire format parses");
    match &command {
        FillCommand::FillPhone(p) => assert_eq!(p.country_code, "ID"),
        other => panic!("unexpected command: {other:?}"),
    }

    let json = command.to_json().expect("serializes");
    assert!(json.contains(r#""type":"fillPhone""#));

    let response = FillResponse::ok().to_json().expect("serializes");
    assert_eq!(response, r#"{"success":true}"#);
}
