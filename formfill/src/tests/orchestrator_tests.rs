//! End-to-end fill tests through the public `Page` API.

use crate::backends::memory::{ElementSpec, JournalEntry, MemoryDom};
use crate::config::FillConfig;
use crate::orchestrator::normalize_date;
use crate::types::FieldValueMap;

use super::instant_page;

#[tokio::test]
async fn registration_fill_mirrors_password_confirmation() {
    let dom = MemoryDom::new("shop.example.com");
    dom.insert(ElementSpec::text_input().id("e").name("email"));
    dom.insert(ElementSpec::input("password").id("p").name("password"));
    dom.insert(
        ElementSpec::input("password")
            .id("confirm_password")
            .placeholder("Confirm"),
    );

    let values: FieldValueMap = [("email", "a@b.com"), ("password", "Secret1!")]
        .into_iter()
        .collect();
    instant_page(&dom).fill(&values).await.expect("fill succeeds");

    assert_eq!(dom.value_of("e").as_deref(), Some("a@b.com"));
    assert_eq!(dom.value_of("p").as_deref(), Some("Secret1!"));
    assert_eq!(dom.value_of("confirm_password").as_deref(), Some("Secret1!"));
}

#[tokio::test]
async fn lower_tier_elements_are_never_touched() {
    let dom = MemoryDom::new("shop.example.com");
    dom.insert(ElementSpec::text_input().id("decoy").placeholder("email me"));
    dom.insert(ElementSpec::text_input().id("real").name("email"));

    let values: FieldValueMap = [("email", "a@b.com")].into_iter().collect();
    instant_page(&dom).fill(&values).await.expect("fill succeeds");

    assert_eq!(dom.value_of("real").as_deref(), Some("a@b.com"));
    assert!(dom.journal_of("decoy").is_empty(), "decoy must stay untouched");
    assert_eq!(dom.value_of("decoy").as_deref(), Some(""));
}

#[tokio::test]
async fn dob_is_normalized_only_for_date_inputs() {
    let dom = MemoryDom::new("shop.example.com");
    dom.insert(ElementSpec::input("date").id("dob-date").name("dob"));

    let values: FieldValueMap = [("dob", "03/17/1990")].into_iter().collect();
    instant_page(&dom).fill(&values).await.expect("fill succeeds");
    assert_eq!(dom.value_of("dob-date").as_deref(), Some("1990-03-17"));

    let dom = MemoryDom::new("shop.example.com");
    dom.insert(ElementSpec::text_input().id("dob-text").name("dob"));

    let values: FieldValueMap = [("dob", "03/17/1990")].into_iter().collect();
    instant_page(&dom).fill(&values).await.expect("fill succeeds");
    assert_eq!(dom.value_of("dob-text").as_deref(), Some("03/17/1990"));
}

#[tokio::test]
async fn unresolved_keys_never_abort_remaining_fields() {
    let dom = MemoryDom::new("shop.example.com");
    dom.insert(ElementSpec::text_input().id("u").name("username"));

    let values: FieldValueMap = [("fax_number", "n/a"), ("username", "kai")]
        .into_iter()
        .collect();
    instant_page(&dom).fill(&values).await.expect("fill succeeds");

    assert_eq!(dom.value_of("u").as_deref(), Some("kai"));
}

#[tokio::test]
async fn boolean_values_drive_toggles() {
    let dom = MemoryDom::new("shop.example.com");
    dom.insert(ElementSpec::checkbox().id("nl").name("newsletter"));

    let mut values = FieldValueMap::new();
    values.insert("newsletter", true);
    instant_page(&dom).fill(&values).await.expect("fill succeeds");

    assert_eq!(dom.checked_of("nl"), Some(true));
}

#[tokio::test]
async fn generic_flow_does_not_submit_by_default() {
    let dom = MemoryDom::new("shop.example.com");
    dom.insert(ElementSpec::text_input().id("e").name("email"));
    dom.insert(ElementSpec::input("submit").id("go").value("Continue"));

    let values: FieldValueMap = [("email", "a@b.com")].into_iter().collect();
    instant_page(&dom).fill(&values).await.expect("fill succeeds");

    assert!(
        dom.journal_of("go").is_empty(),
        "generic flow only fills; submission stays off"
    );
}

#[tokio::test]
async fn generic_submit_can_be_enabled_explicitly() {
    let dom = MemoryDom::new("shop.example.com");
    dom.insert(ElementSpec::text_input().id("e").name("email"));
    dom.insert(ElementSpec::button("Continue").id("go"));

    let mut config = FillConfig::instant();
    config.auto_submit_generic = true;
    config.submit_max_attempts = 1;
    let page = instant_page(&dom).with_config(config);

    let values: FieldValueMap = [("email", "a@b.com")].into_iter().collect();
    page.fill(&values).await.expect("fill succeeds");

    assert!(dom.journal_of("go").contains(&JournalEntry::Click));
}

#[tokio::test]
async fn domain_profile_overrides_generic_resolution() {
    let dom = MemoryDom::new("www.amazon.com");
    dom.insert(ElementSpec::form().id("register"));
    dom.insert(ElementSpec::text_input().id("ap_customer_name"));
    dom.insert(ElementSpec::text_input().id("ap_email"));
    // A decoy the generic resolver would have preferred for "email".
    dom.insert(ElementSpec::text_input().id("decoy").name("email"));
    dom.insert(ElementSpec::input("password").id("ap_password"));
    dom.insert(ElementSpec::input("password").id("ap_password_check"));
    dom.insert(
        ElementSpec::input("submit")
            .id("continue")
            .in_form("register"),
    );

    let values: FieldValueMap = [
        ("name", "Ada Lovelace"),
        ("email", "ada@example.com"),
        ("password", "Secret1!"),
    ]
    .into_iter()
    .collect();
    instant_page(&dom).fill(&values).await.expect("fill succeeds");

    assert_eq!(dom.value_of("ap_customer_name").as_deref(), Some("Ada Lovelace"));
    assert_eq!(dom.value_of("ap_email").as_deref(), Some("ada@example.com"));
    assert_eq!(dom.value_of("ap_password").as_deref(), Some("Secret1!"));
    assert_eq!(dom.value_of("ap_password_check").as_deref(), Some("Secret1!"));
    assert!(
        dom.journal_of("decoy").is_empty(),
        "covered keys bypass generic resolution"
    );
    // Deferred submit goes through the form's native mechanism.
    assert!(dom.journal_of("register").contains(&JournalEntry::FormSubmit));
}

#[tokio::test]
async fn profile_activates_on_signature_element_alone() {
    let dom = MemoryDom::new("proxy.example.net");
    dom.insert(ElementSpec::text_input().id("ap_customer_name"));
    dom.insert(ElementSpec::text_input().id("ap_email"));

    let values: FieldValueMap = [("email", "x@y.z")].into_iter().collect();
    instant_page(&dom).fill(&values).await.expect("fill succeeds");

    assert_eq!(dom.value_of("ap_email").as_deref(), Some("x@y.z"));
}

#[test]
fn date_normalization_rules() {
    assert_eq!(normalize_date("03/17/1990"), "1990-03-17");
    assert_eq!(normalize_date("3/7/1990"), "1990-03-07");
    assert_eq!(normalize_date("1990-03-17"), "1990-03-17");
    assert_eq!(normalize_date("17 March 1990"), "17 March 1990");
    assert_eq!(normalize_date("03/17/90"), "03/17/90");
}
