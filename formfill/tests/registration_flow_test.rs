//! End-to-end registration fill through the public API.

use std::sync::Arc;

use formfill::backends::memory::{ElementSpec, JournalEntry, MemoryDom};
use formfill::timing::NoDelay;
use formfill::{FieldValueMap, FillCommand, FillConfig, Page};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

fn instant_page(dom: &MemoryDom) -> Page {
    Page::new(Arc::new(dom.clone()))
        .with_config(FillConfig::instant())
        .with_delay_source(Arc::new(NoDelay))
}

#[tokio::test]
async fn fills_a_generic_registration_form() -> anyhow::Result<()> {
    init_tracing();

    let dom = MemoryDom::new("signup.example.com");
    dom.insert(ElementSpec::text_input().id("email-field").name("email"));
    dom.insert(ElementSpec::input("password").id("pw-field").name("password"));
    dom.insert(
        ElementSpec::input("password")
            .id("confirm_password")
            .placeholder("Confirm"),
    );
    dom.insert(ElementSpec::checkbox().id("tos").name("acceptTerms"));
    dom.insert(ElementSpec::input("submit").id("signup-btn").value("Sign up"));

    let mut values = FieldValueMap::new();
    values.insert("email", "a@b.com");
    values.insert("password", "Secret1!");
    values.insert("acceptTerms", true);

    instant_page(&dom).fill(&values).await?;

    assert_eq!(dom.value_of("email-field").as_deref(), Some("a@b.com"));
    assert_eq!(dom.value_of("pw-field").as_deref(), Some("Secret1!"));
    assert_eq!(dom.value_of("confirm_password").as_deref(), Some("Secret1!"));
    assert_eq!(dom.checked_of("tos"), Some(true));
    assert!(
        dom.journal_of("signup-btn").is_empty(),
        "the generic flow never presses submit"
    );
    Ok(())
}

#[tokio::test]
async fn routed_command_reports_a_single_aggregate_result() {
    init_tracing();

    let dom = MemoryDom::new("signup.example.com");
    dom.insert(ElementSpec::text_input().id("email-field").name("email"));

    let command = FillCommand::from_json(
        r#"{"type":"fill","data":{"email":"a@b.com","nickname":"missing-on-page"}}"#,
    )
    .expect("router wire format parses");

    let response = instant_page(&dom).handle(command).await;

    assert!(response.success);
    assert_eq!(dom.value_of("email-field").as_deref(), Some("a@b.com"));
}

#[tokio::test]
async fn typed_input_is_observable_by_delegated_listeners() {
    init_tracing();

    let dom = MemoryDom::new("signup.example.com");
    dom.insert(ElementSpec::text_input().id("email-field").name("email"));

    let mut values = FieldValueMap::new();
    values.insert("email", "a@b.com");
    instant_page(&dom).fill(&values).await.expect("fill succeeds");

    let journal = dom.journal_of("email-field");
    // Value mutations go through the native setter, each announced by an
    // input event, so framework listeners observe every keystroke.
    let native_writes = journal
        .iter()
        .filter(|e| matches!(e, JournalEntry::NativeWrite(_)))
        .count();
    assert_eq!(native_writes, "a@b.com".len() + 1, "one clear plus one per char");
    assert!(!journal.iter().any(|e| matches!(e, JournalEntry::RawWrite(_))));
}
