//! Tests for tiered field resolution.

use crate::backends::memory::{ElementSpec, MemoryDom};
use crate::resolver::{FieldResolver, MatchTier};

fn dom() -> MemoryDom {
    MemoryDom::new("forms.example.com")
}

#[test]
fn exact_attribute_beats_substring() {
    let page = dom();
    // The substring candidate comes first in document order; the exact
    // match must still win.
    page.insert(ElementSpec::text_input().id("fuzzy").name("user_email_address"));
    page.insert(ElementSpec::text_input().id("precise").name("email"));

    let resolver = FieldResolver::new(&page).expect("controls");
    let target = resolver.resolve("email").expect("should resolve");
    assert_eq!(target.tier, MatchTier::ExactAttribute);
    assert_eq!(target.element.id().as_deref(), Some("precise"));
}

#[test]
fn substring_matches_lowercased_name_and_id() {
    let page = dom();
    page.insert(ElementSpec::text_input().id("Billing_Email_Field"));

    let resolver = FieldResolver::new(&page).expect("controls");
    let target = resolver.resolve("email").expect("should resolve");
    assert_eq!(target.tier, MatchTier::SubstringAttribute);
}

#[test]
fn ties_resolve_to_first_in_document_order() {
    let page = dom();
    page.insert(ElementSpec::text_input().id("first").name("email_primary"));
    page.insert(ElementSpec::text_input().id("second").name("email_backup"));

    let resolver = FieldResolver::new(&page).expect("controls");
    let target = resolver.resolve("email").expect("should resolve");
    assert_eq!(target.element.id().as_deref(), Some("first"));
}

#[test]
fn placeholder_tier_is_only_consulted_after_attributes() {
    let page = dom();
    page.insert(ElementSpec::text_input().id("ph").placeholder("Enter your email"));
    page.insert(ElementSpec::text_input().id("attr").name("emailAddress"));

    let resolver = FieldResolver::new(&page).expect("controls");
    let target = resolver.resolve("email").expect("should resolve");
    // "emailAddress" matches at the substring tier, which outranks the
    // earlier placeholder-only candidate regardless of document order.
    assert_eq!(target.tier, MatchTier::SubstringAttribute);
    assert_eq!(target.element.id().as_deref(), Some("attr"));
}

#[test]
fn label_text_matches_via_for_association() {
    let page = dom();
    page.insert(ElementSpec::text_input().id("field-7"));
    page.add_label("field-7", "Work email address");

    let resolver = FieldResolver::new(&page).expect("controls");
    let target = resolver.resolve("email").expect("should resolve");
    assert_eq!(target.tier, MatchTier::PlaceholderOrLabel);
    assert_eq!(target.element.id().as_deref(), Some("field-7"));
}

#[test]
fn aria_tier_requires_opt_in() {
    let page = dom();
    page.insert(ElementSpec::text_input().id("a1").attr("aria-label", "Email address"));

    let resolver = FieldResolver::new(&page).expect("controls");
    assert!(
        resolver.resolve("email").is_none(),
        "generic resolution must not consult aria labels"
    );

    let resolver = FieldResolver::new(&page).expect("controls").with_aria();
    let target = resolver.resolve("email").expect("should resolve via aria");
    assert_eq!(target.tier, MatchTier::AriaLabel);
}

#[test]
fn aria_labelledby_references_are_joined() {
    let page = dom();
    page.insert(ElementSpec::button("Date of birth").id("dob-caption"));
    page.insert(
        ElementSpec::text_input()
            .id("a2")
            .attr("aria-labelledby", "dob-caption"),
    );

    let resolver = FieldResolver::new(&page).expect("controls").with_aria();
    let target = resolver
        .resolve_any(&["date of birth", "dob"])
        .expect("should resolve via labelledby text");
    assert_eq!(target.element.id().as_deref(), Some("a2"));
}

#[test]
fn all_tier_miss_is_none_not_error() {
    let page = dom();
    page.insert(ElementSpec::text_input().name("username"));

    let resolver = FieldResolver::new(&page).expect("controls");
    assert!(resolver.resolve("email").is_none());
}

#[test]
fn keyword_sets_match_any_needle() {
    let page = dom();
    page.insert(ElementSpec::text_input().id("city-field").name("kota"));

    let resolver = FieldResolver::new(&page).expect("controls");
    let target = resolver
        .resolve_any(&["city", "town", "kota"])
        .expect("localized needle should match");
    assert_eq!(target.element.id().as_deref(), Some("city-field"));
}
