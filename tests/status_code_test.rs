//! Status Code Dictionary Integration Tests

use loadsight::codec::status::{StatusCodeLookup, UNSET_REF};

#[test]
fn test_standard_references_are_stable() {
    let mut lookup = StatusCodeLookup::new();
    assert_eq!(lookup.resolve("0", "Unspecified"), 0);
    assert_eq!(lookup.resolve("100", "Continue"), 1);
    assert_eq!(lookup.resolve("200", "OK"), 4);
    assert_eq!(lookup.resolve("404", "Not Found"), 26);
    assert_eq!(lookup.resolve("500", "Internal Server Error"), 52);
    assert_eq!(lookup.resolve("599", "Network Connect Timeout Error"), 63);
}

#[test]
fn test_round_trip_standard_refs() {
    let mut lookup = StatusCodeLookup::new();
    for code in ["200", "301", "403", "503"] {
        let reference = lookup.resolve(code, "");
        assert_eq!(lookup.code_of(reference), Some(code));
        assert!(!lookup.message_of(reference).unwrap().is_empty());
    }
}

#[test]
fn test_custom_refs_count_down_from_minus_64() {
    let mut lookup = StatusCodeLookup::new();
    assert_eq!(lookup.resolve("200", "Everything is fine"), -64);
    assert_eq!(lookup.resolve("612", "Strange"), -65);
    assert_eq!(lookup.resolve("200", "Everything is fine"), -64);
    assert_eq!(lookup.custom_codes(), &["200".to_string(), "612".to_string()]);
    assert_eq!(
        lookup.custom_messages(),
        &["Everything is fine".to_string(), "Strange".to_string()]
    );
}

#[test]
fn test_same_code_different_messages_get_distinct_refs() {
    let mut lookup = StatusCodeLookup::new();
    let a = lookup.resolve("503", "Maintenance window");
    let b = lookup.resolve("503", "Overloaded");
    assert_ne!(a, b);
    assert_eq!(lookup.code_of(a), lookup.code_of(b));
}

#[test]
fn test_rebuilt_lookup_matches_original() {
    let mut original = StatusCodeLookup::new();
    original.resolve("200", "Everything is fine");
    original.resolve("612", "Strange");
    original.resolve("404", "Nope");

    let rebuilt = StatusCodeLookup::with_custom(
        original.custom_codes().to_vec(),
        original.custom_messages().to_vec(),
    )
    .unwrap();

    for reference in [-64, -65, -66] {
        assert_eq!(original.code_of(reference), rebuilt.code_of(reference));
        assert_eq!(original.message_of(reference), rebuilt.message_of(reference));
    }
}

#[test]
fn test_message_only_lookup_recovers_code() {
    let mut lookup = StatusCodeLookup::new();
    assert_eq!(lookup.resolve("", "OK"), 4);
    assert_eq!(lookup.resolve("", "Not Found"), 26);
}

#[test]
fn test_no_status_at_all_is_unset() {
    let mut lookup = StatusCodeLookup::new();
    let reference = lookup.resolve("", "");
    assert_eq!(reference, UNSET_REF);
    assert_eq!(lookup.code_of(reference), Some(""));
    assert_eq!(lookup.message_of(reference), Some(""));
}
