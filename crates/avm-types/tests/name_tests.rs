use avm_types::{Name, NameError, ACTIVE_PERMISSION, ANY_PERMISSION, SYSTEM_ACCOUNT};

fn n(s: &str) -> Name {
    s.parse().expect("valid name")
}

#[test]
fn test_name_string_roundtrip() {
    for s in ["eosio", "alice", "eosio.token", "a", "zzzzzzzzzzzzj", "1.2.3.4.5"] {
        assert_eq!(n(s).to_string(), s);
    }
}

#[test]
fn test_known_name_values() {
    assert_eq!(SYSTEM_ACCOUNT.as_u64(), 0x5530_ea00_0000_0000);
    assert_eq!(ACTIVE_PERMISSION.to_string(), "active");
    assert_eq!(ANY_PERMISSION.to_string(), "eosio.any");
}

#[test]
fn test_from_static_matches_parse() {
    assert_eq!(Name::from_static("allyson"), n("allyson"));
    assert_eq!(Name::from_static(""), Name::EMPTY);
}

#[test]
fn test_empty_name() {
    assert!(n("").is_empty());
    assert_eq!(Name::EMPTY.to_string(), "");
}

#[test]
fn test_trailing_dots_are_dropped() {
    assert_eq!(n("bob..").to_string(), "bob");
    assert_eq!(n("bob.."), n("bob"));
}

#[test]
fn test_numeric_order_matches_text_order() {
    let mut names = vec![n("joe"), n("alice"), n("bob"), n("emily"), n("allyson"), n("charlie")];
    names.sort();
    let text: Vec<String> = names.iter().map(|x| x.to_string()).collect();
    assert_eq!(text, ["alice", "allyson", "bob", "charlie", "emily", "joe"]);
}

#[test]
fn test_invalid_names_rejected() {
    assert!(matches!("Alice".parse::<Name>(), Err(NameError::InvalidChar { .. })));
    assert!(matches!("a6".parse::<Name>(), Err(NameError::InvalidChar { .. })));
    assert!(matches!(
        "aaaaaaaaaaaaaa".parse::<Name>(),
        Err(NameError::TooLong(_))
    ));
    assert!(matches!(
        "aaaaaaaaaaaaz".parse::<Name>(),
        Err(NameError::InvalidLastChar(_))
    ));
}

#[test]
fn test_name_serde_as_string() {
    let json = serde_json::to_string(&n("alice")).expect("serialize");
    assert_eq!(json, "\"alice\"");
    let back: Name = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, n("alice"));
}
