use avm_types::{
    Authority, Float128, KeyWeight, Name, PermissionLevel, PermissionLevelWeight, PublicKey,
    WaitWeight, U256,
};

fn key(b: u8) -> PublicKey {
    PublicKey::new(0, vec![b; 33])
}

fn level(actor: &str, perm: &str) -> PermissionLevel {
    PermissionLevel::new(
        actor.parse::<Name>().expect("actor"),
        perm.parse::<Name>().expect("permission"),
    )
}

#[test]
fn test_float128_from_f64_known_values() {
    assert_eq!(Float128::from_f64(0.0).to_bits(), 0);
    assert_eq!(Float128::from_f64(1.0).to_bits(), 0x3fff_u128 << 112);
    assert_eq!(Float128::from_f64(-2.0).to_bits(), (1u128 << 127) | (0x4000_u128 << 112));
    assert_eq!(
        Float128::from_f64(1.5).to_bits(),
        (0x3fff_u128 << 112) | (1u128 << 111)
    );
}

#[test]
fn test_float128_subnormal_is_normalized() {
    let smallest = f64::from_bits(1);
    let bits = Float128::from_f64(smallest).to_bits();
    // 2^-1074 is a normal binary128 value with zero mantissa.
    assert_eq!(bits, ((16383u128 - 1074) << 112));
}

#[test]
fn test_float128_classification() {
    assert!(Float128::from_f64(f64::NAN).is_nan());
    assert!(!Float128::from_f64(f64::INFINITY).is_nan());
    assert!(Float128::from_f64(-0.0).is_zero());
    assert!(Float128::from_f64(-0.0).is_sign_negative());
}

#[test]
fn test_u256_word_order() {
    let small = U256::from_words([0, u128::MAX]);
    let large = U256::from_words([1, 0]);
    assert!(small < large);
    assert_eq!(large.words(), [1, 0]);
    assert_eq!(U256::from_u64(7).words(), [0, 7]);
}

#[test]
fn test_authority_single_key_is_valid() {
    assert!(Authority::from_key(key(1)).is_valid());
    assert!(Authority::from_permission(level("alice", "active")).is_valid());
}

#[test]
fn test_authority_zero_threshold_invalid() {
    let mut auth = Authority::from_key(key(1));
    auth.threshold = 0;
    assert!(!auth.is_valid());
}

#[test]
fn test_authority_unreachable_threshold_invalid() {
    let mut auth = Authority::from_key(key(1));
    auth.threshold = 2;
    assert!(!auth.is_valid());
}

#[test]
fn test_authority_zero_weight_entries_are_valid() {
    let auth = Authority {
        threshold: 1,
        keys: vec![
            KeyWeight { key: key(1), weight: 0 },
            KeyWeight { key: key(2), weight: 1 },
        ],
        accounts: vec![PermissionLevelWeight { permission: level("bob", "active"), weight: 0 }],
        waits: vec![WaitWeight { wait_sec: 10, weight: 0 }],
    };
    assert!(auth.is_valid());

    let mut all_zero = auth.clone();
    all_zero.keys[1].weight = 0;
    assert!(!all_zero.is_valid());
}

#[test]
fn test_authority_requires_sorted_unique_entries() {
    let unsorted = Authority {
        threshold: 1,
        keys: vec![
            KeyWeight { key: key(2), weight: 1 },
            KeyWeight { key: key(1), weight: 1 },
        ],
        accounts: vec![],
        waits: vec![],
    };
    assert!(!unsorted.is_valid());

    let duplicate_accounts = Authority {
        threshold: 1,
        keys: vec![],
        accounts: vec![
            PermissionLevelWeight { permission: level("bob", "active"), weight: 1 },
            PermissionLevelWeight { permission: level("bob", "active"), weight: 1 },
        ],
        waits: vec![],
    };
    assert!(!duplicate_accounts.is_valid());

    let unsorted_waits = Authority {
        threshold: 1,
        keys: vec![KeyWeight { key: key(1), weight: 1 }],
        accounts: vec![],
        waits: vec![
            WaitWeight { wait_sec: 20, weight: 1 },
            WaitWeight { wait_sec: 10, weight: 1 },
        ],
    };
    assert!(!unsorted_waits.is_valid());
}

#[test]
fn test_authority_mixed_weights() {
    let auth = Authority {
        threshold: 3,
        keys: vec![
            KeyWeight { key: key(1), weight: 1 },
            KeyWeight { key: key(2), weight: 1 },
        ],
        accounts: vec![PermissionLevelWeight { permission: level("bob", "active"), weight: 1 }],
        waits: vec![],
    };
    assert_eq!(auth.total_weight(), 3);
    assert!(auth.is_valid());
}
