use avm_hash::{action_digest, merkle_root, receipt_digest, sha3_256_tagged};
use avm_types::{Action, ActionReceipt, Name, PermissionLevel};

fn name(s: &str) -> Name {
    s.parse().expect("valid name")
}

fn make_test_action() -> Action {
    Action::new(
        name("eosio.token"),
        name("transfer"),
        vec![PermissionLevel::new(name("alice"), name("active"))],
        vec![0xAA, 0xBB],
    )
}

#[test]
fn action_digest_is_stable() {
    let act = make_test_action();
    assert_eq!(action_digest(&act), action_digest(&act));
}

#[test]
fn action_digest_changes_with_data() {
    let act = make_test_action();
    let mut other = act.clone();
    other.data.push(0xCC);
    assert_ne!(action_digest(&act), action_digest(&other));
}

#[test]
fn receipt_digest_covers_sequences() {
    let receipt = ActionReceipt {
        receiver: name("alice"),
        global_sequence: 1,
        recv_sequence: 1,
        ..Default::default()
    };
    let mut bumped = receipt.clone();
    bumped.auth_sequence.insert(name("alice"), 1);
    assert_ne!(receipt_digest(&receipt), receipt_digest(&bumped));
}

#[test]
fn merkle_root_edge_cases() {
    assert_eq!(merkle_root(&[]), [0u8; 32]);
    let leaf = [7u8; 32];
    assert_eq!(merkle_root(&[leaf]), leaf);
}

#[test]
fn merkle_root_pairs_odd_leaf_with_itself() {
    let a = [1u8; 32];
    let b = [2u8; 32];
    let c = [3u8; 32];

    let pair = |l: [u8; 32], r: [u8; 32]| {
        let mut body = Vec::new();
        body.extend_from_slice(&l);
        body.extend_from_slice(&r);
        sha3_256_tagged("AVM:MERKLE", &body)
    };

    let expected = pair(pair(a, b), pair(c, c));
    assert_eq!(merkle_root(&[a, b, c]), expected);
}

#[test]
fn merkle_root_is_order_sensitive() {
    let a = [1u8; 32];
    let b = [2u8; 32];
    assert_ne!(merkle_root(&[a, b]), merkle_root(&[b, a]));
}
