use avm_auth::{AuthError, AuthorizationConfig, AuthorizationManager};
use avm_db::{Session, SessionConfig};
use avm_serde::encode_to_vec;
use avm_store::MemoryStore;
use avm_types::{
    Action, Authority, LinkAuth, Name, PermissionLevel, PermissionLinkObject, PermissionObject,
    PublicKey, TimePointSec, UnlinkAuth, UpdateAuth, ANY_PERMISSION, SYSTEM_ACCOUNT,
};

fn n(s: &str) -> Name {
    s.parse().expect("valid name")
}

fn key(seed: u8) -> PublicKey {
    PublicKey::new(1, vec![seed; 8])
}

const OWNER_KEY: u8 = 1;
const ACTIVE_KEY: u8 = 2;
const XFER_KEY: u8 = 3;
const BOB_KEY: u8 = 4;

fn level(actor: &str, permission: &str) -> PermissionLevel {
    PermissionLevel::new(n(actor), n(permission))
}

struct Tree {
    owner: PermissionObject,
    active: PermissionObject,
    xfer: PermissionObject,
}

/// alice: owner <- active <- xfer; bob: owner <- active
fn seed(manager: &mut AuthorizationManager<'_, '_, MemoryStore>) -> Tree {
    let t = TimePointSec::new(10);
    let owner = manager
        .create_permission(n("alice"), n("owner"), 0, Authority::from_key(key(OWNER_KEY)), t)
        .expect("owner");
    let active = manager
        .create_permission(n("alice"), n("active"), owner.id, Authority::from_key(key(ACTIVE_KEY)), t)
        .expect("active");
    let xfer = manager
        .create_permission(n("alice"), n("xfer"), active.id, Authority::from_key(key(XFER_KEY)), t)
        .expect("xfer");
    let bob_owner = manager
        .create_permission(n("bob"), n("owner"), 0, Authority::from_key(key(BOB_KEY)), t)
        .expect("bob owner");
    manager
        .create_permission(n("bob"), n("active"), bob_owner.id, Authority::from_key(key(BOB_KEY)), t)
        .expect("bob active");
    Tree { owner, active, xfer }
}

fn link(session: &mut Session<'_, MemoryStore>, code: &str, message_type: Name, requirement: Name) {
    session
        .create(|l: &mut PermissionLinkObject| {
            l.account = n("alice");
            l.code = n(code);
            l.message_type = message_type;
            l.required_permission = requirement;
        })
        .expect("link");
}

fn transfer(authorization: PermissionLevel) -> Action {
    Action::new(n("token"), n("transfer"), vec![authorization], Vec::new())
}

#[test]
fn satisfies_walks_ancestors() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let config = AuthorizationConfig::default();
    let mut manager = AuthorizationManager::new(&mut session, &config);
    let tree = seed(&mut manager);

    assert!(manager.satisfies(&tree.active, &tree.active).expect("satisfies"));
    assert!(manager.satisfies(&tree.owner, &tree.active).expect("satisfies"));
    assert!(manager.satisfies(&tree.owner, &tree.xfer).expect("satisfies"));
    assert!(!manager.satisfies(&tree.active, &tree.owner).expect("satisfies"));
    assert!(!manager.satisfies(&tree.xfer, &tree.active).expect("satisfies"));

    let bob_owner = manager.get_permission(&level("bob", "owner")).expect("bob");
    assert!(!manager.satisfies(&bob_owner, &tree.xfer).expect("satisfies"));
}

#[test]
fn minimum_permission_lookup() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    link(&mut session, "token", n("transfer"), n("xfer"));
    link(&mut session, "token", Name::EMPTY, n("owner"));
    link(&mut session, "game", Name::EMPTY, ANY_PERMISSION);

    let config = AuthorizationConfig::default();
    let mut manager = AuthorizationManager::new(&mut session, &config);
    let lookup = |m: &mut AuthorizationManager<'_, '_, MemoryStore>, code: &str, action: &str| {
        m.lookup_minimum_permission(n("alice"), n(code), n(action))
            .expect("lookup")
    };

    assert_eq!(lookup(&mut manager, "token", "transfer"), Some(n("xfer")));
    assert_eq!(lookup(&mut manager, "token", "issue"), Some(n("owner")));
    assert_eq!(lookup(&mut manager, "dex", "trade"), Some(n("active")));
    assert_eq!(lookup(&mut manager, "game", "play"), None);

    let err = manager
        .lookup_minimum_permission(n("alice"), SYSTEM_ACCOUNT, UpdateAuth::ACTION)
        .expect_err("unlinkable");
    assert!(matches!(err, AuthError::UnlinkableAction { .. }));
}

#[test]
fn check_authorization_accepts_matching_keys() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let config = AuthorizationConfig::default();
    let mut manager = AuthorizationManager::new(&mut session, &config);
    seed(&mut manager);

    let used = manager
        .check_authorization(&[transfer(level("alice", "active"))], &[key(ACTIVE_KEY)], &[], 0)
        .expect("authorized");
    assert_eq!(used, vec![key(ACTIVE_KEY)]);

    // owner is an ancestor of the minimum (active) permission
    manager
        .check_authorization(&[transfer(level("alice", "owner"))], &[key(OWNER_KEY)], &[], 0)
        .expect("owner authorizes");
}

#[test]
fn check_authorization_rejects_missing_signature() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let config = AuthorizationConfig::default();
    let mut manager = AuthorizationManager::new(&mut session, &config);
    seed(&mut manager);

    let err = manager
        .check_authorization(&[transfer(level("alice", "active"))], &[], &[], 0)
        .expect_err("unsigned");
    assert_eq!(err, AuthError::PermissionNotSatisfied(level("alice", "active")));

    // the owner key does not satisfy the active authority itself
    let err = manager
        .check_authorization(&[transfer(level("alice", "active"))], &[key(OWNER_KEY)], &[], 0)
        .expect_err("wrong key");
    assert_eq!(err, AuthError::PermissionNotSatisfied(level("alice", "active")));
}

#[test]
fn check_authorization_rejects_irrelevant_authority() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let config = AuthorizationConfig::default();
    let mut manager = AuthorizationManager::new(&mut session, &config);
    seed(&mut manager);

    // xfer is a child of active, so it cannot authorize an unlinked action
    let err = manager
        .check_authorization(&[transfer(level("alice", "xfer"))], &[key(XFER_KEY)], &[], 0)
        .expect_err("irrelevant");
    assert_eq!(
        err,
        AuthError::IrrelevantAuthority {
            declared: level("alice", "xfer"),
            minimum: level("alice", "active"),
        }
    );
}

#[test]
fn linked_child_permission_authorizes() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    link(&mut session, "token", n("transfer"), n("xfer"));
    let config = AuthorizationConfig::default();
    let mut manager = AuthorizationManager::new(&mut session, &config);
    seed(&mut manager);

    manager
        .check_authorization(&[transfer(level("alice", "xfer"))], &[key(XFER_KEY)], &[], 0)
        .expect("linked permission");
    manager
        .check_authorization(&[transfer(level("alice", "active"))], &[key(ACTIVE_KEY)], &[], 0)
        .expect("parent of linked permission");
}

#[test]
fn unused_keys_are_rejected_unless_allowed() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let strict = AuthorizationConfig::default();
    let mut manager = AuthorizationManager::new(&mut session, &strict);
    seed(&mut manager);

    let actions = [transfer(level("alice", "active"))];
    let err = manager
        .check_authorization(&actions, &[key(ACTIVE_KEY), key(BOB_KEY)], &[], 0)
        .expect_err("extra key");
    assert_eq!(err, AuthError::IrrelevantSignatures(vec![key(BOB_KEY)]));
    drop(manager);

    let lenient = AuthorizationConfig {
        allow_unused_keys: true,
        ..AuthorizationConfig::default()
    };
    let mut manager = AuthorizationManager::new(&mut session, &lenient);
    manager
        .check_authorization(&actions, &[key(ACTIVE_KEY), key(BOB_KEY)], &[], 0)
        .expect("extra key tolerated");
}

#[test]
fn provided_permission_satisfies_declared_level() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let config = AuthorizationConfig::default();
    let mut manager = AuthorizationManager::new(&mut session, &config);
    seed(&mut manager);

    manager
        .check_permission_authorization(n("alice"), n("active"), &[], &[level("alice", "active")], 0)
        .expect("provided permission");
    let err = manager
        .check_permission_authorization(n("alice"), n("owner"), &[key(ACTIVE_KEY)], &[], 0)
        .expect_err("active key cannot act as owner");
    assert_eq!(err, AuthError::PermissionNotSatisfied(level("alice", "owner")));
}

#[test]
fn updateauth_requires_parent_or_existing_permission() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let config = AuthorizationConfig::default();
    let mut manager = AuthorizationManager::new(&mut session, &config);
    seed(&mut manager);

    let update = |permission: &str, parent: &str, declared: PermissionLevel| {
        let payload = UpdateAuth {
            account: n("alice"),
            permission: n(permission),
            parent: n(parent),
            auth: Authority::from_key(key(9)),
        };
        Action::new(SYSTEM_ACCOUNT, UpdateAuth::ACTION, vec![declared], encode_to_vec(&payload))
    };

    // new permission under active: active is enough
    manager
        .check_authorization(&[update("trade", "active", level("alice", "active"))], &[key(ACTIVE_KEY)], &[], 0)
        .expect("create child of active");

    // changing owner needs owner
    let err = manager
        .check_authorization(&[update("owner", "", level("alice", "active"))], &[key(ACTIVE_KEY)], &[], 0)
        .expect_err("active cannot update owner");
    assert!(matches!(err, AuthError::IrrelevantAuthority { .. }));

    // someone else's permission
    let err = manager
        .check_authorization(&[update("trade", "active", level("bob", "active"))], &[key(BOB_KEY)], &[], 0)
        .expect_err("foreign actor");
    assert!(matches!(err, AuthError::IrrelevantAuthority { .. }));
}

#[test]
fn linkauth_and_unlinkauth_special_cases() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let config = AuthorizationConfig::default();
    let mut manager = AuthorizationManager::new(&mut session, &config);
    seed(&mut manager);

    let link_native = LinkAuth {
        account: n("alice"),
        code: SYSTEM_ACCOUNT,
        message_type: UpdateAuth::ACTION,
        requirement: n("xfer"),
    };
    let act = Action::new(
        SYSTEM_ACCOUNT,
        LinkAuth::ACTION,
        vec![level("alice", "active")],
        encode_to_vec(&link_native),
    );
    let err = manager
        .check_authorization(&[act], &[key(ACTIVE_KEY)], &[], 0)
        .expect_err("unlinkable");
    assert!(matches!(err, AuthError::UnlinkableAction { .. }));

    let unlink = UnlinkAuth {
        account: n("alice"),
        code: n("token"),
        message_type: n("transfer"),
    };
    let act = Action::new(
        SYSTEM_ACCOUNT,
        UnlinkAuth::ACTION,
        vec![level("alice", "active")],
        encode_to_vec(&unlink),
    );
    let err = manager
        .check_authorization(&[act], &[key(ACTIVE_KEY)], &[], 0)
        .expect_err("no link");
    assert!(matches!(err, AuthError::Validate(_)));
}

#[test]
fn permission_removal_guards() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    link(&mut session, "token", n("transfer"), n("xfer"));
    let config = AuthorizationConfig::default();
    let mut manager = AuthorizationManager::new(&mut session, &config);
    let tree = seed(&mut manager);

    let err = manager.remove_permission(&tree.active).expect_err("has children");
    assert_eq!(err, AuthError::PermissionHasChildren(level("alice", "active")));

    let err = manager.remove_permission(&tree.xfer).expect_err("linked");
    assert!(matches!(err, AuthError::PermissionLinked { .. }));
}

#[test]
fn modify_and_remove_leaf_permission() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let config = AuthorizationConfig::default();
    let mut manager = AuthorizationManager::new(&mut session, &config);
    let tree = seed(&mut manager);

    let updated = manager
        .modify_permission(&tree.xfer, Authority::from_key(key(42)), TimePointSec::new(99))
        .expect("modify");
    assert_eq!(updated.auth, Authority::from_key(key(42)));
    assert_eq!(updated.last_updated, TimePointSec::new(99));

    let invalid = Authority {
        threshold: 0,
        ..Authority::default()
    };
    assert!(matches!(
        manager.modify_permission(&tree.xfer, invalid, TimePointSec::new(100)),
        Err(AuthError::InvalidAuthority(_))
    ));

    manager.remove_permission(&tree.xfer).expect("remove leaf");
    assert!(manager
        .find_permission(&level("alice", "xfer"))
        .expect("find")
        .is_none());
}

#[test]
fn config_serde_roundtrip() {
    let config = AuthorizationConfig::default();
    let json = serde_json::to_string(&config).expect("serialize");
    let back: AuthorizationConfig = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, config);
    assert_eq!(config.max_authority_depth, 6);
}
