mod common;

use avm_auth::AuthError;
use avm_db::{Session, SessionConfig};
use avm_ledger::ChainError;
use avm_store::MemoryStore;
use avm_types::{
    Authority, DeleteAuth, LinkAuth, Name, TimePointSec, UnlinkAuth, UpdateAuth, SYSTEM_ACCOUNT,
};

use common::{apply, boot, key, level, n, new_account, system_action};

fn update_auth(
    session: &mut Session<'_, MemoryStore>,
    account: &str,
    permission: &str,
    parent: &str,
    auth: Authority,
) -> Result<(), ChainError> {
    let payload = UpdateAuth {
        account: n(account),
        permission: n(permission),
        parent: n(parent),
        auth,
    };
    apply(session, system_action(UpdateAuth::ACTION, account, &payload))
}

fn delete_auth(
    session: &mut Session<'_, MemoryStore>,
    account: &str,
    permission: &str,
) -> Result<(), ChainError> {
    let payload = DeleteAuth {
        account: n(account),
        permission: n(permission),
    };
    apply(session, system_action(DeleteAuth::ACTION, account, &payload))
}

fn link_auth(
    session: &mut Session<'_, MemoryStore>,
    account: &str,
    code: &str,
    message_type: &str,
    requirement: &str,
) -> Result<(), ChainError> {
    let payload = LinkAuth {
        account: n(account),
        code: n(code),
        message_type: n(message_type),
        requirement: n(requirement),
    };
    apply(session, system_action(LinkAuth::ACTION, account, &payload))
}

fn unlink_auth(
    session: &mut Session<'_, MemoryStore>,
    account: &str,
    code: &str,
    message_type: &str,
) -> Result<(), ChainError> {
    let payload = UnlinkAuth {
        account: n(account),
        code: n(code),
        message_type: n(message_type),
    };
    apply(session, system_action(UnlinkAuth::ACTION, account, &payload))
}

fn setup(session: &mut Session<'_, MemoryStore>) {
    boot(session);
    new_account(session, "eosio", "alice").expect("alice");
    new_account(session, "eosio", "token").expect("token");
}

fn assert_validate(result: Result<(), ChainError>) {
    assert!(
        matches!(result, Err(ChainError::ActionValidate(_))),
        "expected a validation error, got {result:?}"
    );
}

#[test]
fn updateauth_creates_permission_under_parent() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    setup(&mut session);

    update_auth(&mut session, "alice", "xfer", "active", Authority::from_key(key(3)))
        .expect("create xfer");

    let active = session
        .find_permission_by_owner(n("alice"), n("active"))
        .expect("lookup")
        .expect("active");
    let xfer = session
        .find_permission_by_owner(n("alice"), n("xfer"))
        .expect("lookup")
        .expect("xfer");
    assert_eq!(xfer.parent, active.id);
    assert_eq!(xfer.auth, Authority::from_key(key(3)));
    assert_eq!(
        session.permission_children(active.id).expect("children"),
        vec![xfer]
    );
}

#[test]
fn updateauth_replaces_existing_authority() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    setup(&mut session);

    update_auth(&mut session, "alice", "active", "owner", Authority::from_key(key(9)))
        .expect("update active");
    let active = session
        .find_permission_by_owner(n("alice"), n("active"))
        .expect("lookup")
        .expect("active");
    assert_eq!(active.auth, Authority::from_key(key(9)));
    assert_eq!(active.last_updated, TimePointSec::new(1_000));
}

#[test]
fn updateauth_enforces_tree_shape() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    setup(&mut session);
    update_auth(&mut session, "alice", "xfer", "active", Authority::from_key(key(3)))
        .expect("xfer");

    // existing permissions keep their parent
    assert_validate(update_auth(
        &mut session,
        "alice",
        "xfer",
        "owner",
        Authority::from_key(key(3)),
    ));
    assert_validate(update_auth(
        &mut session,
        "alice",
        "active",
        "xfer",
        Authority::from_key(key(3)),
    ));
    assert_validate(update_auth(
        &mut session,
        "alice",
        "owner",
        "active",
        Authority::from_key(key(3)),
    ));
    assert_validate(update_auth(&mut session, "alice", "spend", "", Authority::from_key(key(3))));
    assert_validate(update_auth(
        &mut session,
        "alice",
        "spend",
        "spend",
        Authority::from_key(key(3)),
    ));
}

#[test]
fn updateauth_rejects_bad_names_and_authorities() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    setup(&mut session);

    assert_validate(update_auth(&mut session, "alice", "", "active", Authority::from_key(key(3))));
    assert_validate(update_auth(
        &mut session,
        "alice",
        "eosio.perm",
        "active",
        Authority::from_key(key(3)),
    ));

    let mut unreachable = Authority::from_key(key(3));
    unreachable.threshold = 5;
    assert_validate(update_auth(&mut session, "alice", "spend", "active", unreachable));

    let err = update_auth(&mut session, "alice", "spend", "nothere", Authority::from_key(key(3)))
        .expect_err("unknown parent");
    assert_eq!(
        err,
        ChainError::Auth(AuthError::UnknownPermission(level("alice", "nothere")))
    );
}

#[test]
fn updateauth_needs_account_authority() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    setup(&mut session);

    let payload = UpdateAuth {
        account: n("alice"),
        permission: n("xfer"),
        parent: n("active"),
        auth: Authority::from_key(key(3)),
    };
    let err = apply(&mut session, system_action(UpdateAuth::ACTION, "token", &payload))
        .expect_err("token cannot edit alice");
    assert_eq!(err, ChainError::MissingAuth(n("alice")));
}

#[test]
fn deleteauth_protects_builtin_permissions() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    setup(&mut session);

    assert_validate(delete_auth(&mut session, "alice", "active"));
    assert_validate(delete_auth(&mut session, "alice", "owner"));
}

#[test]
fn deleteauth_refuses_parents_and_linked_permissions() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    setup(&mut session);
    update_auth(&mut session, "alice", "xfer", "active", Authority::from_key(key(3)))
        .expect("xfer");
    update_auth(&mut session, "alice", "small", "xfer", Authority::from_key(key(4)))
        .expect("small");

    assert_eq!(
        delete_auth(&mut session, "alice", "xfer").expect_err("has child"),
        ChainError::Auth(AuthError::PermissionHasChildren(level("alice", "xfer")))
    );

    link_auth(&mut session, "alice", "token", "transfer", "small").expect("link");
    assert_eq!(
        delete_auth(&mut session, "alice", "small").expect_err("linked"),
        ChainError::Auth(AuthError::PermissionLinked {
            permission: level("alice", "small"),
            code: n("token"),
            action: n("transfer"),
        })
    );

    unlink_auth(&mut session, "alice", "token", "transfer").expect("unlink");
    delete_auth(&mut session, "alice", "small").expect("delete small");
    delete_auth(&mut session, "alice", "xfer").expect("delete xfer");
    assert!(session
        .find_permission_by_owner(n("alice"), n("xfer"))
        .expect("lookup")
        .is_none());
}

#[test]
fn deleteauth_of_unknown_permission_fails() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    setup(&mut session);

    assert_eq!(
        delete_auth(&mut session, "alice", "ghost").expect_err("unknown"),
        ChainError::Auth(AuthError::UnknownPermission(level("alice", "ghost")))
    );
}

#[test]
fn linkauth_creates_and_updates_links() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    setup(&mut session);
    update_auth(&mut session, "alice", "xfer", "active", Authority::from_key(key(3)))
        .expect("xfer");

    link_auth(&mut session, "alice", "token", "transfer", "xfer").expect("link");
    let link = session
        .find_permission_link(n("alice"), n("token"), n("transfer"))
        .expect("lookup")
        .expect("link");
    assert_eq!(link.required_permission, n("xfer"));

    assert_validate(link_auth(&mut session, "alice", "token", "transfer", "xfer"));

    link_auth(&mut session, "alice", "token", "transfer", "owner").expect("relink");
    let link = session
        .find_permission_link(n("alice"), n("token"), n("transfer"))
        .expect("lookup")
        .expect("link");
    assert_eq!(link.required_permission, n("owner"));
    assert!(session
        .links_to_permission(n("alice"), n("xfer"))
        .expect("links")
        .is_empty());

    // contract-wide default link
    link_auth(&mut session, "alice", "token", "", "eosio.any").expect("default link");
    assert!(session
        .find_permission_link(n("alice"), n("token"), Name::EMPTY)
        .expect("lookup")
        .is_some());
}

#[test]
fn linkauth_validates_its_target() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    setup(&mut session);

    assert_validate(link_auth(&mut session, "alice", "token", "transfer", ""));
    assert_eq!(
        link_auth(&mut session, "alice", "nocode", "transfer", "active").expect_err("no code"),
        ChainError::UnknownAccount(n("nocode"))
    );
    assert_eq!(
        link_auth(&mut session, "alice", "eosio", "updateauth", "active").expect_err("unlinkable"),
        ChainError::Auth(AuthError::UnlinkableAction {
            code: SYSTEM_ACCOUNT,
            action: UpdateAuth::ACTION,
        })
    );
    assert_eq!(
        link_auth(&mut session, "alice", "token", "transfer", "ghost").expect_err("no permission"),
        ChainError::Auth(AuthError::UnknownPermission(level("alice", "ghost")))
    );
}

#[test]
fn unlinkauth_requires_an_existing_link() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    setup(&mut session);

    assert_validate(unlink_auth(&mut session, "alice", "token", "transfer"));

    link_auth(&mut session, "alice", "token", "transfer", "owner").expect("link");
    unlink_auth(&mut session, "alice", "token", "transfer").expect("unlink");
    assert!(session
        .find_permission_link(n("alice"), n("token"), n("transfer"))
        .expect("lookup")
        .is_none());
}
