#![allow(dead_code)]

use avm_db::Session;
use avm_ledger::{execute_action, ChainConfig, ChainError, HandlerRegistry, TransactionContext};
use avm_serde::{encode_to_vec, StateEncode};
use avm_store::MemoryStore;
use avm_system::register_system_handlers;
use avm_types::{
    AccountObject, Action, Authority, Name, NewAccount, PermissionLevel, PermissionObject,
    PublicKey, TimePointSec, ACTIVE_PERMISSION, OWNER_PERMISSION, SYSTEM_ACCOUNT,
};

pub const NOW: TimePointSec = TimePointSec::new(1_000);

pub fn n(s: &str) -> Name {
    s.parse().expect("valid name")
}

pub fn key(seed: u8) -> PublicKey {
    PublicKey::new(1, vec![seed; 33])
}

pub fn level(actor: &str, permission: &str) -> PermissionLevel {
    PermissionLevel::new(n(actor), n(permission))
}

pub fn system_action<T: StateEncode>(name: Name, actor: &str, payload: &T) -> Action {
    Action::new(
        SYSTEM_ACCOUNT,
        name,
        vec![level(actor, "active")],
        encode_to_vec(payload),
    )
}

/// Run `act` as a top-level action against the system handlers.
pub fn apply(session: &mut Session<'_, MemoryStore>, act: Action) -> Result<(), ChainError> {
    let mut registry = HandlerRegistry::new();
    register_system_handlers(&mut registry);
    let config = ChainConfig::default();
    let mut trx = TransactionContext::new([1u8; 32], NOW);
    let ordinal = trx.schedule_action(act, SYSTEM_ACCOUNT, false, 0, 0);
    execute_action(session, &mut trx, &registry, &config, ordinal, 0)
}

/// Install a privileged system account with `owner` and `active`.
pub fn boot(session: &mut Session<'_, MemoryStore>) {
    session
        .create(|a: &mut AccountObject| {
            a.name = SYSTEM_ACCOUNT;
            a.privileged = true;
        })
        .expect("system account");
    let owner = session
        .create(|p: &mut PermissionObject| {
            p.owner = SYSTEM_ACCOUNT;
            p.name = OWNER_PERMISSION;
            p.auth = Authority::from_key(key(0));
        })
        .expect("system owner");
    session
        .create(|p: &mut PermissionObject| {
            p.parent = owner.id;
            p.owner = SYSTEM_ACCOUNT;
            p.name = ACTIVE_PERMISSION;
            p.auth = Authority::from_key(key(0));
        })
        .expect("system active");
    session
        .initialize_resources(SYSTEM_ACCOUNT)
        .expect("system resources");
}

pub fn new_account_payload(creator: &str, name: &str) -> NewAccount {
    NewAccount {
        creator: n(creator),
        name: n(name),
        owner: Authority::from_key(key(1)),
        active: Authority::from_key(key(2)),
    }
}

pub fn new_account(
    session: &mut Session<'_, MemoryStore>,
    creator: &str,
    name: &str,
) -> Result<(), ChainError> {
    let payload = new_account_payload(creator, name);
    apply(session, system_action(NewAccount::ACTION, creator, &payload))
}
