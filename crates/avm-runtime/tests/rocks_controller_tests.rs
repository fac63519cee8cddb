#![cfg(feature = "rocksdb")]

use avm_ledger::ChainConfig;
use avm_runtime::{Controller, GenesisConfig};
use avm_serde::encode_to_vec;
use avm_store::RocksStore;
use avm_types::{
    Action, Authority, NewAccount, PermissionLevel, PublicKey, TimePointSec, Transaction,
    ACTIVE_PERMISSION, SYSTEM_ACCOUNT,
};

fn key(seed: u8) -> PublicKey {
    PublicKey::new(1, vec![seed; 33])
}

#[test]
fn committed_transactions_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let alice = "alice".parse().expect("name");

    {
        let store = RocksStore::open(dir.path()).expect("open");
        let mut chain = Controller::new(store, ChainConfig::default()).expect("controller");
        chain
            .initialize_genesis(&GenesisConfig::new(TimePointSec::new(1), key(0)))
            .expect("genesis");

        let payload = NewAccount {
            creator: SYSTEM_ACCOUNT,
            name: alice,
            owner: Authority::from_key(key(1)),
            active: Authority::from_key(key(2)),
        };
        let act = Action::new(
            SYSTEM_ACCOUNT,
            NewAccount::ACTION,
            vec![PermissionLevel::new(SYSTEM_ACCOUNT, ACTIVE_PERMISSION)],
            encode_to_vec(&payload),
        );
        let trx = Transaction {
            expiration: TimePointSec::new(100),
            ..Transaction::new(vec![act])
        };
        chain
            .push_transaction(&trx, &[key(0)], TimePointSec::new(10))
            .expect("push");
    }

    let store = RocksStore::open(dir.path()).expect("reopen");
    let mut chain = Controller::new(store, ChainConfig::default()).expect("controller");
    assert!(chain
        .read_state(|s| s.is_account(alice))
        .expect("read state"));
}
