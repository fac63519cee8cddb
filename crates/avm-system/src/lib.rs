//! Native actions of the `eosio` system account.
//!
//! Each handler decodes its payload from the action data, requires the
//! authority of the affected account and then edits chain state through the
//! session and the authorization manager of the apply context.

pub mod account;
pub mod code;
pub mod permission;

mod precondition;

pub use account::NewAccountHandler;
pub use code::{SetAbiHandler, SetCodeHandler};
pub use permission::{DeleteAuthHandler, LinkAuthHandler, UnlinkAuthHandler, UpdateAuthHandler};

use avm_ledger::HandlerRegistry;
use avm_store::UndoStore;
use avm_types::{
    DeleteAuth, LinkAuth, NewAccount, SetAbi, SetCode, UnlinkAuth, UpdateAuth, SYSTEM_ACCOUNT,
};

/// Register every native system action under `eosio::eosio`.
pub fn register_system_handlers<S: UndoStore>(registry: &mut HandlerRegistry<S>) {
    registry.register(SYSTEM_ACCOUNT, SYSTEM_ACCOUNT, NewAccount::ACTION, NewAccountHandler);
    registry.register(SYSTEM_ACCOUNT, SYSTEM_ACCOUNT, UpdateAuth::ACTION, UpdateAuthHandler);
    registry.register(SYSTEM_ACCOUNT, SYSTEM_ACCOUNT, DeleteAuth::ACTION, DeleteAuthHandler);
    registry.register(SYSTEM_ACCOUNT, SYSTEM_ACCOUNT, LinkAuth::ACTION, LinkAuthHandler);
    registry.register(SYSTEM_ACCOUNT, SYSTEM_ACCOUNT, UnlinkAuth::ACTION, UnlinkAuthHandler);
    registry.register(SYSTEM_ACCOUNT, SYSTEM_ACCOUNT, SetCode::ACTION, SetCodeHandler);
    registry.register(SYSTEM_ACCOUNT, SYSTEM_ACCOUNT, SetAbi::ACTION, SetAbiHandler);
}
