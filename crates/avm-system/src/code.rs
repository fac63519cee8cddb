//! `setcode` and `setabi`.

use avm_hash::sha3_256;
use avm_ledger::{ApplyContext, ApplyHandler, ChainError};
use avm_serde::decode_exact;
use avm_store::UndoStore;
use avm_types::{SetAbi, SetCode};
use tracing::debug;

/// Records the hash of an account's contract code.
///
/// Empty code clears the contract. Code is not executed, so only the hash
/// and the code sequence are kept.
pub struct SetCodeHandler;

impl<S: UndoStore> ApplyHandler<S> for SetCodeHandler {
    fn apply(&self, ctx: &mut ApplyContext<'_, '_, S>) -> Result<(), ChainError> {
        let set: SetCode = decode_exact(&ctx.act().data)?;
        ctx.require_auth(set.account)?;

        if set.vm_type != 0 || set.vm_version != 0 {
            return Err(ChainError::validate("vm_type and vm_version must be 0"));
        }

        let code_hash = if set.code.is_empty() {
            [0u8; 32]
        } else {
            sha3_256(&set.code)
        };

        let session = ctx.session();
        let account = session
            .find_account(set.account)?
            .ok_or(ChainError::UnknownAccount(set.account))?;
        if account.code_hash == code_hash {
            if set.code.is_empty() {
                return Err(ChainError::validate("contract is already cleared"));
            }
            return Err(ChainError::validate(
                "contract is already running this version of code",
            ));
        }
        let account = session.modify(&account, |a| {
            a.code_hash = code_hash;
            a.code_sequence += 1;
        })?;
        debug!(
            account = %set.account,
            code_size = set.code.len(),
            code_sequence = account.code_sequence,
            "setcode"
        );
        Ok(())
    }
}

/// Stores an account's ABI and charges the size difference as RAM.
pub struct SetAbiHandler;

impl<S: UndoStore> ApplyHandler<S> for SetAbiHandler {
    fn apply(&self, ctx: &mut ApplyContext<'_, '_, S>) -> Result<(), ChainError> {
        let set: SetAbi = decode_exact(&ctx.act().data)?;
        ctx.require_auth(set.account)?;

        let session = ctx.session();
        let account = session
            .find_account(set.account)?
            .ok_or(ChainError::UnknownAccount(set.account))?;
        let delta = set.abi.len() as i64 - account.abi.len() as i64;
        let account = session.modify(&account, |a| {
            a.abi = set.abi;
            a.abi_sequence += 1;
        })?;
        if delta != 0 {
            session.add_ram_usage(set.account, delta)?;
        }
        debug!(account = %set.account, abi_sequence = account.abi_sequence, "setabi");
        Ok(())
    }
}
