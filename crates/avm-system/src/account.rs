//! `newaccount`.

use avm_ledger::{ApplyContext, ApplyHandler, ChainError};
use avm_serde::decode_exact;
use avm_store::UndoStore;
use avm_types::{AccountObject, NewAccount, ACTIVE_PERMISSION, OWNER_PERMISSION};
use tracing::debug;

use crate::precondition::{is_reserved, validate_authority_precondition};

/// Longest name a new account may take; 13-character names are reserved.
const MAX_ACCOUNT_NAME_LEN: usize = 12;

/// Creates an account with its `owner` and `active` permissions and its
/// resource rows.
pub struct NewAccountHandler;

impl<S: UndoStore> ApplyHandler<S> for NewAccountHandler {
    fn apply(&self, ctx: &mut ApplyContext<'_, '_, S>) -> Result<(), ChainError> {
        let create: NewAccount = decode_exact(&ctx.act().data)?;
        ctx.require_auth(create.creator)?;

        if !create.owner.is_valid() {
            return Err(ChainError::validate("invalid owner authority"));
        }
        if !create.active.is_valid() {
            return Err(ChainError::validate("invalid active authority"));
        }

        let name = create.name;
        if name.is_empty() {
            return Err(ChainError::validate("account name cannot be empty"));
        }
        if name.len() > MAX_ACCOUNT_NAME_LEN {
            return Err(ChainError::validate(
                "account names can only be 12 chars long",
            ));
        }
        let creator = ctx.session().get_account(create.creator)?;
        if !creator.privileged && is_reserved(name) {
            return Err(ChainError::validate(
                "only privileged accounts can have names that start with 'eosio.'",
            ));
        }
        if ctx.is_account(name)? {
            return Err(ChainError::AccountNameExists(name));
        }

        let now = ctx.block_time();
        ctx.session().create(|a: &mut AccountObject| {
            a.name = name;
            a.creation_date = now;
        })?;

        // the new account may appear in its own authorities
        validate_authority_precondition(ctx, &create.owner)?;
        validate_authority_precondition(ctx, &create.active)?;

        let mut manager = ctx.authorization_manager();
        let owner = manager.create_permission(name, OWNER_PERMISSION, 0, create.owner, now)?;
        manager.create_permission(name, ACTIVE_PERMISSION, owner.id, create.active, now)?;

        ctx.session().initialize_resources(name)?;
        debug!(creator = %create.creator, account = %name, "newaccount");
        Ok(())
    }
}
