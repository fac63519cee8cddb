//! `updateauth`, `deleteauth`, `linkauth` and `unlinkauth`.

use avm_auth::AuthError;
use avm_ledger::{ApplyContext, ApplyHandler, ChainError};
use avm_serde::decode_exact;
use avm_store::UndoStore;
use avm_types::{
    DeleteAuth, LinkAuth, PermissionLevel, PermissionLinkObject, UnlinkAuth, UpdateAuth,
    ACTIVE_PERMISSION, ANY_PERMISSION, OWNER_PERMISSION, SYSTEM_ACCOUNT, UNLINKABLE_ACTIONS,
};
use tracing::debug;

use crate::precondition::{is_reserved, validate_authority_precondition};

/// Creates a permission or replaces the authority of an existing one.
///
/// `owner` is the only root; `active` always hangs off `owner`. An existing
/// permission keeps its parent.
pub struct UpdateAuthHandler;

impl<S: UndoStore> ApplyHandler<S> for UpdateAuthHandler {
    fn apply(&self, ctx: &mut ApplyContext<'_, '_, S>) -> Result<(), ChainError> {
        let update: UpdateAuth = decode_exact(&ctx.act().data)?;
        ctx.require_auth(update.account)?;

        if update.permission.is_empty() {
            return Err(ChainError::validate("cannot create authority with empty name"));
        }
        if is_reserved(update.permission) {
            return Err(ChainError::validate(
                "permission names that start with 'eosio.' are reserved",
            ));
        }
        if update.permission == update.parent {
            return Err(ChainError::validate("cannot set an authority as its own parent"));
        }
        if !ctx.is_account(update.account)? {
            return Err(ChainError::UnknownAccount(update.account));
        }
        if !update.auth.is_valid() {
            return Err(ChainError::validate("invalid authority"));
        }
        if update.permission == ACTIVE_PERMISSION {
            if update.parent != OWNER_PERMISSION {
                return Err(ChainError::validate(
                    "cannot change active authority's parent from owner",
                ));
            }
        } else if update.permission == OWNER_PERMISSION {
            if !update.parent.is_empty() {
                return Err(ChainError::validate("cannot change owner authority's parent"));
            }
        } else if update.parent.is_empty() {
            return Err(ChainError::validate("only owner permission can have empty parent"));
        }

        validate_authority_precondition(ctx, &update.auth)?;

        let now = ctx.block_time();
        let mut manager = ctx.authorization_manager();
        let parent_id = if update.parent.is_empty() {
            0
        } else {
            manager
                .get_permission(&PermissionLevel::new(update.account, update.parent))?
                .id
        };

        let level = PermissionLevel::new(update.account, update.permission);
        match manager.find_permission(&level)? {
            Some(existing) => {
                if existing.parent != parent_id {
                    return Err(ChainError::validate(
                        "changing parent authority is not currently supported",
                    ));
                }
                manager.modify_permission(&existing, update.auth, now)?;
            }
            None => {
                manager.create_permission(
                    update.account,
                    update.permission,
                    parent_id,
                    update.auth,
                    now,
                )?;
            }
        }
        debug!(permission = %level, parent = %update.parent, "updateauth");
        Ok(())
    }
}

/// Removes a childless, unlinked permission other than `owner` and `active`.
pub struct DeleteAuthHandler;

impl<S: UndoStore> ApplyHandler<S> for DeleteAuthHandler {
    fn apply(&self, ctx: &mut ApplyContext<'_, '_, S>) -> Result<(), ChainError> {
        let delete: DeleteAuth = decode_exact(&ctx.act().data)?;
        ctx.require_auth(delete.account)?;

        if delete.permission == ACTIVE_PERMISSION {
            return Err(ChainError::validate("cannot delete active authority"));
        }
        if delete.permission == OWNER_PERMISSION {
            return Err(ChainError::validate("cannot delete owner authority"));
        }

        let level = PermissionLevel::new(delete.account, delete.permission);
        let mut manager = ctx.authorization_manager();
        let permission = manager.get_permission(&level)?;
        manager.remove_permission(&permission)?;
        debug!(permission = %level, "deleteauth");
        Ok(())
    }
}

/// Sets the permission `account` requires for `code::message_type`.
pub struct LinkAuthHandler;

impl<S: UndoStore> ApplyHandler<S> for LinkAuthHandler {
    fn apply(&self, ctx: &mut ApplyContext<'_, '_, S>) -> Result<(), ChainError> {
        let link: LinkAuth = decode_exact(&ctx.act().data)?;
        ctx.require_auth(link.account)?;

        if link.requirement.is_empty() {
            return Err(ChainError::validate("required permission cannot be empty"));
        }
        if !ctx.is_account(link.account)? {
            return Err(ChainError::UnknownAccount(link.account));
        }
        if !ctx.is_account(link.code)? {
            return Err(ChainError::UnknownAccount(link.code));
        }
        if link.code == SYSTEM_ACCOUNT && UNLINKABLE_ACTIONS.contains(&link.message_type) {
            return Err(AuthError::UnlinkableAction {
                code: link.code,
                action: link.message_type,
            }
            .into());
        }
        if link.requirement != ANY_PERMISSION {
            ctx.authorization_manager()
                .get_permission(&PermissionLevel::new(link.account, link.requirement))?;
        }

        let session = ctx.session();
        match session.find_permission_link(link.account, link.code, link.message_type)? {
            Some(existing) => {
                if existing.required_permission == link.requirement {
                    return Err(ChainError::validate(
                        "attempting to update required authority, but new requirement is same as old",
                    ));
                }
                session.modify(&existing, |l| l.required_permission = link.requirement)?;
            }
            None => {
                session.create(|l: &mut PermissionLinkObject| {
                    l.account = link.account;
                    l.code = link.code;
                    l.message_type = link.message_type;
                    l.required_permission = link.requirement;
                })?;
            }
        }
        debug!(
            account = %link.account,
            code = %link.code,
            message_type = %link.message_type,
            requirement = %link.requirement,
            "linkauth"
        );
        Ok(())
    }
}

/// Removes the link of `account` for `code::message_type`.
pub struct UnlinkAuthHandler;

impl<S: UndoStore> ApplyHandler<S> for UnlinkAuthHandler {
    fn apply(&self, ctx: &mut ApplyContext<'_, '_, S>) -> Result<(), ChainError> {
        let unlink: UnlinkAuth = decode_exact(&ctx.act().data)?;
        ctx.require_auth(unlink.account)?;

        let session = ctx.session();
        let Some(link) =
            session.find_permission_link(unlink.account, unlink.code, unlink.message_type)?
        else {
            return Err(ChainError::validate(
                "attempting to unlink authority, but no link found",
            ));
        };
        session.remove(&link)?;
        debug!(
            account = %unlink.account,
            code = %unlink.code,
            message_type = %unlink.message_type,
            "unlinkauth"
        );
        Ok(())
    }
}
