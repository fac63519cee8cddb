use avm_ledger::{ApplyContext, ChainError};
use avm_store::UndoStore;
use avm_types::{
    Authority, Name, PermissionLevel, ACTIVE_PERMISSION, CODE_PERMISSION, OWNER_PERMISSION,
};

/// Names under `eosio.` belong to the system.
pub(crate) fn is_reserved(name: Name) -> bool {
    name.to_string().starts_with("eosio.")
}

/// Every account an authority delegates to must exist, and so must every
/// named permission other than `owner`, `active` and the virtual
/// `eosio.code`.
pub(crate) fn validate_authority_precondition<S: UndoStore>(
    ctx: &mut ApplyContext<'_, '_, S>,
    auth: &Authority,
) -> Result<(), ChainError> {
    for entry in &auth.accounts {
        let level = entry.permission;
        if !ctx.is_account(level.actor)? {
            return Err(ChainError::UnknownAccount(level.actor));
        }
        if level.permission == OWNER_PERMISSION
            || level.permission == ACTIVE_PERMISSION
            || level.permission == CODE_PERMISSION
        {
            continue;
        }
        ctx.authorization_manager()
            .get_permission(&PermissionLevel::new(level.actor, level.permission))?;
    }
    Ok(())
}
