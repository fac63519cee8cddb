//! Permission tree, permission links and declared-authorization checks.

use std::collections::BTreeSet;

use avm_db::Session;
use avm_serde::decode_exact;
use avm_store::UndoStore;
use avm_types::{
    Action, Authority, DeleteAuth, LinkAuth, Name, ObjectId, PermissionLevel, PermissionObject,
    PublicKey, TimePointSec, UnlinkAuth, UpdateAuth, ANY_PERMISSION, SYSTEM_ACCOUNT,
    UNLINKABLE_ACTIONS,
};
use tracing::{debug, warn};

use crate::checker::AuthorityChecker;
use crate::config::AuthorizationConfig;
use crate::error::AuthError;

pub struct AuthorizationManager<'m, 's, S: UndoStore> {
    session: &'m mut Session<'s, S>,
    config: &'m AuthorizationConfig,
}

impl<'m, 's, S: UndoStore> AuthorizationManager<'m, 's, S> {
    pub fn new(session: &'m mut Session<'s, S>, config: &'m AuthorizationConfig) -> Self {
        AuthorizationManager { session, config }
    }

    // ========================================================================
    // Permission tree
    // ========================================================================

    /// Persist permission `account@name` under `parent` (`0` for a root).
    pub fn create_permission(
        &mut self,
        account: Name,
        name: Name,
        parent: ObjectId,
        auth: Authority,
        created_at: TimePointSec,
    ) -> Result<PermissionObject, AuthError> {
        if !auth.is_valid() {
            return Err(AuthError::InvalidAuthority(PermissionLevel::new(account, name)));
        }
        let perm = self.session.create(|p: &mut PermissionObject| {
            p.parent = parent;
            p.owner = account;
            p.name = name;
            p.last_updated = created_at;
            p.auth = auth;
        })?;
        debug!(permission = %PermissionLevel::new(account, name), parent, "permission created");
        Ok(perm)
    }

    pub fn modify_permission(
        &mut self,
        permission: &PermissionObject,
        auth: Authority,
        updated_at: TimePointSec,
    ) -> Result<PermissionObject, AuthError> {
        if !auth.is_valid() {
            return Err(AuthError::InvalidAuthority(level_of(permission)));
        }
        Ok(self.session.modify(permission, |p| {
            p.auth = auth;
            p.last_updated = updated_at;
        })?)
    }

    /// Delete a permission that has neither children nor links.
    pub fn remove_permission(&mut self, permission: &PermissionObject) -> Result<(), AuthError> {
        if !self.session.permission_children(permission.id)?.is_empty() {
            return Err(AuthError::PermissionHasChildren(level_of(permission)));
        }
        let links = self
            .session
            .links_to_permission(permission.owner, permission.name)?;
        if let Some(link) = links.first() {
            return Err(AuthError::PermissionLinked {
                permission: level_of(permission),
                code: link.code,
                action: link.message_type,
            });
        }
        self.session.remove(permission)?;
        Ok(())
    }

    pub fn find_permission(
        &mut self,
        level: &PermissionLevel,
    ) -> Result<Option<PermissionObject>, AuthError> {
        Ok(self
            .session
            .find_permission_by_owner(level.actor, level.permission)?)
    }

    pub fn get_permission(&mut self, level: &PermissionLevel) -> Result<PermissionObject, AuthError> {
        self.find_permission(level)?
            .ok_or(AuthError::UnknownPermission(*level))
    }

    /// Whether `declared` may stand in for `required`: both belong to the same
    /// account and `declared` is `required` or one of its ancestors.
    pub fn satisfies(
        &mut self,
        declared: &PermissionObject,
        required: &PermissionObject,
    ) -> Result<bool, AuthError> {
        if declared.owner != required.owner {
            return Ok(false);
        }
        if declared.id == required.id || declared.id == required.parent {
            return Ok(true);
        }
        let mut ancestor = required.parent;
        while ancestor != 0 {
            let perm: PermissionObject = self.session.get(ancestor)?;
            if perm.parent == declared.id {
                return Ok(true);
            }
            ancestor = perm.parent;
        }
        Ok(false)
    }

    // ========================================================================
    // Links
    // ========================================================================

    /// The permission `account` linked to `code::message_type`, falling back
    /// to the contract-wide link of `code`.
    pub fn lookup_linked_permission(
        &mut self,
        account: Name,
        code: Name,
        message_type: Name,
    ) -> Result<Option<Name>, AuthError> {
        if let Some(link) = self
            .session
            .find_permission_link(account, code, message_type)?
        {
            return Ok(Some(link.required_permission));
        }
        Ok(self
            .session
            .find_permission_link(account, code, Name::EMPTY)?
            .map(|link| link.required_permission))
    }

    /// Minimum permission of `account` required to authorize `code::action`.
    ///
    /// Unlinked actions require the configured active permission; actions
    /// linked to `eosio.any` accept any permission and return `None`.
    pub fn lookup_minimum_permission(
        &mut self,
        account: Name,
        code: Name,
        action: Name,
    ) -> Result<Option<Name>, AuthError> {
        if code == SYSTEM_ACCOUNT && UNLINKABLE_ACTIONS.contains(&action) {
            return Err(AuthError::UnlinkableAction { code, action });
        }
        match self.lookup_linked_permission(account, code, action)? {
            None => Ok(Some(self.config.active_permission)),
            Some(linked) if linked == ANY_PERMISSION => Ok(None),
            Some(linked) => Ok(Some(linked)),
        }
    }

    // ========================================================================
    // Authorization checks
    // ========================================================================

    /// Check every declared authorization of `actions` against the provided
    /// keys, permissions and delay. Returns the keys that were needed.
    pub fn check_authorization<'a>(
        &mut self,
        actions: impl IntoIterator<Item = &'a Action>,
        provided_keys: &[PublicKey],
        provided_permissions: &[PermissionLevel],
        provided_delay_sec: u32,
    ) -> Result<Vec<PublicKey>, AuthError> {
        let mut to_satisfy = BTreeSet::new();
        for act in actions {
            let special_case = act.account == SYSTEM_ACCOUNT && UNLINKABLE_ACTIONS.contains(&act.name);
            if special_case {
                self.check_native_authorization(act)?;
            }
            for declared in &act.authorization {
                if !special_case {
                    self.check_declared_is_relevant(declared, act)?;
                }
                to_satisfy.insert(*declared);
            }
        }

        let depth_limit = self.config.max_authority_depth;
        let allow_unused_keys = self.config.allow_unused_keys;
        let session = &mut *self.session;
        let mut checker = AuthorityChecker::new(
            |level: &PermissionLevel| -> Result<Option<Authority>, AuthError> {
                Ok(session
                    .find_permission_by_owner(level.actor, level.permission)?
                    .map(|p| p.auth))
            },
            depth_limit,
            provided_keys.iter().cloned(),
            provided_permissions.iter().copied(),
            provided_delay_sec,
        );
        let mut cache = checker.new_cache();
        for level in &to_satisfy {
            if !checker.satisfied_level_cached(level, &mut cache)? {
                warn!(%level, "declared authorization not satisfied");
                return Err(AuthError::PermissionNotSatisfied(*level));
            }
        }
        if !allow_unused_keys && !checker.all_keys_used() {
            let unused = checker.unused_keys();
            warn!(unused = unused.len(), "transaction carries irrelevant signatures");
            return Err(AuthError::IrrelevantSignatures(unused));
        }
        Ok(checker.used_keys())
    }

    /// Check that the provided keys, permissions and delay satisfy
    /// `account@permission`.
    pub fn check_permission_authorization(
        &mut self,
        account: Name,
        permission: Name,
        provided_keys: &[PublicKey],
        provided_permissions: &[PermissionLevel],
        provided_delay_sec: u32,
    ) -> Result<(), AuthError> {
        let level = PermissionLevel::new(account, permission);
        let depth_limit = self.config.max_authority_depth;
        let allow_unused_keys = self.config.allow_unused_keys;
        let session = &mut *self.session;
        let mut checker = AuthorityChecker::new(
            |level: &PermissionLevel| -> Result<Option<Authority>, AuthError> {
                Ok(session
                    .find_permission_by_owner(level.actor, level.permission)?
                    .map(|p| p.auth))
            },
            depth_limit,
            provided_keys.iter().cloned(),
            provided_permissions.iter().copied(),
            provided_delay_sec,
        );
        if !checker.satisfied_level(&level)? {
            return Err(AuthError::PermissionNotSatisfied(level));
        }
        if !allow_unused_keys && !checker.all_keys_used() {
            return Err(AuthError::IrrelevantSignatures(checker.unused_keys()));
        }
        Ok(())
    }

    fn check_declared_is_relevant(
        &mut self,
        declared: &PermissionLevel,
        act: &Action,
    ) -> Result<(), AuthError> {
        let Some(min_name) = self.lookup_minimum_permission(declared.actor, act.account, act.name)?
        else {
            return Ok(());
        };
        let minimum = self.get_permission(&PermissionLevel::new(declared.actor, min_name))?;
        let permission = self.get_permission(declared)?;
        self.require_satisfies(&permission, &minimum)
    }

    fn require_satisfies(
        &mut self,
        declared: &PermissionObject,
        minimum: &PermissionObject,
    ) -> Result<(), AuthError> {
        if self.satisfies(declared, minimum)? {
            return Ok(());
        }
        warn!(declared = %level_of(declared), minimum = %level_of(minimum), "irrelevant authority");
        Err(AuthError::IrrelevantAuthority {
            declared: level_of(declared),
            minimum: level_of(minimum),
        })
    }

    /// Authorization rules of the permission-management actions, which
    /// cannot be linked and instead derive their minimum permission from
    /// their payload.
    fn check_native_authorization(&mut self, act: &Action) -> Result<(), AuthError> {
        let [declared] = act.authorization.as_slice() else {
            return Err(AuthError::Validate(
                "permission management actions take exactly one declared authorization",
            ));
        };
        if act.name == UpdateAuth::ACTION {
            let update: UpdateAuth = decode_exact(&act.data)?;
            require_actor(declared, update.account, update.permission)?;
            let minimum = match self
                .find_permission(&PermissionLevel::new(update.account, update.permission))?
            {
                Some(existing) => existing,
                None => self.get_permission(&PermissionLevel::new(update.account, update.parent))?,
            };
            let permission = self.get_permission(declared)?;
            self.require_satisfies(&permission, &minimum)
        } else if act.name == DeleteAuth::ACTION {
            let delete: DeleteAuth = decode_exact(&act.data)?;
            require_actor(declared, delete.account, delete.permission)?;
            let minimum =
                self.get_permission(&PermissionLevel::new(delete.account, delete.permission))?;
            let permission = self.get_permission(declared)?;
            self.require_satisfies(&permission, &minimum)
        } else if act.name == LinkAuth::ACTION {
            let link: LinkAuth = decode_exact(&act.data)?;
            require_actor(declared, link.account, link.requirement)?;
            if link.code == SYSTEM_ACCOUNT && UNLINKABLE_ACTIONS.contains(&link.message_type) {
                return Err(AuthError::UnlinkableAction {
                    code: link.code,
                    action: link.message_type,
                });
            }
            let Some(linked) =
                self.lookup_minimum_permission(link.account, link.code, link.message_type)?
            else {
                return Ok(());
            };
            let minimum = self.get_permission(&PermissionLevel::new(link.account, linked))?;
            let permission = self.get_permission(declared)?;
            self.require_satisfies(&permission, &minimum)
        } else {
            let unlink: UnlinkAuth = decode_exact(&act.data)?;
            require_actor(declared, unlink.account, Name::EMPTY)?;
            let linked = self
                .lookup_linked_permission(unlink.account, unlink.code, unlink.message_type)?
                .ok_or(AuthError::Validate("cannot unlink a non-existent permission link"))?;
            if linked == ANY_PERMISSION {
                return Ok(());
            }
            let minimum = self.get_permission(&PermissionLevel::new(unlink.account, linked))?;
            let permission = self.get_permission(declared)?;
            self.require_satisfies(&permission, &minimum)
        }
    }
}

fn level_of(permission: &PermissionObject) -> PermissionLevel {
    PermissionLevel::new(permission.owner, permission.name)
}

/// The declared actor of a permission-management action must be the account
/// whose permissions it changes.
fn require_actor(
    declared: &PermissionLevel,
    account: Name,
    permission: Name,
) -> Result<(), AuthError> {
    if declared.actor == account {
        return Ok(());
    }
    Err(AuthError::IrrelevantAuthority {
        declared: *declared,
        minimum: PermissionLevel::new(account, permission),
    })
}
