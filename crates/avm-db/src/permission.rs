use avm_store::UndoStore;
use avm_types::{Name, ObjectId, PermissionLinkObject, PermissionObject};

use crate::error::DbError;
use crate::keys;
use crate::session::Session;

impl<S: UndoStore> Session<'_, S> {
    pub fn find_permission_by_owner(
        &mut self,
        owner: Name,
        name: Name,
    ) -> Result<Option<PermissionObject>, DbError> {
        self.find_by_index(&keys::permission_by_owner(owner, name))
    }

    /// Direct children of permission `parent`, in id order.
    pub fn permission_children(
        &mut self,
        parent: ObjectId,
    ) -> Result<Vec<PermissionObject>, DbError> {
        let ids = self.scan_prefix(&keys::permission_children_prefix(parent))?;
        ids.into_iter().map(|id| self.get(id)).collect()
    }

    pub fn find_permission_link(
        &mut self,
        account: Name,
        code: Name,
        message_type: Name,
    ) -> Result<Option<PermissionLinkObject>, DbError> {
        self.find_by_index(&keys::link_by_action_name(account, code, message_type))
    }

    /// Links of `account` that require `permission`.
    pub fn links_to_permission(
        &mut self,
        account: Name,
        permission: Name,
    ) -> Result<Vec<PermissionLinkObject>, DbError> {
        let ids = self.scan_prefix(&keys::links_by_permission_prefix(account, permission))?;
        ids.into_iter().map(|id| self.get(id)).collect()
    }
}
