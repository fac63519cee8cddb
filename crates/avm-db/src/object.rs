//! Binding of each state object to its object type, indices and row cache.

use avm_serde::{StateDecode, StateEncode};
use avm_types::{
    AccountObject, GlobalPropertyObject, KeyValueObject, ObjectId, PermissionLinkObject,
    PermissionObject, ResourceLimitsObject, ResourceUsageObject, SecondaryObject, TableObject,
};
use lru::LruCache;

use crate::keys::{self, ObjectType};
use crate::secondary::SecondaryKey;
use crate::session::RowCaches;

/// A row kind stored by a [`Session`](crate::Session).
///
/// Every key returned by `index_keys` is unique across rows of the same kind
/// and maps to the row id.
pub trait ChainObject: Clone + Default + StateEncode + StateDecode {
    const OBJECT_TYPE: ObjectType;

    fn id(&self) -> ObjectId;

    fn set_id(&mut self, id: ObjectId);

    fn index_keys(&self) -> Vec<Vec<u8>>;

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, Self>;
}

macro_rules! object_id {
    () => {
        fn id(&self) -> ObjectId {
            self.id
        }

        fn set_id(&mut self, id: ObjectId) {
            self.id = id;
        }
    };
}

impl ChainObject for AccountObject {
    const OBJECT_TYPE: ObjectType = ObjectType::Account;
    object_id!();

    fn index_keys(&self) -> Vec<Vec<u8>> {
        vec![keys::account_by_name(self.name)]
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, Self> {
        &mut caches.accounts
    }
}

impl ChainObject for PermissionObject {
    const OBJECT_TYPE: ObjectType = ObjectType::Permission;
    object_id!();

    fn index_keys(&self) -> Vec<Vec<u8>> {
        vec![
            keys::permission_by_owner(self.owner, self.name),
            keys::permission_by_parent(self.parent, self.id),
        ]
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, Self> {
        &mut caches.permissions
    }
}

impl ChainObject for PermissionLinkObject {
    const OBJECT_TYPE: ObjectType = ObjectType::PermissionLink;
    object_id!();

    fn index_keys(&self) -> Vec<Vec<u8>> {
        vec![
            keys::link_by_action_name(self.account, self.code, self.message_type),
            keys::link_by_permission_name(self.account, self.required_permission, self.id),
        ]
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, Self> {
        &mut caches.links
    }
}

impl ChainObject for TableObject {
    const OBJECT_TYPE: ObjectType = ObjectType::Table;
    object_id!();

    fn index_keys(&self) -> Vec<Vec<u8>> {
        vec![keys::table_by_code_scope_table(self.code, self.scope, self.table)]
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, Self> {
        &mut caches.tables
    }
}

impl ChainObject for KeyValueObject {
    const OBJECT_TYPE: ObjectType = ObjectType::KeyValue;
    object_id!();

    fn index_keys(&self) -> Vec<Vec<u8>> {
        vec![keys::key_value_by_scope_primary(self.t_id, self.primary_key)]
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, Self> {
        &mut caches.key_values
    }
}

impl<K: SecondaryKey> ChainObject for SecondaryObject<K> {
    const OBJECT_TYPE: ObjectType = K::OBJECT_TYPE;
    object_id!();

    fn index_keys(&self) -> Vec<Vec<u8>> {
        vec![
            keys::secondary_by_primary(K::OBJECT_TYPE, self.t_id, self.primary_key),
            keys::secondary_by_secondary(
                K::OBJECT_TYPE,
                self.t_id,
                &self.secondary_key.encode_key(),
                self.primary_key,
            ),
        ]
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, Self> {
        K::row_cache(caches)
    }
}

impl ChainObject for ResourceLimitsObject {
    const OBJECT_TYPE: ObjectType = ObjectType::ResourceLimits;
    object_id!();

    fn index_keys(&self) -> Vec<Vec<u8>> {
        vec![keys::resource_by_owner(ObjectType::ResourceLimits, self.owner)]
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, Self> {
        &mut caches.resource_limits
    }
}

impl ChainObject for ResourceUsageObject {
    const OBJECT_TYPE: ObjectType = ObjectType::ResourceUsage;
    object_id!();

    fn index_keys(&self) -> Vec<Vec<u8>> {
        vec![keys::resource_by_owner(ObjectType::ResourceUsage, self.owner)]
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, Self> {
        &mut caches.resource_usage
    }
}

impl ChainObject for GlobalPropertyObject {
    const OBJECT_TYPE: ObjectType = ObjectType::GlobalProperty;
    object_id!();

    fn index_keys(&self) -> Vec<Vec<u8>> {
        Vec::new()
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, Self> {
        &mut caches.globals
    }
}
