//! Session: one undo session over the store plus per-kind row caches.

use std::num::NonZeroUsize;

use avm_serde::{decode_exact, encode_to_vec, StateError};
use avm_store::{Direction, UndoStore};
use avm_types::{
    AccountObject, GlobalPropertyObject, Index128Object, Index256Object, Index64Object,
    IndexDoubleObject, IndexLongDoubleObject, KeyValueObject, ObjectId, PermissionLinkObject,
    PermissionObject, ResourceLimitsObject, ResourceUsageObject, TableObject,
};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::DbError;
use crate::keys;
use crate::object::ChainObject;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Capacity of each per-kind row cache.
    pub row_cache_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            row_cache_capacity: 1024,
        }
    }
}

/// Decoded rows keyed by id, one LRU per object kind.
///
/// Caches live and die with their session, so they never observe writes
/// from another session.
pub struct RowCaches {
    pub(crate) accounts: LruCache<u64, AccountObject>,
    pub(crate) permissions: LruCache<u64, PermissionObject>,
    pub(crate) links: LruCache<u64, PermissionLinkObject>,
    pub(crate) tables: LruCache<u64, TableObject>,
    pub(crate) key_values: LruCache<u64, KeyValueObject>,
    pub(crate) idx64: LruCache<u64, Index64Object>,
    pub(crate) idx128: LruCache<u64, Index128Object>,
    pub(crate) idx256: LruCache<u64, Index256Object>,
    pub(crate) idx_double: LruCache<u64, IndexDoubleObject>,
    pub(crate) idx_long_double: LruCache<u64, IndexLongDoubleObject>,
    pub(crate) resource_limits: LruCache<u64, ResourceLimitsObject>,
    pub(crate) resource_usage: LruCache<u64, ResourceUsageObject>,
    pub(crate) globals: LruCache<u64, GlobalPropertyObject>,
}

impl RowCaches {
    pub fn new(capacity: NonZeroUsize) -> Self {
        RowCaches {
            accounts: LruCache::new(capacity),
            permissions: LruCache::new(capacity),
            links: LruCache::new(capacity),
            tables: LruCache::new(capacity),
            key_values: LruCache::new(capacity),
            idx64: LruCache::new(capacity),
            idx128: LruCache::new(capacity),
            idx256: LruCache::new(capacity),
            idx_double: LruCache::new(capacity),
            idx_long_double: LruCache::new(capacity),
            resource_limits: LruCache::new(capacity),
            resource_usage: LruCache::new(capacity),
            globals: LruCache::new(capacity),
        }
    }
}

/// Typed access to chain objects inside one undo session of the store.
///
/// The session is opened on construction. `commit` keeps its writes and
/// `discard` undoes them; dropping an unfinished session also undoes them.
pub struct Session<'a, S: UndoStore> {
    store: &'a mut S,
    caches: RowCaches,
    finished: bool,
}

fn decode_id(value: &[u8]) -> Result<ObjectId, DbError> {
    let bytes: [u8; 8] = value
        .try_into()
        .map_err(|_| StateError::InvalidValue("malformed index entry"))?;
    Ok(u64::from_be_bytes(bytes))
}

impl<'a, S: UndoStore> Session<'a, S> {
    pub fn new(store: &'a mut S, config: &SessionConfig) -> Self {
        store.begin();
        let capacity = NonZeroUsize::new(config.row_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Session {
            store,
            caches: RowCaches::new(capacity),
            finished: false,
        }
    }

    pub fn commit(mut self) -> Result<(), DbError> {
        self.finished = true;
        self.store.commit()?;
        Ok(())
    }

    pub fn discard(mut self) -> Result<(), DbError> {
        self.finished = true;
        self.store.rollback()?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    pub fn find<T: ChainObject>(&mut self, id: ObjectId) -> Result<Option<T>, DbError> {
        if let Some(obj) = T::row_cache(&mut self.caches).get(&id) {
            return Ok(Some(obj.clone()));
        }
        let Some(bytes) = self.store.get(&keys::by_id(T::OBJECT_TYPE, id))? else {
            return Ok(None);
        };
        let obj: T = decode_exact(&bytes)?;
        T::row_cache(&mut self.caches).put(id, obj.clone());
        Ok(Some(obj))
    }

    pub fn get<T: ChainObject>(&mut self, id: ObjectId) -> Result<T, DbError> {
        self.find(id)?.ok_or(DbError::RowNotFound {
            object_type: T::OBJECT_TYPE,
            id,
        })
    }

    /// Look up a row through one of its unique index keys.
    pub fn find_by_index<T: ChainObject>(&mut self, key: &[u8]) -> Result<Option<T>, DbError> {
        match self.store.get(key)? {
            Some(value) => {
                let id = decode_id(&value)?;
                self.find(id)
            }
            None => Ok(None),
        }
    }

    /// Forward: the first index entry `>= key`. Reverse: the last `<= key`.
    /// Returns the entry's key and the row id it points to.
    pub fn seek_index(
        &self,
        key: &[u8],
        dir: Direction,
    ) -> Result<Option<(Vec<u8>, ObjectId)>, DbError> {
        match self.store.seek(key, dir)? {
            Some((k, v)) => Ok(Some((k, decode_id(&v)?))),
            None => Ok(None),
        }
    }

    /// Like [`seek_index`](Self::seek_index) but strictly after / before `key`.
    pub fn step_index(
        &self,
        key: &[u8],
        dir: Direction,
    ) -> Result<Option<(Vec<u8>, ObjectId)>, DbError> {
        match self.store.step(key, dir)? {
            Some((k, v)) => Ok(Some((k, decode_id(&v)?))),
            None => Ok(None),
        }
    }

    /// Ids of every row whose index key starts with `prefix`, in key order.
    pub fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<ObjectId>, DbError> {
        let mut ids = Vec::new();
        let mut cursor = self.seek_index(prefix, Direction::Forward)?;
        while let Some((key, id)) = cursor {
            if !key.starts_with(prefix) {
                break;
            }
            ids.push(id);
            cursor = self.step_index(&key, Direction::Forward)?;
        }
        Ok(ids)
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    fn allocate_id(&mut self, object_type: keys::ObjectType) -> Result<ObjectId, DbError> {
        let key = keys::next_id(object_type);
        let next = match self.store.get(&key)? {
            Some(bytes) => decode_id(&bytes)?,
            None => 1,
        };
        self.store.put(&key, &(next + 1).to_be_bytes())?;
        Ok(next)
    }

    /// Insert a new row. `init` fills in every field except the id.
    pub fn create<T: ChainObject>(&mut self, init: impl FnOnce(&mut T)) -> Result<T, DbError> {
        let mut obj = T::default();
        init(&mut obj);
        let id = self.allocate_id(T::OBJECT_TYPE)?;
        obj.set_id(id);

        let index_keys = obj.index_keys();
        for key in &index_keys {
            if self.store.get(key)?.is_some() {
                return Err(DbError::UniqueViolation {
                    object_type: T::OBJECT_TYPE,
                });
            }
        }
        for key in &index_keys {
            self.store.put(key, &id.to_be_bytes())?;
        }
        self.store
            .put(&keys::by_id(T::OBJECT_TYPE, id), &encode_to_vec(&obj))?;
        T::row_cache(&mut self.caches).put(id, obj.clone());
        trace!(object_type = ?T::OBJECT_TYPE, id, "session: create");
        Ok(obj)
    }

    /// Re-read `obj`, apply `update`, and rewrite every index key that changed.
    pub fn modify<T: ChainObject>(
        &mut self,
        obj: &T,
        update: impl FnOnce(&mut T),
    ) -> Result<T, DbError> {
        let id = obj.id();
        let old: T = self.get(id)?;
        let mut new = old.clone();
        update(&mut new);
        if new.id() != id {
            panic!("invariant violation: modify changed the id of {:?} row {}", T::OBJECT_TYPE, id);
        }

        let old_keys = old.index_keys();
        let new_keys = new.index_keys();
        for key in new_keys.iter().filter(|k| !old_keys.contains(k)) {
            if self.store.get(key)?.is_some() {
                return Err(DbError::UniqueViolation {
                    object_type: T::OBJECT_TYPE,
                });
            }
        }
        for key in old_keys.iter().filter(|k| !new_keys.contains(k)) {
            self.store.delete(key)?;
        }
        for key in new_keys.iter().filter(|k| !old_keys.contains(k)) {
            self.store.put(key, &id.to_be_bytes())?;
        }
        self.store
            .put(&keys::by_id(T::OBJECT_TYPE, id), &encode_to_vec(&new))?;
        T::row_cache(&mut self.caches).put(id, new.clone());
        trace!(object_type = ?T::OBJECT_TYPE, id, "session: modify");
        Ok(new)
    }

    pub fn remove<T: ChainObject>(&mut self, obj: &T) -> Result<(), DbError> {
        let id = obj.id();
        let current: T = self.get(id)?;
        for key in current.index_keys() {
            self.store.delete(&key)?;
        }
        self.store.delete(&keys::by_id(T::OBJECT_TYPE, id))?;
        T::row_cache(&mut self.caches).pop(&id);
        trace!(object_type = ?T::OBJECT_TYPE, id, "session: remove");
        Ok(())
    }
}

impl<S: UndoStore> Drop for Session<'_, S> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.store.rollback() {
                tracing::warn!(error = %e, "session: rollback on drop failed");
            }
        }
    }
}
