//! Small integer iterator handles for guest code.
//!
//! Raw handle space:
//!
//! - `-1`: not found / no such element
//! - `< -1`: the end iterator of one table, `-(slot + 2)` where `slot` is the
//!   table's position in the append-only table list
//! - `>= 0`: a live cached row
//!
//! One cache serves every index family of an apply context, so a live handle
//! names exactly one row of one kind. Handles are only meaningful inside the
//! session that issued them.

use std::collections::HashMap;

use avm_types::{Float128, KeyValueObject, ObjectId, SecondaryObject, TableObject, U256};

use crate::keys::ObjectType;
use crate::object::ChainObject;
use crate::secondary::SecondaryKey;

/// Decoded form of a raw iterator handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IteratorHandle {
    NotFound,
    End(usize),
    Live(usize),
}

impl IteratorHandle {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => IteratorHandle::NotFound,
            r if r < -1 => IteratorHandle::End((-(r as i64) - 2) as usize),
            r => IteratorHandle::Live(r as usize),
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            IteratorHandle::NotFound => -1,
            IteratorHandle::End(slot) => -(slot as i32) - 2,
            IteratorHandle::Live(index) => index as i32,
        }
    }
}

/// A row behind a live handle, tagged with its kind.
#[derive(Clone, Debug)]
pub enum CachedRow {
    KeyValue(KeyValueObject),
    Index64(SecondaryObject<u64>),
    Index128(SecondaryObject<u128>),
    Index256(SecondaryObject<U256>),
    IndexDouble(SecondaryObject<f64>),
    IndexLongDouble(SecondaryObject<Float128>),
}

impl CachedRow {
    pub fn object_type(&self) -> ObjectType {
        match self {
            CachedRow::KeyValue(_) => ObjectType::KeyValue,
            CachedRow::Index64(_) => ObjectType::Index64,
            CachedRow::Index128(_) => ObjectType::Index128,
            CachedRow::Index256(_) => ObjectType::Index256,
            CachedRow::IndexDouble(_) => ObjectType::IndexDouble,
            CachedRow::IndexLongDouble(_) => ObjectType::IndexLongDouble,
        }
    }

    pub fn id(&self) -> ObjectId {
        match self {
            CachedRow::KeyValue(r) => r.id,
            CachedRow::Index64(r) => r.id,
            CachedRow::Index128(r) => r.id,
            CachedRow::Index256(r) => r.id,
            CachedRow::IndexDouble(r) => r.id,
            CachedRow::IndexLongDouble(r) => r.id,
        }
    }
}

/// A row kind that can sit behind an iterator handle.
pub trait IteratorRow: ChainObject {
    fn into_cached(self) -> CachedRow;

    /// `None` when `row` is of another kind.
    fn from_cached(row: &CachedRow) -> Option<&Self>;
}

impl IteratorRow for KeyValueObject {
    fn into_cached(self) -> CachedRow {
        CachedRow::KeyValue(self)
    }

    fn from_cached(row: &CachedRow) -> Option<&Self> {
        match row {
            CachedRow::KeyValue(r) => Some(r),
            _ => None,
        }
    }
}

impl<K: SecondaryKey> IteratorRow for SecondaryObject<K> {
    fn into_cached(self) -> CachedRow {
        K::into_cached_row(self)
    }

    fn from_cached(row: &CachedRow) -> Option<&Self> {
        K::cached_row(row)
    }
}

/// Cache of rows and table end sentinels shared by every index family.
#[derive(Default)]
pub struct IteratorCache {
    tables: Vec<TableObject>,
    table_slots: HashMap<ObjectId, usize>,
    objects: Vec<Option<CachedRow>>,
    object_handles: HashMap<(ObjectType, ObjectId), usize>,
}

impl IteratorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// End iterator of `table`, allocating one on first use.
    pub fn cache_table(&mut self, table: &TableObject) -> i32 {
        if let Some(&slot) = self.table_slots.get(&table.id) {
            return IteratorHandle::End(slot).to_raw();
        }
        let slot = self.tables.len();
        self.tables.push(table.clone());
        self.table_slots.insert(table.id, slot);
        IteratorHandle::End(slot).to_raw()
    }

    /// The cached table with id `table_id`.
    ///
    /// Panics if the table was never cached.
    pub fn get_table(&self, table_id: ObjectId) -> &TableObject {
        match self.table_slots.get(&table_id) {
            Some(&slot) => &self.tables[slot],
            None => panic!("invariant violation: table {table_id} should be in the iterator cache"),
        }
    }

    /// Panics if the table was never cached.
    pub fn get_end_iterator_by_table_id(&self, table_id: ObjectId) -> i32 {
        match self.table_slots.get(&table_id) {
            Some(&slot) => IteratorHandle::End(slot).to_raw(),
            None => panic!("invariant violation: table {table_id} should be in the iterator cache"),
        }
    }

    /// Inverse of [`cache_table`](Self::cache_table). `None` when the handle
    /// was never issued.
    ///
    /// Panics if `end_iterator` is not in the end-iterator range.
    pub fn find_table_by_end_iterator(&self, end_iterator: i32) -> Option<&TableObject> {
        match IteratorHandle::from_raw(end_iterator) {
            IteratorHandle::End(slot) => self.tables.get(slot),
            _ => panic!("invariant violation: {end_iterator} is not an end iterator"),
        }
    }

    /// Handle of `obj`, adding it on first sight and refreshing it otherwise.
    pub fn add<T: IteratorRow>(&mut self, obj: T) -> i32 {
        let identity = (T::OBJECT_TYPE, obj.id());
        if let Some(&index) = self.object_handles.get(&identity) {
            self.objects[index] = Some(obj.into_cached());
            return IteratorHandle::Live(index).to_raw();
        }
        let index = self.objects.len();
        self.object_handles.insert(identity, index);
        self.objects.push(Some(obj.into_cached()));
        IteratorHandle::Live(index).to_raw()
    }

    /// The row behind a live handle.
    ///
    /// Panics on `-1`, on end iterators, on out-of-range handles, on
    /// handles whose row was removed and on handles to a row of another kind.
    pub fn get<T: IteratorRow>(&self, iterator: i32) -> &T {
        let row = self.get_row(iterator);
        match T::from_cached(row) {
            Some(obj) => obj,
            None => panic!(
                "invariant violation: iterator {iterator} references a {:?} row, not {:?}",
                row.object_type(),
                T::OBJECT_TYPE
            ),
        }
    }

    /// The tagged row behind a live handle, whatever its kind.
    pub fn get_row(&self, iterator: i32) -> &CachedRow {
        match IteratorHandle::from_raw(iterator) {
            IteratorHandle::NotFound => panic!("invariant violation: invalid iterator"),
            IteratorHandle::End(_) => panic!("invariant violation: dereference of end iterator"),
            IteratorHandle::Live(index) => match self.objects.get(index) {
                Some(Some(row)) => row,
                Some(None) => panic!("invariant violation: dereference of deleted object"),
                None => panic!("invariant violation: iterator {iterator} out of range"),
            },
        }
    }

    /// Refresh the cached copy of a row after it was modified.
    pub fn replace<T: IteratorRow>(&mut self, iterator: i32, obj: T) {
        if let IteratorHandle::Live(index) = IteratorHandle::from_raw(iterator) {
            if let Some(slot) = self.objects.get_mut(index) {
                if slot.is_some() {
                    *slot = Some(obj.into_cached());
                }
            }
        }
    }

    /// Refresh the cached copy of a table after its row count changed.
    pub fn update_table(&mut self, table: &TableObject) {
        if let Some(&slot) = self.table_slots.get(&table.id) {
            self.tables[slot] = table.clone();
        }
    }

    /// Evict the row behind `iterator`. The handle is not reused.
    ///
    /// Panics on `-1` and end iterators.
    pub fn remove(&mut self, iterator: i32) {
        let index = match IteratorHandle::from_raw(iterator) {
            IteratorHandle::Live(index) => index,
            IteratorHandle::NotFound => panic!("invariant violation: invalid iterator"),
            IteratorHandle::End(_) => panic!("invariant violation: removal of end iterator"),
        };
        let Some(slot) = self.objects.get_mut(index) else {
            return;
        };
        if let Some(row) = slot.take() {
            self.object_handles.remove(&(row.object_type(), row.id()));
        }
    }
}
