//! The multi-index table engine.
//!
//! One primary family over [`KeyValueObject`] rows and one generic secondary
//! family per [`SecondaryKey`] kind. Every ordered operation is a seek on an
//! index key followed by a table-prefix check: an entry belonging to another
//! table means "no more rows in this table".
//!
//! All operations return raw iterator handles (see
//! [`iterator_cache`](crate::iterator_cache)).

use std::marker::PhantomData;

use avm_store::{Direction, UndoStore};
use avm_types::{KeyValueObject, Name, ObjectId, SecondaryObject, TableObject};
use tracing::trace;

use crate::error::DbError;
use crate::iterator_cache::{IteratorCache, IteratorHandle};
use crate::keys::{self, prefix_successor};
use crate::secondary::SecondaryKey;
use crate::session::Session;

// ============================================================================
// Seek helpers
// ============================================================================

fn within(entry: Option<(Vec<u8>, ObjectId)>, prefix: &[u8]) -> Option<ObjectId> {
    entry
        .filter(|(k, _)| k.starts_with(prefix))
        .map(|(_, id)| id)
}

/// First entry `>= key` that still starts with `prefix`.
fn lower_bound<S: UndoStore>(
    session: &Session<'_, S>,
    key: &[u8],
    prefix: &[u8],
) -> Result<Option<ObjectId>, DbError> {
    Ok(within(session.seek_index(key, Direction::Forward)?, prefix))
}

/// First entry `> key` that still starts with `prefix`.
fn upper_bound<S: UndoStore>(
    session: &Session<'_, S>,
    key: &[u8],
    prefix: &[u8],
) -> Result<Option<ObjectId>, DbError> {
    let found = match session.seek_index(key, Direction::Forward)? {
        Some((k, _)) if k == key => session.step_index(key, Direction::Forward)?,
        other => other,
    };
    Ok(within(found, prefix))
}

fn next_within<S: UndoStore>(
    session: &Session<'_, S>,
    key: &[u8],
    prefix: &[u8],
) -> Result<Option<ObjectId>, DbError> {
    Ok(within(session.step_index(key, Direction::Forward)?, prefix))
}

fn previous_within<S: UndoStore>(
    session: &Session<'_, S>,
    key: &[u8],
    prefix: &[u8],
) -> Result<Option<ObjectId>, DbError> {
    Ok(within(session.step_index(key, Direction::Reverse)?, prefix))
}

/// Last entry starting with `prefix`.
fn last_within<S: UndoStore>(
    session: &Session<'_, S>,
    prefix: &[u8],
) -> Result<Option<ObjectId>, DbError> {
    let found = match prefix_successor(prefix) {
        Some(successor) => session.step_index(&successor, Direction::Reverse)?,
        None => session.seek_index(&[0xff; 64], Direction::Reverse)?,
    };
    Ok(within(found, prefix))
}

fn check_payer(payer: Name) -> Result<(), DbError> {
    if payer.is_empty() {
        return Err(DbError::InvalidTablePayer);
    }
    Ok(())
}

fn check_access(table: &TableObject, receiver: Name) -> Result<(), DbError> {
    if table.code != receiver {
        return Err(DbError::DbAccessViolation {
            code: table.code,
            receiver,
        });
    }
    Ok(())
}

// ============================================================================
// Index state
// ============================================================================

/// The iterator state of every index family for one apply context.
///
/// All families share one [`IteratorCache`], so a table has a single end
/// iterator and a live handle of one family is never a valid row of another.
#[derive(Default)]
pub struct IndexSet {
    cache: IteratorCache,
}

impl IndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `db_*_i64` family, acting on behalf of `receiver`.
    pub fn primary<'c, 's, S: UndoStore>(
        &'c mut self,
        session: &'c mut Session<'s, S>,
        receiver: Name,
    ) -> PrimaryTable<'c, 's, S> {
        PrimaryTable {
            session,
            cache: &mut self.cache,
            receiver,
        }
    }

    /// The secondary family for key kind `K`, acting on behalf of `receiver`.
    pub fn secondary<'c, 's, S: UndoStore, K: SecondaryKey>(
        &'c mut self,
        session: &'c mut Session<'s, S>,
        receiver: Name,
    ) -> SecondaryTable<'c, 's, S, K> {
        SecondaryTable {
            session,
            cache: &mut self.cache,
            receiver,
            _key: PhantomData,
        }
    }
}

// ============================================================================
// Primary family
// ============================================================================

pub struct PrimaryTable<'c, 's, S: UndoStore> {
    session: &'c mut Session<'s, S>,
    cache: &'c mut IteratorCache,
    receiver: Name,
}

impl<S: UndoStore> PrimaryTable<'_, '_, S> {
    pub fn store(
        &mut self,
        scope: Name,
        table: Name,
        payer: Name,
        id: u64,
        value: &[u8],
    ) -> Result<i32, DbError> {
        check_payer(payer)?;
        let tab = self
            .session
            .find_or_create_table(self.receiver, scope, table, payer)?;
        let obj = self.session.create(|o: &mut KeyValueObject| {
            o.t_id = tab.id;
            o.primary_key = id;
            o.payer = payer;
            o.value = value.to_vec();
        })?;
        let tab = self.session.modify(&tab, |t| t.count += 1)?;
        self.cache.cache_table(&tab);
        self.cache.update_table(&tab);
        trace!(table = %tab.table, scope = %tab.scope, primary_key = id, "db_store_i64");
        Ok(self.cache.add(obj))
    }

    pub fn update(&mut self, iterator: i32, payer: Name, value: &[u8]) -> Result<(), DbError> {
        let obj = self.cache.get::<KeyValueObject>(iterator).clone();
        check_access(self.cache.get_table(obj.t_id), self.receiver)?;
        let payer = if payer.is_empty() { obj.payer } else { payer };
        let updated = self.session.modify(&obj, |o| {
            o.payer = payer;
            o.value = value.to_vec();
        })?;
        self.cache.replace(iterator, updated);
        Ok(())
    }

    pub fn remove(&mut self, iterator: i32) -> Result<(), DbError> {
        let obj = self.cache.get::<KeyValueObject>(iterator).clone();
        check_access(self.cache.get_table(obj.t_id), self.receiver)?;
        self.session.remove(&obj)?;
        let tab: TableObject = self.session.get(obj.t_id)?;
        let tab = self.session.modify(&tab, |t| t.count -= 1)?;
        if tab.count == 0 {
            self.session.remove_table(&tab)?;
        }
        self.cache.update_table(&tab);
        self.cache.remove(iterator);
        trace!(primary_key = obj.primary_key, remaining = tab.count, "db_remove_i64");
        Ok(())
    }

    /// Value of the row behind `iterator`.
    pub fn get(&self, iterator: i32) -> Vec<u8> {
        self.cache.get::<KeyValueObject>(iterator).value.clone()
    }

    fn add_row(&mut self, id: ObjectId) -> Result<(i32, u64), DbError> {
        let row: KeyValueObject = self.session.get(id)?;
        let primary_key = row.primary_key;
        Ok((self.cache.add(row), primary_key))
    }

    /// Next row in primary key order and its primary key.
    pub fn next(&mut self, iterator: i32) -> Result<(i32, Option<u64>), DbError> {
        if iterator < -1 {
            return Ok((-1, None));
        }
        let obj = self.cache.get::<KeyValueObject>(iterator);
        let t_id = obj.t_id;
        let key = keys::key_value_by_scope_primary(t_id, obj.primary_key);
        match next_within(self.session, &key, &keys::key_value_table_prefix(t_id))? {
            Some(id) => {
                let (it, pk) = self.add_row(id)?;
                Ok((it, Some(pk)))
            }
            None => Ok((self.cache.get_end_iterator_by_table_id(t_id), None)),
        }
    }

    /// Previous row in primary key order. From a table's end iterator this is
    /// the last row; before the first row it is `-1`.
    pub fn previous(&mut self, iterator: i32) -> Result<(i32, Option<u64>), DbError> {
        let found = if iterator < -1 {
            let t_id = match self.cache.find_table_by_end_iterator(iterator) {
                Some(tab) => tab.id,
                None => panic!("invariant violation: end iterator {iterator} was never issued"),
            };
            last_within(self.session, &keys::key_value_table_prefix(t_id))?
        } else {
            let obj = self.cache.get::<KeyValueObject>(iterator);
            let key = keys::key_value_by_scope_primary(obj.t_id, obj.primary_key);
            previous_within(self.session, &key, &keys::key_value_table_prefix(obj.t_id))?
        };
        match found {
            Some(id) => {
                let (it, pk) = self.add_row(id)?;
                Ok((it, Some(pk)))
            }
            None => Ok((-1, None)),
        }
    }

    pub fn find(&mut self, code: Name, scope: Name, table: Name, id: u64) -> Result<i32, DbError> {
        let Some(tab) = self.session.find_table(code, scope, table)? else {
            return Ok(-1);
        };
        let end = self.cache.cache_table(&tab);
        match self
            .session
            .find_by_index::<KeyValueObject>(&keys::key_value_by_scope_primary(tab.id, id))?
        {
            Some(row) => Ok(self.cache.add(row)),
            None => Ok(end),
        }
    }

    pub fn lowerbound(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
        id: u64,
    ) -> Result<i32, DbError> {
        self.bound(code, scope, table, id, false)
    }

    pub fn upperbound(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
        id: u64,
    ) -> Result<i32, DbError> {
        self.bound(code, scope, table, id, true)
    }

    fn bound(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
        id: u64,
        strict: bool,
    ) -> Result<i32, DbError> {
        let Some(tab) = self.session.find_table(code, scope, table)? else {
            return Ok(-1);
        };
        let end = self.cache.cache_table(&tab);
        let key = keys::key_value_by_scope_primary(tab.id, id);
        let prefix = keys::key_value_table_prefix(tab.id);
        let found = if strict {
            upper_bound(self.session, &key, &prefix)?
        } else {
            lower_bound(self.session, &key, &prefix)?
        };
        match found {
            Some(row_id) => Ok(self.add_row(row_id)?.0),
            None => Ok(end),
        }
    }

    pub fn end(&mut self, code: Name, scope: Name, table: Name) -> Result<i32, DbError> {
        match self.session.find_table(code, scope, table)? {
            Some(tab) => Ok(self.cache.cache_table(&tab)),
            None => Ok(-1),
        }
    }
}

// ============================================================================
// Secondary families
// ============================================================================

pub struct SecondaryTable<'c, 's, S: UndoStore, K: SecondaryKey> {
    session: &'c mut Session<'s, S>,
    cache: &'c mut IteratorCache,
    receiver: Name,
    _key: PhantomData<K>,
}

impl<S: UndoStore, K: SecondaryKey> SecondaryTable<'_, '_, S, K> {
    pub fn store(
        &mut self,
        scope: Name,
        table: Name,
        payer: Name,
        id: u64,
        secondary: K,
    ) -> Result<i32, DbError> {
        secondary.validate()?;
        let secondary = secondary.canonical();
        check_payer(payer)?;
        let tab = self
            .session
            .find_or_create_table(self.receiver, scope, table, payer)?;
        let obj = self.session.create(|o: &mut SecondaryObject<K>| {
            o.t_id = tab.id;
            o.primary_key = id;
            o.payer = payer;
            o.secondary_key = secondary;
        })?;
        let tab = self.session.modify(&tab, |t| t.count += 1)?;
        self.cache.cache_table(&tab);
        self.cache.update_table(&tab);
        trace!(index = ?K::OBJECT_TYPE, table = %tab.table, primary_key = id, "secondary store");
        Ok(self.cache.add(obj))
    }

    pub fn update(&mut self, iterator: i32, payer: Name, secondary: K) -> Result<(), DbError> {
        secondary.validate()?;
        let secondary = secondary.canonical();
        let obj = self.cache.get::<SecondaryObject<K>>(iterator).clone();
        check_access(self.cache.get_table(obj.t_id), self.receiver)?;
        let payer = if payer.is_empty() { obj.payer } else { payer };
        let updated = self.session.modify(&obj, |o| {
            o.payer = payer;
            o.secondary_key = secondary;
        })?;
        self.cache.replace(iterator, updated);
        Ok(())
    }

    pub fn remove(&mut self, iterator: i32) -> Result<(), DbError> {
        let obj = self.cache.get::<SecondaryObject<K>>(iterator).clone();
        check_access(self.cache.get_table(obj.t_id), self.receiver)?;
        self.session.remove(&obj)?;
        let tab: TableObject = self.session.get(obj.t_id)?;
        let tab = self.session.modify(&tab, |t| t.count -= 1)?;
        if tab.count == 0 {
            self.session.remove_table(&tab)?;
        }
        self.cache.update_table(&tab);
        self.cache.remove(iterator);
        trace!(index = ?K::OBJECT_TYPE, primary_key = obj.primary_key, "secondary remove");
        Ok(())
    }

    /// The row behind `iterator`.
    pub fn get(&self, iterator: i32) -> &SecondaryObject<K> {
        self.cache.get::<SecondaryObject<K>>(iterator)
    }

    fn add_row(&mut self, id: ObjectId) -> Result<(i32, SecondaryObject<K>), DbError> {
        let row: SecondaryObject<K> = self.session.get(id)?;
        Ok((self.cache.add(row.clone()), row))
    }

    /// Exact match on the secondary key; the lowest primary key wins ties.
    pub fn find_secondary(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
        secondary: &K,
    ) -> Result<(i32, Option<u64>), DbError> {
        secondary.validate()?;
        let Some(tab) = self.session.find_table(code, scope, table)? else {
            return Ok((-1, None));
        };
        let end = self.cache.cache_table(&tab);
        let prefix = keys::secondary_value_prefix(
            K::OBJECT_TYPE,
            tab.id,
            &secondary.canonical().encode_key(),
        );
        match lower_bound(self.session, &prefix, &prefix)? {
            Some(id) => {
                let (it, row) = self.add_row(id)?;
                Ok((it, Some(row.primary_key)))
            }
            None => Ok((end, None)),
        }
    }

    /// Exact match on the primary key within this index.
    pub fn find_primary(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
        primary: u64,
    ) -> Result<(i32, Option<K>), DbError> {
        let Some(tab) = self.session.find_table(code, scope, table)? else {
            return Ok((-1, None));
        };
        let end = self.cache.cache_table(&tab);
        let key = keys::secondary_by_primary(K::OBJECT_TYPE, tab.id, primary);
        match self.session.find_by_index::<SecondaryObject<K>>(&key)? {
            Some(row) => {
                let secondary = row.secondary_key;
                Ok((self.cache.add(row), Some(secondary)))
            }
            None => Ok((end, None)),
        }
    }

    /// First row with secondary key `>= secondary`, with its secondary and
    /// primary keys.
    pub fn lowerbound_secondary(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
        secondary: &K,
    ) -> Result<(i32, Option<(K, u64)>), DbError> {
        self.secondary_bound(code, scope, table, secondary, false)
    }

    /// First row with secondary key `> secondary`.
    pub fn upperbound_secondary(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
        secondary: &K,
    ) -> Result<(i32, Option<(K, u64)>), DbError> {
        self.secondary_bound(code, scope, table, secondary, true)
    }

    fn secondary_bound(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
        secondary: &K,
        strict: bool,
    ) -> Result<(i32, Option<(K, u64)>), DbError> {
        secondary.validate()?;
        let Some(tab) = self.session.find_table(code, scope, table)? else {
            return Ok((-1, None));
        };
        let end = self.cache.cache_table(&tab);
        let encoded = secondary.canonical().encode_key();
        let prefix = keys::secondary_by_secondary_prefix(K::OBJECT_TYPE, tab.id);
        let found = if strict {
            let key = keys::secondary_by_secondary(K::OBJECT_TYPE, tab.id, &encoded, u64::MAX);
            upper_bound(self.session, &key, &prefix)?
        } else {
            let key = keys::secondary_by_secondary(K::OBJECT_TYPE, tab.id, &encoded, 0);
            lower_bound(self.session, &key, &prefix)?
        };
        match found {
            Some(id) => {
                let (it, row) = self.add_row(id)?;
                Ok((it, Some((row.secondary_key, row.primary_key))))
            }
            None => Ok((end, None)),
        }
    }

    pub fn lowerbound_primary(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
        primary: u64,
    ) -> Result<i32, DbError> {
        self.primary_bound(code, scope, table, primary, false)
    }

    pub fn upperbound_primary(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
        primary: u64,
    ) -> Result<i32, DbError> {
        self.primary_bound(code, scope, table, primary, true)
    }

    fn primary_bound(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
        primary: u64,
        strict: bool,
    ) -> Result<i32, DbError> {
        let Some(tab) = self.session.find_table(code, scope, table)? else {
            return Ok(-1);
        };
        let end = self.cache.cache_table(&tab);
        let key = keys::secondary_by_primary(K::OBJECT_TYPE, tab.id, primary);
        let prefix = keys::secondary_by_primary_prefix(K::OBJECT_TYPE, tab.id);
        let found = if strict {
            upper_bound(self.session, &key, &prefix)?
        } else {
            lower_bound(self.session, &key, &prefix)?
        };
        match found {
            Some(id) => Ok(self.add_row(id)?.0),
            None => Ok(end),
        }
    }

    pub fn end_secondary(&mut self, code: Name, scope: Name, table: Name) -> Result<i32, DbError> {
        match self.session.find_table(code, scope, table)? {
            Some(tab) => Ok(self.cache.cache_table(&tab)),
            None => Ok(-1),
        }
    }

    /// Next row in `(secondary, primary)` order and its primary key.
    pub fn next_secondary(&mut self, iterator: i32) -> Result<(i32, Option<u64>), DbError> {
        if iterator < -1 {
            return Ok((-1, None));
        }
        let obj = self.cache.get::<SecondaryObject<K>>(iterator);
        let t_id = obj.t_id;
        let key = secondary_key_of(obj);
        let prefix = keys::secondary_by_secondary_prefix(K::OBJECT_TYPE, t_id);
        self.advance(next_within(self.session, &key, &prefix)?, t_id)
    }

    /// Previous row in `(secondary, primary)` order. From a table's end
    /// iterator this is the last row; before the first row it is `-1`.
    pub fn previous_secondary(&mut self, iterator: i32) -> Result<(i32, Option<u64>), DbError> {
        let found = if iterator < -1 {
            let t_id = self.table_of_end_iterator(iterator);
            let prefix = keys::secondary_by_secondary_prefix(K::OBJECT_TYPE, t_id);
            last_within(self.session, &prefix)?
        } else {
            let obj = self.cache.get::<SecondaryObject<K>>(iterator);
            let key = secondary_key_of(obj);
            let prefix = keys::secondary_by_secondary_prefix(K::OBJECT_TYPE, obj.t_id);
            previous_within(self.session, &key, &prefix)?
        };
        self.retreat(found)
    }

    /// Next row in primary key order and its primary key.
    pub fn next_primary(&mut self, iterator: i32) -> Result<(i32, Option<u64>), DbError> {
        if iterator < -1 {
            return Ok((-1, None));
        }
        let obj = self.cache.get::<SecondaryObject<K>>(iterator);
        let t_id = obj.t_id;
        let key = keys::secondary_by_primary(K::OBJECT_TYPE, t_id, obj.primary_key);
        let prefix = keys::secondary_by_primary_prefix(K::OBJECT_TYPE, t_id);
        self.advance(next_within(self.session, &key, &prefix)?, t_id)
    }

    /// Previous row in primary key order.
    pub fn previous_primary(&mut self, iterator: i32) -> Result<(i32, Option<u64>), DbError> {
        let found = if iterator < -1 {
            let t_id = self.table_of_end_iterator(iterator);
            let prefix = keys::secondary_by_primary_prefix(K::OBJECT_TYPE, t_id);
            last_within(self.session, &prefix)?
        } else {
            let obj = self.cache.get::<SecondaryObject<K>>(iterator);
            let key = keys::secondary_by_primary(K::OBJECT_TYPE, obj.t_id, obj.primary_key);
            let prefix = keys::secondary_by_primary_prefix(K::OBJECT_TYPE, obj.t_id);
            previous_within(self.session, &key, &prefix)?
        };
        self.retreat(found)
    }

    fn table_of_end_iterator(&self, iterator: i32) -> ObjectId {
        match self.cache.find_table_by_end_iterator(iterator) {
            Some(tab) => tab.id,
            None => panic!("invariant violation: end iterator {iterator} was never issued"),
        }
    }

    fn advance(&mut self, found: Option<ObjectId>, t_id: ObjectId) -> Result<(i32, Option<u64>), DbError> {
        match found {
            Some(id) => {
                let (it, row) = self.add_row(id)?;
                Ok((it, Some(row.primary_key)))
            }
            None => Ok((self.cache.get_end_iterator_by_table_id(t_id), None)),
        }
    }

    fn retreat(&mut self, found: Option<ObjectId>) -> Result<(i32, Option<u64>), DbError> {
        match found {
            Some(id) => {
                let (it, row) = self.add_row(id)?;
                Ok((it, Some(row.primary_key)))
            }
            None => Ok((IteratorHandle::NotFound.to_raw(), None)),
        }
    }
}

fn secondary_key_of<K: SecondaryKey>(obj: &SecondaryObject<K>) -> Vec<u8> {
    keys::secondary_by_secondary(
        K::OBJECT_TYPE,
        obj.t_id,
        &obj.secondary_key.encode_key(),
        obj.primary_key,
    )
}
