use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::path::Path;

use rocksdb::{Direction as RocksDirection, IteratorMode, WriteBatch, DB};
use tracing::debug;

use crate::store::{Direction, Entry, OrderedStore, UndoStore};
use crate::StoreError;

/// Pending value of a key: `Some(v)` written, `None` deleted.
type Pending = Option<Vec<u8>>;

/// RocksDB-backed store.
///
/// Writes made inside sessions are buffered in an in-memory overlay and reach
/// the database in a single `WriteBatch` when the outermost session commits.
/// Writes made with no open session go straight to the database.
pub struct RocksStore {
    db: DB,
    overlay: BTreeMap<Vec<u8>, Pending>,
    /// Per session, the overlay state of each key before its first write.
    undo: Vec<BTreeMap<Vec<u8>, Option<Pending>>>,
}

impl fmt::Debug for RocksStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RocksStore")
            .field("path", &self.db.path())
            .field("pending", &self.overlay.len())
            .field("depth", &self.undo.len())
            .finish()
    }
}

fn backend(e: rocksdb::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl RocksStore {
    /// Open or create a database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let mut opts = rocksdb::Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path).map_err(backend)?;
        Ok(RocksStore {
            db,
            overlay: BTreeMap::new(),
            undo: Vec::new(),
        })
    }

    fn record(&mut self, key: &[u8]) {
        if let Some(level) = self.undo.last_mut() {
            if !level.contains_key(key) {
                level.insert(key.to_vec(), self.overlay.get(key).cloned());
            }
        }
    }

    fn write(&mut self, key: &[u8], value: Pending) -> Result<(), StoreError> {
        if self.undo.is_empty() {
            return match value {
                Some(v) => self.db.put(key, v).map_err(backend),
                None => self.db.delete(key).map_err(backend),
            };
        }
        self.record(key);
        self.overlay.insert(key.to_vec(), value);
        Ok(())
    }

    /// First live database entry in `dir` order starting from `key`, skipping
    /// keys the overlay has deleted and, if `strict`, the key itself.
    fn db_candidate(
        &self,
        key: &[u8],
        dir: Direction,
        strict: bool,
    ) -> Result<Option<Entry>, StoreError> {
        let mode = match dir {
            Direction::Forward => IteratorMode::From(key, RocksDirection::Forward),
            Direction::Reverse => IteratorMode::From(key, RocksDirection::Reverse),
        };
        for item in self.db.iterator(mode) {
            let (k, v) = item.map_err(backend)?;
            if strict && &*k == key {
                continue;
            }
            if let Some(None) = self.overlay.get(&*k) {
                continue;
            }
            return Ok(Some((k.into_vec(), v.into_vec())));
        }
        Ok(None)
    }

    fn overlay_candidate(&self, key: &[u8], dir: Direction, strict: bool) -> Option<Entry> {
        let (lower, upper) = match (dir, strict) {
            (Direction::Forward, false) => (Bound::Included(key), Bound::Unbounded),
            (Direction::Forward, true) => (Bound::Excluded(key), Bound::Unbounded),
            (Direction::Reverse, false) => (Bound::Unbounded, Bound::Included(key)),
            (Direction::Reverse, true) => (Bound::Unbounded, Bound::Excluded(key)),
        };
        let mut range = self
            .overlay
            .range::<[u8], _>((lower, upper))
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())));
        match dir {
            Direction::Forward => range.next(),
            Direction::Reverse => range.next_back(),
        }
    }

    fn merged(&self, key: &[u8], dir: Direction, strict: bool) -> Result<Option<Entry>, StoreError> {
        let from_db = self.db_candidate(key, dir, strict)?;
        let from_overlay = self.overlay_candidate(key, dir, strict);
        Ok(match (from_db, from_overlay) {
            (None, ov) => ov,
            (db, None) => db.map(|(k, v)| self.resolve(k, v)),
            (Some(db), Some(ov)) => {
                let db_first = match dir {
                    Direction::Forward => db.0 < ov.0,
                    Direction::Reverse => db.0 > ov.0,
                };
                if db_first {
                    Some(self.resolve(db.0, db.1))
                } else {
                    Some(ov)
                }
            }
        })
    }

    /// Prefer an overlay write for a key found in the database.
    fn resolve(&self, key: Vec<u8>, value: Vec<u8>) -> Entry {
        match self.overlay.get(&key) {
            Some(Some(v)) => {
                let v = v.clone();
                (key, v)
            }
            _ => (key, value),
        }
    }
}

impl OrderedStore for RocksStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match self.overlay.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => self.db.get(key).map_err(backend),
        }
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.write(key, Some(value.to_vec()))
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.write(key, None)
    }

    fn seek(&self, key: &[u8], dir: Direction) -> Result<Option<Entry>, StoreError> {
        self.merged(key, dir, false)
    }

    fn step(&self, key: &[u8], dir: Direction) -> Result<Option<Entry>, StoreError> {
        self.merged(key, dir, true)
    }
}

impl UndoStore for RocksStore {
    fn begin(&mut self) {
        self.undo.push(BTreeMap::new());
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let top = self.undo.pop().ok_or(StoreError::NoOpenSession)?;
        if let Some(parent) = self.undo.last_mut() {
            for (key, original) in top {
                parent.entry(key).or_insert(original);
            }
            return Ok(());
        }

        let mut batch = WriteBatch::default();
        for (key, pending) in &self.overlay {
            match pending {
                Some(v) => batch.put(key, v),
                None => batch.delete(key),
            }
        }
        let writes = self.overlay.len();
        self.db.write(batch).map_err(backend)?;
        self.overlay.clear();
        debug!(writes, "rocks store: flushed session");
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let top = self.undo.pop().ok_or(StoreError::NoOpenSession)?;
        for (key, original) in top {
            match original {
                Some(pending) => {
                    self.overlay.insert(key, pending);
                }
                None => {
                    self.overlay.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn depth(&self) -> usize {
        self.undo.len()
    }
}
