use std::collections::btree_map::Entry as MapEntry;
use std::collections::BTreeMap;
use std::ops::Bound;

use tracing::trace;

use crate::store::{Direction, Entry, OrderedStore, UndoStore};
use crate::StoreError;

/// Previous value of every key first touched inside one undo session.
type UndoLevel = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

/// In-memory ordered store with an undo log per session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    undo: Vec<UndoLevel>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn record(&mut self, key: &[u8]) {
        if let Some(level) = self.undo.last_mut() {
            if !level.contains_key(key) {
                level.insert(key.to_vec(), self.data.get(key).cloned());
            }
        }
    }

    fn first_in(&self, lower: Bound<&[u8]>, upper: Bound<&[u8]>, dir: Direction) -> Option<Entry> {
        let mut range = self.data.range::<[u8], _>((lower, upper));
        let found = match dir {
            Direction::Forward => range.next(),
            Direction::Reverse => range.next_back(),
        };
        found.map(|(k, v)| (k.clone(), v.clone()))
    }
}

impl OrderedStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.record(key);
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.record(key);
        self.data.remove(key);
        Ok(())
    }

    fn seek(&self, key: &[u8], dir: Direction) -> Result<Option<Entry>, StoreError> {
        Ok(match dir {
            Direction::Forward => self.first_in(Bound::Included(key), Bound::Unbounded, dir),
            Direction::Reverse => self.first_in(Bound::Unbounded, Bound::Included(key), dir),
        })
    }

    fn step(&self, key: &[u8], dir: Direction) -> Result<Option<Entry>, StoreError> {
        Ok(match dir {
            Direction::Forward => self.first_in(Bound::Excluded(key), Bound::Unbounded, dir),
            Direction::Reverse => self.first_in(Bound::Unbounded, Bound::Excluded(key), dir),
        })
    }
}

impl UndoStore for MemoryStore {
    fn begin(&mut self) {
        self.undo.push(UndoLevel::new());
        trace!(depth = self.undo.len(), "memory store: begin session");
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let top = self.undo.pop().ok_or(StoreError::NoOpenSession)?;
        if let Some(parent) = self.undo.last_mut() {
            // The parent keeps its own original value for keys it already saw.
            for (key, original) in top {
                if let MapEntry::Vacant(slot) = parent.entry(key) {
                    slot.insert(original);
                }
            }
        }
        trace!(depth = self.undo.len(), "memory store: commit session");
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let top = self.undo.pop().ok_or(StoreError::NoOpenSession)?;
        let restored = top.len();
        for (key, original) in top {
            match original {
                Some(value) => {
                    self.data.insert(key, value);
                }
                None => {
                    self.data.remove(&key);
                }
            }
        }
        trace!(depth = self.undo.len(), restored, "memory store: rollback session");
        Ok(())
    }

    fn depth(&self) -> usize {
        self.undo.len()
    }
}
