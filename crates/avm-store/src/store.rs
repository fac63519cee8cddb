use crate::StoreError;

/// A key/value pair read from a store.
pub type Entry = (Vec<u8>, Vec<u8>);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Byte-keyed store ordered lexicographically by key.
pub trait OrderedStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;

    /// Forward: the first entry with a key `>= key`.
    /// Reverse: the last entry with a key `<= key`.
    fn seek(&self, key: &[u8], dir: Direction) -> Result<Option<Entry>, StoreError>;

    /// Forward: the first entry with a key `> key`.
    /// Reverse: the last entry with a key `< key`.
    fn step(&self, key: &[u8], dir: Direction) -> Result<Option<Entry>, StoreError>;
}

/// An [`OrderedStore`] with nested undo sessions.
///
/// Writes made after `begin` are undone by the matching `rollback`. A
/// `commit` folds the innermost session into its parent; committing the
/// outermost session makes the writes durable.
pub trait UndoStore: OrderedStore {
    fn begin(&mut self);

    fn commit(&mut self) -> Result<(), StoreError>;

    fn rollback(&mut self) -> Result<(), StoreError>;

    /// Number of open sessions.
    fn depth(&self) -> usize;
}
