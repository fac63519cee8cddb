//! Ordered byte-keyed storage used underneath the chain object database.
//!
//! Two backends implement [`UndoStore`]: [`MemoryStore`] (always available)
//! and `RocksStore` (feature `rocksdb`).

pub mod error;
pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocks;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb")]
pub use rocks::RocksStore;
pub use store::{Direction, Entry, OrderedStore, UndoStore};
