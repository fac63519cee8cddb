//! Chain object database for the avm execution core.
//!
//! - [`keys`]: order-preserving key codec
//! - [`Session`]: typed repositories with per-kind LRU row caches over one
//!   undo session of an [`avm_store::UndoStore`]
//! - [`IteratorCache`]: guest-facing iterator handles
//! - [`IndexSet`]: the primary and secondary multi-index table families

pub mod account;
pub mod error;
pub mod index;
pub mod iterator_cache;
pub mod keys;
pub mod object;
pub mod permission;
pub mod resource;
pub mod secondary;
pub mod session;
pub mod table;

pub use account::GLOBAL_PROPERTY_ID;
pub use error::DbError;
pub use index::{IndexSet, PrimaryTable, SecondaryTable};
pub use iterator_cache::{CachedRow, IteratorCache, IteratorHandle, IteratorRow};
pub use keys::ObjectType;
pub use object::ChainObject;
pub use secondary::SecondaryKey;
pub use session::{RowCaches, Session, SessionConfig};
