use avm_serde::StateError;
use avm_store::StoreError;
use avm_types::{Name, ObjectId};

use crate::keys::ObjectType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("row codec error: {0}")]
    Codec(#[from] StateError),
    #[error("unique index violation on {object_type:?} row")]
    UniqueViolation { object_type: ObjectType },
    #[error("{object_type:?} row {id} not found")]
    RowNotFound { object_type: ObjectType, id: ObjectId },
    #[error("table payer must not be empty")]
    InvalidTablePayer,
    #[error("db access violation: table owned by {code} cannot be modified by {receiver}")]
    DbAccessViolation { code: Name, receiver: Name },
    #[error("invalid secondary key: {0}")]
    InvalidSecondaryKey(&'static str),
}
