use avm_db::DbError;
use avm_serde::StateError;
use avm_types::{Name, PermissionLevel, PublicKey};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("action payload: {0}")]
    Codec(#[from] StateError),
    #[error("permission {0} does not exist")]
    UnknownPermission(PermissionLevel),
    #[error("action declares irrelevant authority {declared}; minimum authority is {minimum}")]
    IrrelevantAuthority {
        declared: PermissionLevel,
        minimum: PermissionLevel,
    },
    #[error("transaction declares authority {0} but does not have signatures for it")]
    PermissionNotSatisfied(PermissionLevel),
    #[error("transaction bears irrelevant signatures from {} keys", .0.len())]
    IrrelevantSignatures(Vec<PublicKey>),
    #[error("cannot link {code}::{action} to a minimum permission")]
    UnlinkableAction { code: Name, action: Name },
    #[error("invalid authority for {0}")]
    InvalidAuthority(PermissionLevel),
    #[error("permission {0} still has children")]
    PermissionHasChildren(PermissionLevel),
    #[error("permission {permission} is linked to {code}::{action}")]
    PermissionLinked {
        permission: PermissionLevel,
        code: Name,
        action: Name,
    },
    #[error("{0}")]
    Validate(&'static str),
}
