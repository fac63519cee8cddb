use avm_auth::AuthError;
use avm_db::DbError;
use avm_serde::StateError;
use avm_types::{Name, PermissionLevel, TimePointSec};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("action payload: {0}")]
    Codec(#[from] StateError),
    #[error("max inline action depth {limit} reached")]
    InlineActionRecursionDepthExceeded { limit: u16 },
    #[error("missing authority of {0}")]
    MissingAuth(Name),
    #[error("missing authority of {0}")]
    MissingPermission(PermissionLevel),
    #[error("account {0} does not exist")]
    UnknownAccount(Name),
    #[error("account {0} already exists")]
    AccountNameExists(Name),
    #[error("inline action of {size} bytes exceeds the {limit} byte limit")]
    InlineActionTooBig { size: usize, limit: u32 },
    #[error("{0}")]
    ActionValidate(String),
    #[error("{receiver} has contract code but no native handler for {contract}::{action}")]
    ContractExecutionUnsupported {
        receiver: Name,
        contract: Name,
        action: Name,
    },
    #[error("deferred transactions are not supported")]
    DeferredTransactionsUnsupported,
    #[error("transaction has no actions")]
    NoActions,
    #[error("transaction expired at {expiration:?}, block time {block_time:?}")]
    Expired {
        expiration: TimePointSec,
        block_time: TimePointSec,
    },
    #[error("invalid chain config: {0}")]
    InvalidConfig(&'static str),
}

impl ChainError {
    pub fn validate(msg: impl Into<String>) -> Self {
        ChainError::ActionValidate(msg.into())
    }
}
