use avm_auth::AuthorizationConfig;
use avm_db::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::error::ChainError;

/// Execution limits and per-layer configuration of a chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Nesting limit for inline actions; top-level actions run at depth 0.
    pub max_inline_action_depth: u16,
    /// Upper bound (exclusive) on the encoded size of one inline action.
    pub max_inline_action_size: u32,
    pub authorization: AuthorizationConfig,
    pub session: SessionConfig,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            max_inline_action_depth: 4,
            max_inline_action_size: 4096,
            authorization: AuthorizationConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl ChainConfig {
    /// Relaxed limits for local development: deeper inline nesting and
    /// tolerance for superfluous signatures.
    pub fn devnet() -> Self {
        ChainConfig {
            max_inline_action_depth: 8,
            max_inline_action_size: 512 * 1024,
            authorization: AuthorizationConfig {
                allow_unused_keys: true,
                ..AuthorizationConfig::default()
            },
            session: SessionConfig {
                row_cache_capacity: 4096,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ChainError> {
        if self.max_inline_action_size == 0 {
            return Err(ChainError::InvalidConfig("max_inline_action_size must be positive"));
        }
        if self.authorization.max_authority_depth == 0 {
            return Err(ChainError::InvalidConfig("max_authority_depth must be positive"));
        }
        if self.authorization.active_permission.is_empty() {
            return Err(ChainError::InvalidConfig("active_permission must not be empty"));
        }
        if self.session.row_cache_capacity == 0 {
            return Err(ChainError::InvalidConfig("row_cache_capacity must be positive"));
        }
        Ok(())
    }
}
