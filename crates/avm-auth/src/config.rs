use avm_types::{Name, ACTIVE_PERMISSION};
use serde::{Deserialize, Serialize};

/// Knobs of the authorization layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    /// How deep authorities may nest through permission-level entries.
    pub max_authority_depth: u16,
    /// Permission required when no link matches an action.
    pub active_permission: Name,
    /// Accept transactions that carry keys no authority needed.
    pub allow_unused_keys: bool,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        AuthorizationConfig {
            max_authority_depth: 6,
            active_permission: ACTIVE_PERMISSION,
            allow_unused_keys: false,
        }
    }
}
