use avm_types::{PublicKey, TimePointSec};
use serde::{Deserialize, Serialize};

/// Initial state of a chain: the system account and the key that controls it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub initial_timestamp: TimePointSec,
    /// Sole key of `eosio@owner` and `eosio@active`.
    pub initial_key: PublicKey,
}

impl GenesisConfig {
    pub fn new(initial_timestamp: TimePointSec, initial_key: PublicKey) -> Self {
        GenesisConfig {
            initial_timestamp,
            initial_key,
        }
    }
}
