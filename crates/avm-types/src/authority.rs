//! Weighted threshold authorities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::name::Name;
use crate::primitives::PublicKey;

/// Upper bound on the combined number of entries in one authority.
pub const MAX_AUTHORITY_ENTRIES: usize = 1 << 16;

/// An `(actor, permission)` pair, written `actor@permission`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PermissionLevel {
    pub actor: Name,
    pub permission: Name,
}

impl PermissionLevel {
    pub const fn new(actor: Name, permission: Name) -> Self {
        PermissionLevel { actor, permission }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.actor, self.permission)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWeight {
    pub key: PublicKey,
    pub weight: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionLevelWeight {
    pub permission: PermissionLevel,
    pub weight: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitWeight {
    pub wait_sec: u32,
    pub weight: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    pub threshold: u32,
    pub keys: Vec<KeyWeight>,
    pub accounts: Vec<PermissionLevelWeight>,
    pub waits: Vec<WaitWeight>,
}

impl Authority {
    /// Single-key authority with threshold 1.
    pub fn from_key(key: PublicKey) -> Self {
        Authority {
            threshold: 1,
            keys: vec![KeyWeight { key, weight: 1 }],
            accounts: Vec::new(),
            waits: Vec::new(),
        }
    }

    /// Single-permission authority with threshold 1.
    pub fn from_permission(level: PermissionLevel) -> Self {
        Authority {
            threshold: 1,
            keys: Vec::new(),
            accounts: vec![PermissionLevelWeight {
                permission: level,
                weight: 1,
            }],
            waits: Vec::new(),
        }
    }

    /// Sum of every entry's weight.
    pub fn total_weight(&self) -> u64 {
        let keys: u64 = self.keys.iter().map(|k| k.weight as u64).sum();
        let accounts: u64 = self.accounts.iter().map(|a| a.weight as u64).sum();
        let waits: u64 = self.waits.iter().map(|w| w.weight as u64).sum();
        keys + accounts + waits
    }

    /// Structural validity: non-zero threshold, each list strictly ascending
    /// (which also rules out duplicates), and enough total weight to reach
    /// the threshold. Zero-weight entries are allowed.
    pub fn is_valid(&self) -> bool {
        if self.threshold == 0 {
            return false;
        }
        if self.keys.len() + self.accounts.len() + self.waits.len() > MAX_AUTHORITY_ENTRIES {
            return false;
        }
        if !self.keys.windows(2).all(|w| w[0].key < w[1].key) {
            return false;
        }
        if !self
            .accounts
            .windows(2)
            .all(|w| w[0].permission < w[1].permission)
        {
            return false;
        }
        if !self.waits.windows(2).all(|w| w[0].wait_sec < w[1].wait_sec) {
            return false;
        }
        self.total_weight() >= self.threshold as u64
    }
}
