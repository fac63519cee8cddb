//! Account, permission, link and resource objects.

use crate::authority::Authority;
use crate::name::Name;
use crate::primitives::{Hash32, ObjectId, TimePointSec};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountObject {
    pub id: ObjectId,
    pub name: Name,
    pub creation_date: TimePointSec,
    pub privileged: bool,
    /// Number of actions this account has received.
    pub recv_sequence: u64,
    /// Number of actions this account has authorized.
    pub auth_sequence: u64,
    pub code_sequence: u32,
    pub abi_sequence: u32,
    /// Zero when no code is deployed.
    pub code_hash: Hash32,
    pub abi: Vec<u8>,
}

impl AccountObject {
    pub fn has_code(&self) -> bool {
        self.code_hash != [0u8; 32]
    }
}

/// A node of an account's permission tree.
///
/// `parent == 0` marks the root (`owner`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PermissionObject {
    pub id: ObjectId,
    pub parent: ObjectId,
    pub owner: Name,
    pub name: Name,
    pub last_updated: TimePointSec,
    pub auth: Authority,
}

/// Maps `(account, code, message_type)` to the minimum permission required.
///
/// An empty `message_type` is the contract-wide default link.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PermissionLinkObject {
    pub id: ObjectId,
    pub account: Name,
    pub code: Name,
    pub message_type: Name,
    pub required_permission: Name,
}

/// Configured resource limits; `-1` means unlimited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceLimitsObject {
    pub id: ObjectId,
    pub owner: Name,
    pub ram_bytes: i64,
    pub net_weight: i64,
    pub cpu_weight: i64,
}

impl Default for ResourceLimitsObject {
    fn default() -> Self {
        ResourceLimitsObject {
            id: 0,
            owner: Name::EMPTY,
            ram_bytes: -1,
            net_weight: -1,
            cpu_weight: -1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceUsageObject {
    pub id: ObjectId,
    pub owner: Name,
    pub ram_usage: u64,
    pub net_usage: u64,
    pub cpu_usage: u64,
}

/// Chain-wide singleton row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobalPropertyObject {
    pub id: ObjectId,
    pub global_action_sequence: u64,
}
