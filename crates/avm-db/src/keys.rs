//! Order-preserving byte keys.
//!
//! Every key is `object_type_byte ++ "__" ++ index_name ++ ("__" ++ field)*`.
//! Field encodings:
//!
//! - ids and unsigned integers: fixed-width big-endian
//! - names: 8-byte little-endian pack
//! - booleans: one byte, 0 or 1
//! - `TimePointSec`: 4-byte big-endian
//! - `U256`: its 32 big-endian bytes
//! - floats: sign-folded bits, big-endian (negative values have every bit
//!   inverted, others only the sign bit), so byte order equals numeric order
//!
//! Only integer, time and float fields are ever range-scanned; name fields
//! are matched exactly.

use avm_types::{Float128, Name, ObjectId, TimePointSec, U256};
use serde::{Deserialize, Serialize};

const SEP: &[u8] = b"__";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjectType {
    Account = 1,
    Permission = 2,
    PermissionLink = 3,
    Table = 4,
    KeyValue = 5,
    Index64 = 6,
    Index128 = 7,
    Index256 = 8,
    IndexDouble = 9,
    IndexLongDouble = 10,
    ResourceLimits = 11,
    ResourceUsage = 12,
    GlobalProperty = 13,
}

impl ObjectType {
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

// Index names.
pub const BY_ID: &str = "byId";
pub const NEXT_ID: &str = "nextId";
pub const BY_NAME: &str = "byName";
pub const BY_OWNER: &str = "byOwner";
pub const BY_PARENT: &str = "byParent";
pub const BY_ACTION_NAME: &str = "byActionName";
pub const BY_PERMISSION_NAME: &str = "byPermissionName";
pub const BY_CODE_SCOPE_TABLE: &str = "byCodeScopeTable";
pub const BY_SCOPE_PRIMARY: &str = "byScopePrimary";
pub const BY_PRIMARY: &str = "byPrimary";
pub const BY_SECONDARY: &str = "bySecondary";

/// Builds one key field by field.
#[derive(Clone, Debug)]
pub struct KeyBuilder(Vec<u8>);

impl KeyBuilder {
    pub fn new(object_type: ObjectType, index: &str) -> Self {
        let mut out = Vec::with_capacity(48);
        out.push(object_type.tag());
        out.extend_from_slice(SEP);
        out.extend_from_slice(index.as_bytes());
        KeyBuilder(out)
    }

    /// Append a pre-encoded field.
    pub fn raw(mut self, field: &[u8]) -> Self {
        self.0.extend_from_slice(SEP);
        self.0.extend_from_slice(field);
        self
    }

    pub fn id(self, id: ObjectId) -> Self {
        self.raw(&id.to_be_bytes())
    }

    pub fn u64(self, v: u64) -> Self {
        self.raw(&v.to_be_bytes())
    }

    pub fn name(self, name: Name) -> Self {
        self.raw(&name.as_u64().to_le_bytes())
    }

    pub fn bool(self, v: bool) -> Self {
        self.raw(&[v as u8])
    }

    pub fn time(self, t: TimePointSec) -> Self {
        self.raw(&t.secs().to_be_bytes())
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }

    /// The key so far plus a trailing separator: every key that extends this
    /// one by at least one more field starts with the returned prefix.
    pub fn prefix(mut self) -> Vec<u8> {
        self.0.extend_from_slice(SEP);
        self.0
    }
}

/// Smallest key greater than every key starting with `prefix`, if any.
pub fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut out = prefix.to_vec();
    while let Some(last) = out.pop() {
        if last < u8::MAX {
            out.push(last + 1);
            return Some(out);
        }
    }
    None
}

// ============================================================================
// Field encoders
// ============================================================================

pub fn encode_u128(v: u128) -> [u8; 16] {
    v.to_be_bytes()
}

pub fn encode_u256(v: &U256) -> [u8; 32] {
    v.to_be_bytes()
}

/// Sign-folded big-endian bits of a non-NaN `f64`. `-0.0` encodes as `+0.0`.
pub fn encode_f64(v: f64) -> [u8; 8] {
    let bits = if v == 0.0 { 0 } else { v.to_bits() };
    let folded = if bits >> 63 == 1 {
        !bits
    } else {
        bits | (1u64 << 63)
    };
    folded.to_be_bytes()
}

/// Sign-folded big-endian bits of a non-NaN binary128. Negative zero encodes
/// as positive zero.
pub fn encode_f128(v: Float128) -> [u8; 16] {
    let bits = if v.is_zero() { 0 } else { v.to_bits() };
    let folded = if bits >> 127 == 1 {
        !bits
    } else {
        bits | (1u128 << 127)
    };
    folded.to_be_bytes()
}

// ============================================================================
// Per-kind keys
// ============================================================================

pub fn by_id(object_type: ObjectType, id: ObjectId) -> Vec<u8> {
    KeyBuilder::new(object_type, BY_ID).id(id).build()
}

pub fn next_id(object_type: ObjectType) -> Vec<u8> {
    KeyBuilder::new(object_type, NEXT_ID).build()
}

pub fn account_by_name(name: Name) -> Vec<u8> {
    KeyBuilder::new(ObjectType::Account, BY_NAME).name(name).build()
}

pub fn permission_by_owner(owner: Name, name: Name) -> Vec<u8> {
    KeyBuilder::new(ObjectType::Permission, BY_OWNER)
        .name(owner)
        .name(name)
        .build()
}

pub fn permission_by_parent(parent: ObjectId, id: ObjectId) -> Vec<u8> {
    KeyBuilder::new(ObjectType::Permission, BY_PARENT)
        .id(parent)
        .id(id)
        .build()
}

pub fn permission_children_prefix(parent: ObjectId) -> Vec<u8> {
    KeyBuilder::new(ObjectType::Permission, BY_PARENT)
        .id(parent)
        .prefix()
}

pub fn link_by_action_name(account: Name, code: Name, message_type: Name) -> Vec<u8> {
    KeyBuilder::new(ObjectType::PermissionLink, BY_ACTION_NAME)
        .name(account)
        .name(code)
        .name(message_type)
        .build()
}

pub fn link_by_permission_name(account: Name, permission: Name, id: ObjectId) -> Vec<u8> {
    KeyBuilder::new(ObjectType::PermissionLink, BY_PERMISSION_NAME)
        .name(account)
        .name(permission)
        .id(id)
        .build()
}

pub fn links_by_permission_prefix(account: Name, permission: Name) -> Vec<u8> {
    KeyBuilder::new(ObjectType::PermissionLink, BY_PERMISSION_NAME)
        .name(account)
        .name(permission)
        .prefix()
}

pub fn table_by_code_scope_table(code: Name, scope: Name, table: Name) -> Vec<u8> {
    KeyBuilder::new(ObjectType::Table, BY_CODE_SCOPE_TABLE)
        .name(code)
        .name(scope)
        .name(table)
        .build()
}

pub fn key_value_by_scope_primary(t_id: ObjectId, primary_key: u64) -> Vec<u8> {
    KeyBuilder::new(ObjectType::KeyValue, BY_SCOPE_PRIMARY)
        .id(t_id)
        .u64(primary_key)
        .build()
}

pub fn key_value_table_prefix(t_id: ObjectId) -> Vec<u8> {
    KeyBuilder::new(ObjectType::KeyValue, BY_SCOPE_PRIMARY)
        .id(t_id)
        .prefix()
}

pub fn secondary_by_primary(object_type: ObjectType, t_id: ObjectId, primary_key: u64) -> Vec<u8> {
    KeyBuilder::new(object_type, BY_PRIMARY)
        .id(t_id)
        .u64(primary_key)
        .build()
}

pub fn secondary_by_primary_prefix(object_type: ObjectType, t_id: ObjectId) -> Vec<u8> {
    KeyBuilder::new(object_type, BY_PRIMARY).id(t_id).prefix()
}

pub fn secondary_by_secondary(
    object_type: ObjectType,
    t_id: ObjectId,
    secondary: &[u8],
    primary_key: u64,
) -> Vec<u8> {
    KeyBuilder::new(object_type, BY_SECONDARY)
        .id(t_id)
        .raw(secondary)
        .u64(primary_key)
        .build()
}

pub fn secondary_by_secondary_prefix(object_type: ObjectType, t_id: ObjectId) -> Vec<u8> {
    KeyBuilder::new(object_type, BY_SECONDARY).id(t_id).prefix()
}

/// All rows of one table sharing the secondary key `secondary`.
pub fn secondary_value_prefix(object_type: ObjectType, t_id: ObjectId, secondary: &[u8]) -> Vec<u8> {
    KeyBuilder::new(object_type, BY_SECONDARY)
        .id(t_id)
        .raw(secondary)
        .prefix()
}

pub fn resource_by_owner(object_type: ObjectType, owner: Name) -> Vec<u8> {
    KeyBuilder::new(object_type, BY_OWNER).name(owner).build()
}
