//! Contract table objects: table headers, primary rows and secondary index rows.

use crate::name::Name;
use crate::primitives::{Float128, ObjectId, U256};

/// One logical `(code, scope, table)` instance.
///
/// `count` tracks the live rows of every index kind that reference this table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableObject {
    pub id: ObjectId,
    pub code: Name,
    pub scope: Name,
    pub table: Name,
    pub payer: Name,
    pub count: u32,
}

/// A primary row: the contract's opaque value under a 64-bit primary key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyValueObject {
    pub id: ObjectId,
    pub t_id: ObjectId,
    pub primary_key: u64,
    pub payer: Name,
    pub value: Vec<u8>,
}

/// A secondary index row associating a primary key with a secondary key `K`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SecondaryObject<K> {
    pub id: ObjectId,
    pub t_id: ObjectId,
    pub primary_key: u64,
    pub payer: Name,
    pub secondary_key: K,
}

pub type Index64Object = SecondaryObject<u64>;
pub type Index128Object = SecondaryObject<u128>;
pub type Index256Object = SecondaryObject<U256>;
pub type IndexDoubleObject = SecondaryObject<f64>;
pub type IndexLongDoubleObject = SecondaryObject<Float128>;
