//! The five secondary-key kinds of the multi-index engine.

use std::fmt::Debug;

use avm_serde::{StateDecode, StateEncode};
use avm_types::{Float128, SecondaryObject, U256};
use lru::LruCache;

use crate::error::DbError;
use crate::iterator_cache::CachedRow;
use crate::keys::{self, ObjectType};
use crate::session::RowCaches;

/// A fixed-width, totally ordered secondary key.
///
/// `encode_key` must be order-preserving: for valid keys `a < b` iff
/// `encode_key(a) < encode_key(b)` bytewise.
pub trait SecondaryKey:
    Copy + Debug + Default + PartialEq + StateEncode + StateDecode + 'static
{
    const OBJECT_TYPE: ObjectType;

    fn encode_key(&self) -> Vec<u8>;

    /// Reject keys that have no place in a total order.
    fn validate(&self) -> Result<(), DbError> {
        Ok(())
    }

    /// The representative stored for keys that compare equal.
    fn canonical(self) -> Self {
        self
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, SecondaryObject<Self>>;

    fn into_cached_row(row: SecondaryObject<Self>) -> CachedRow;

    fn cached_row(row: &CachedRow) -> Option<&SecondaryObject<Self>>;
}

impl SecondaryKey for u64 {
    const OBJECT_TYPE: ObjectType = ObjectType::Index64;

    fn encode_key(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, SecondaryObject<Self>> {
        &mut caches.idx64
    }

    fn into_cached_row(row: SecondaryObject<Self>) -> CachedRow {
        CachedRow::Index64(row)
    }

    fn cached_row(row: &CachedRow) -> Option<&SecondaryObject<Self>> {
        match row {
            CachedRow::Index64(r) => Some(r),
            _ => None,
        }
    }
}

impl SecondaryKey for u128 {
    const OBJECT_TYPE: ObjectType = ObjectType::Index128;

    fn encode_key(&self) -> Vec<u8> {
        keys::encode_u128(*self).to_vec()
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, SecondaryObject<Self>> {
        &mut caches.idx128
    }

    fn into_cached_row(row: SecondaryObject<Self>) -> CachedRow {
        CachedRow::Index128(row)
    }

    fn cached_row(row: &CachedRow) -> Option<&SecondaryObject<Self>> {
        match row {
            CachedRow::Index128(r) => Some(r),
            _ => None,
        }
    }
}

impl SecondaryKey for U256 {
    const OBJECT_TYPE: ObjectType = ObjectType::Index256;

    fn encode_key(&self) -> Vec<u8> {
        keys::encode_u256(self).to_vec()
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, SecondaryObject<Self>> {
        &mut caches.idx256
    }

    fn into_cached_row(row: SecondaryObject<Self>) -> CachedRow {
        CachedRow::Index256(row)
    }

    fn cached_row(row: &CachedRow) -> Option<&SecondaryObject<Self>> {
        match row {
            CachedRow::Index256(r) => Some(r),
            _ => None,
        }
    }
}

impl SecondaryKey for f64 {
    const OBJECT_TYPE: ObjectType = ObjectType::IndexDouble;

    fn encode_key(&self) -> Vec<u8> {
        keys::encode_f64(*self).to_vec()
    }

    fn validate(&self) -> Result<(), DbError> {
        if self.is_nan() {
            return Err(DbError::InvalidSecondaryKey("NaN is not a valid double key"));
        }
        Ok(())
    }

    fn canonical(self) -> Self {
        if self == 0.0 {
            0.0
        } else {
            self
        }
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, SecondaryObject<Self>> {
        &mut caches.idx_double
    }

    fn into_cached_row(row: SecondaryObject<Self>) -> CachedRow {
        CachedRow::IndexDouble(row)
    }

    fn cached_row(row: &CachedRow) -> Option<&SecondaryObject<Self>> {
        match row {
            CachedRow::IndexDouble(r) => Some(r),
            _ => None,
        }
    }
}

impl SecondaryKey for Float128 {
    const OBJECT_TYPE: ObjectType = ObjectType::IndexLongDouble;

    fn encode_key(&self) -> Vec<u8> {
        keys::encode_f128(*self).to_vec()
    }

    fn validate(&self) -> Result<(), DbError> {
        if self.is_nan() {
            return Err(DbError::InvalidSecondaryKey(
                "NaN is not a valid long double key",
            ));
        }
        Ok(())
    }

    fn canonical(self) -> Self {
        if self.is_zero() {
            Float128::ZERO
        } else {
            self
        }
    }

    fn row_cache(caches: &mut RowCaches) -> &mut LruCache<u64, SecondaryObject<Self>> {
        &mut caches.idx_long_double
    }

    fn into_cached_row(row: SecondaryObject<Self>) -> CachedRow {
        CachedRow::IndexLongDouble(row)
    }

    fn cached_row(row: &CachedRow) -> Option<&SecondaryObject<Self>> {
        match row {
            CachedRow::IndexLongDouble(r) => Some(r),
            _ => None,
        }
    }
}
