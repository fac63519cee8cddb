//! Fixed-width primitives shared by the state objects and the index engine.

use std::fmt;

use serde::{Deserialize, Serialize};

pub type Hash32 = [u8; 32];

/// Row identifier allocated by the object store.
pub type ObjectId = u64;

// ============================================================================
// TimePointSec
// ============================================================================

/// Seconds since the Unix epoch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimePointSec(pub u32);

impl TimePointSec {
    pub const fn new(secs: u32) -> Self {
        TimePointSec(secs)
    }

    pub const fn secs(&self) -> u32 {
        self.0
    }

    pub fn saturating_add(self, secs: u32) -> Self {
        TimePointSec(self.0.saturating_add(secs))
    }
}

impl fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

// ============================================================================
// PublicKey
// ============================================================================

/// A signing key tagged with the id of the signature suite that produced it.
///
/// Ordering is by `(suite_id, bytes)`; authorities require their key lists to
/// be strictly ascending in this order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    pub suite_id: u8,
    pub bytes: Vec<u8>,
}

impl PublicKey {
    pub fn new(suite_id: u8, bytes: impl Into<Vec<u8>>) -> Self {
        PublicKey {
            suite_id,
            bytes: bytes.into(),
        }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PUB_{}_{}", self.suite_id, hex::encode(&self.bytes))
    }
}

// ============================================================================
// U256
// ============================================================================

/// 256-bit unsigned integer stored big-endian, so byte order equals numeric order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct U256(pub [u8; 32]);

impl U256 {
    pub const ZERO: U256 = U256([0u8; 32]);
    pub const MAX: U256 = U256([0xff; 32]);

    /// Build from two 128-bit words, most significant first.
    pub fn from_words(words: [u128; 2]) -> Self {
        let mut out = [0u8; 32];
        out[..16].copy_from_slice(&words[0].to_be_bytes());
        out[16..].copy_from_slice(&words[1].to_be_bytes());
        U256(out)
    }

    pub fn words(&self) -> [u128; 2] {
        let mut hi = [0u8; 16];
        let mut lo = [0u8; 16];
        hi.copy_from_slice(&self.0[..16]);
        lo.copy_from_slice(&self.0[16..]);
        [u128::from_be_bytes(hi), u128::from_be_bytes(lo)]
    }

    pub fn from_u64(v: u64) -> Self {
        U256::from_words([0, v as u128])
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ============================================================================
// Float128
// ============================================================================

const F128_EXP_MASK: u128 = 0x7fff;
const F128_MANT_MASK: u128 = (1u128 << 112) - 1;

/// IEEE-754 binary128 value carried as its raw bit pattern.
///
/// No arithmetic is provided; the index engine only needs the bits for
/// ordering and the NaN/zero classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Float128(pub u128);

impl Float128 {
    pub const ZERO: Float128 = Float128(0);

    pub const fn from_bits(bits: u128) -> Self {
        Float128(bits)
    }

    pub const fn to_bits(&self) -> u128 {
        self.0
    }

    /// Exact widening conversion from binary64.
    pub fn from_f64(v: f64) -> Self {
        let bits = v.to_bits();
        let sign = ((bits >> 63) as u128) << 127;
        let exp = ((bits >> 52) & 0x7ff) as i32;
        let mut mant = bits & ((1u64 << 52) - 1);

        if exp == 0 && mant == 0 {
            return Float128(sign);
        }
        if exp == 0x7ff {
            return Float128(sign | (F128_EXP_MASK << 112) | ((mant as u128) << 60));
        }

        let mut e = exp;
        if exp == 0 {
            // subnormal: normalize into the wider exponent range
            e = 1;
            while mant & (1u64 << 52) == 0 {
                mant <<= 1;
                e -= 1;
            }
            mant &= (1u64 << 52) - 1;
        }
        let exp128 = (e - 1023 + 16383) as u128;
        Float128(sign | (exp128 << 112) | ((mant as u128) << 60))
    }

    pub fn is_sign_negative(&self) -> bool {
        self.0 >> 127 == 1
    }

    pub fn is_nan(&self) -> bool {
        (self.0 >> 112) & F128_EXP_MASK == F128_EXP_MASK && self.0 & F128_MANT_MASK != 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 & !(1u128 << 127) == 0
    }
}

impl From<f64> for Float128 {
    fn from(v: f64) -> Self {
        Float128::from_f64(v)
    }
}

impl fmt::Display for Float128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f128:{:032x}", self.0)
    }
}
