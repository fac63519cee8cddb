//! 64-bit base-32 account, permission, table and action names.
//!
//! A name packs up to 13 characters into a `u64`: the first 12 characters use
//! 5 bits each (most significant first), the 13th uses the remaining 4 bits.
//! The alphabet is `.12345abcdefghijklmnopqrstuvwxyz`, so numeric order of the
//! packed value equals the lexicographic order of the text form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Maximum number of characters in a name.
pub const MAX_NAME_LEN: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name is longer than 13 characters: {0}")]
    TooLong(String),
    #[error("invalid character {ch:?} in name {name:?}")]
    InvalidChar { name: String, ch: char },
    #[error("13th character of name {0:?} must be in [.1-5a-j]")]
    InvalidLastChar(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(pub u64);

const fn char_to_symbol(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as u64 + 6),
        b'1'..=b'5' => Some((c - b'1') as u64 + 1),
        b'.' => Some(0),
        _ => None,
    }
}

impl Name {
    pub const EMPTY: Name = Name(0);

    pub const fn new(value: u64) -> Self {
        Name(value)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Build a name from a string literal at compile time.
    ///
    /// Panics (at const-evaluation time for constants) on malformed input.
    pub const fn from_static(s: &str) -> Self {
        let bytes = s.as_bytes();
        assert!(bytes.len() <= MAX_NAME_LEN, "name too long");

        let mut value: u64 = 0;
        let mut i = 0;
        while i < bytes.len() {
            let sym = match char_to_symbol(bytes[i]) {
                Some(sym) => sym,
                None => panic!("invalid character in name"),
            };
            if i < 12 {
                value |= (sym & 0x1f) << (64 - 5 * (i + 1));
            } else {
                assert!(sym <= 0x0f, "invalid 13th character in name");
                value |= sym & 0x0f;
            }
            i += 1;
        }
        Name(value)
    }

    /// Length of the text form, ignoring trailing dots.
    pub fn len(&self) -> usize {
        self.to_string().len()
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() > MAX_NAME_LEN {
            return Err(NameError::TooLong(s.to_string()));
        }

        let mut value: u64 = 0;
        for (i, &c) in bytes.iter().enumerate() {
            let sym = char_to_symbol(c).ok_or_else(|| NameError::InvalidChar {
                name: s.to_string(),
                ch: c as char,
            })?;
            if i < 12 {
                value |= (sym & 0x1f) << (64 - 5 * (i + 1));
            } else {
                if sym > 0x0f {
                    return Err(NameError::InvalidLastChar(s.to_string()));
                }
                value |= sym & 0x0f;
            }
        }
        Ok(Name(value))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = [b'.'; MAX_NAME_LEN];
        let mut tmp = self.0;
        for i in 0..MAX_NAME_LEN {
            let mask = if i == 0 { 0x0f } else { 0x1f };
            out[MAX_NAME_LEN - 1 - i] = CHARMAP[(tmp & mask) as usize];
            tmp >>= if i == 0 { 4 } else { 5 };
        }
        let end = out.iter().rposition(|&c| c != b'.').map_or(0, |p| p + 1);
        // CHARMAP is ASCII, so this cannot fail.
        f.write_str(std::str::from_utf8(&out[..end]).unwrap_or_default())
    }
}

impl From<u64> for Name {
    fn from(value: u64) -> Self {
        Name(value)
    }
}

impl From<Name> for u64 {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Well-known names
// ============================================================================

/// The privileged system account that owns the native actions.
pub const SYSTEM_ACCOUNT: Name = Name::from_static("eosio");
/// Root permission of every account.
pub const OWNER_PERMISSION: Name = Name::from_static("owner");
/// Default permission required when no link exists.
pub const ACTIVE_PERMISSION: Name = Name::from_static("active");
/// Pseudo-permission meaning "any permission of the account".
pub const ANY_PERMISSION: Name = Name::from_static("eosio.any");
/// Pseudo-permission granted to a contract's own inline actions.
pub const CODE_PERMISSION: Name = Name::from_static("eosio.code");
