//! Allele - the atomic 2-byte genetic unit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{KittyError, Result};

pub const ALLELE_LEN: usize = 2;

/// A 2-byte allele stored big-endian: `511` is `{1, 255}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Allele([u8; ALLELE_LEN]);

impl Allele {
    pub const MIN: Allele = Allele([0x00, 0x00]);
    pub const MAX: Allele = Allele([0xff, 0xff]);

    pub const fn from_u16(n: u16) -> Self {
        Self(n.to_be_bytes())
    }

    pub const fn to_u16(self) -> u16 {
        u16::from_be_bytes(self.0)
    }

    pub const fn from_bytes(bytes: [u8; ALLELE_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; ALLELE_LEN] {
        &self.0
    }

    /// Parse exactly four hex characters (either case).
    pub fn from_hex(s: &str) -> Result<Self> {
        let len = s.chars().count();
        if len != ALLELE_LEN * 2 {
            return Err(KittyError::InvalidLength {
                expected: ALLELE_LEN * 2,
                actual: len,
            });
        }
        let mut raw = [0u8; ALLELE_LEN];
        hex::decode_to_slice(s, &mut raw)?;
        Ok(Self(raw))
    }

    /// Always four lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn increment(self) -> Self {
        Self::from_u16(self.to_u16().saturating_add(1))
    }

    pub fn decrement(self) -> Self {
        Self::from_u16(self.to_u16().saturating_sub(1))
    }
}

impl From<u16> for Allele {
    fn from(n: u16) -> Self {
        Self::from_u16(n)
    }
}

impl From<Allele> for u16 {
    fn from(a: Allele) -> Self {
        a.to_u16()
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Allele {
    type Err = KittyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Allele {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Allele {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
