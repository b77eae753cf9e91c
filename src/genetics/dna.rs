//! DNA - a fixed-length genome of one version byte and twelve genotypes.
//!
//! ```text
//! [                (    0)] DNA version (current: 0)
//! [( 1, 2),( 3, 4),( 5, 6)] breed
//! [( 7, 8),( 9,10),(11,12)] body attribute
//!   ...                     one genotype per Locus, in Locus::ALL order
//! [(67,68),(69,70),(71,72)] reserved B
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::allele::{Allele, ALLELE_LEN};
use super::genotype::{Genotype, GenotypeBreakdown, GENOTYPE_LEN};
use super::locus::{Locus, DNA_VERSION_LEN};
use super::ranges::AlleleRange;
use crate::error::{KittyError, Result};

pub const DNA_LEN: usize = DNA_VERSION_LEN + Locus::ALL.len() * GENOTYPE_LEN;
pub const DNA_HEX_LEN: usize = DNA_LEN * 2;
pub const DNA_VERSION: u8 = 0;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dna([u8; DNA_LEN]);

impl Default for Dna {
    fn default() -> Self {
        Self([0u8; DNA_LEN])
    }
}

impl Dna {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let raw: [u8; DNA_LEN] = raw.try_into().map_err(|_| KittyError::InvalidLength {
            expected: DNA_LEN,
            actual: raw.len(),
        })?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; DNA_LEN] {
        &self.0
    }

    /// Decode a hex string. Length in characters is checked before
    /// content, so any string that is not exactly `DNA_HEX_LEN` characters
    /// long is `InvalidLength`. Phenotype ranges are not checked here.
    pub fn from_hex(s: &str) -> Result<Self> {
        let len = s.chars().count();
        if len != DNA_HEX_LEN {
            return Err(KittyError::InvalidLength {
                expected: DNA_HEX_LEN,
                actual: len,
            });
        }
        let mut raw = [0u8; DNA_LEN];
        hex::decode_to_slice(s, &mut raw)?;
        Ok(Self(raw))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn version(&self) -> u8 {
        self.0[0]
    }

    pub fn set_version(&mut self, version: u8) {
        self.0[0] = version;
    }

    pub fn genotype_bytes(&self, locus: Locus) -> &[u8] {
        let at = locus.offset();
        &self.0[at..at + GENOTYPE_LEN]
    }

    pub fn genotype(&self, locus: Locus) -> Genotype {
        let at = locus.offset();
        let mut raw = [0u8; GENOTYPE_LEN];
        raw.copy_from_slice(&self.0[at..at + GENOTYPE_LEN]);
        Genotype::from_bytes(&raw)
    }

    /// The dominant (last) allele of the locus.
    pub fn phenotype(&self, locus: Locus) -> Allele {
        let at = locus.offset() + GENOTYPE_LEN - ALLELE_LEN;
        Allele::from_bytes([self.0[at], self.0[at + 1]])
    }

    pub fn set_genotype(
        &mut self,
        locus: Locus,
        recessive1: Allele,
        recessive2: Allele,
        dominant: Allele,
    ) {
        let at = locus.offset();
        let g = Genotype::new(recessive1, recessive2, dominant);
        self.0[at..at + GENOTYPE_LEN].copy_from_slice(&g.to_bytes());
    }

    /// Three independent uniform draws from `range`; no ordering is
    /// imposed between the recessive alleles and the dominant one.
    pub fn set_random_genotype<R: Rng + ?Sized>(&mut self, locus: Locus, range: &AlleleRange, rng: &mut R) {
        let r1 = range.random(rng);
        let r2 = range.random(rng);
        let d = range.random(rng);
        self.set_genotype(locus, r1, r2, d);
    }

    pub fn breakdown(&self) -> DnaBreakdown {
        DnaBreakdown {
            version: self.version(),
            genotypes: Locus::ALL
                .iter()
                .map(|&locus| (locus.name().to_string(), self.genotype(locus).breakdown()))
                .collect(),
        }
    }
}

impl fmt::Debug for Dna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dna").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for Dna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Dna {
    type Err = KittyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Dna {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Dna {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Per-locus view of a DNA for inspection output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnaBreakdown {
    pub version: u8,
    pub genotypes: BTreeMap<String, GenotypeBreakdown>,
}
