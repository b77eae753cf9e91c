//! Allele ranges - per-locus bounds derived from catalog cardinality.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::allele::Allele;
use super::dna::{Dna, DNA_VERSION};
use super::locus::Locus;

/// Inclusive `[min, max]` bound, serialized as hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlleleRange {
    pub min: Allele,
    pub max: Allele,
}

impl AlleleRange {
    pub const FULL: AlleleRange = AlleleRange { min: Allele::MIN, max: Allele::MAX };

    /// Panics in debug builds if `min > max`.
    pub fn new(min: Allele, max: Allele) -> Self {
        debug_assert!(min <= max, "allele range min {} > max {}", min, max);
        Self { min, max }
    }

    /// `[0, count - 1]`, or `None` when there is nothing to select.
    pub fn from_count(count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let max = u16::try_from(count - 1).unwrap_or(u16::MAX);
        Some(Self { min: Allele::MIN, max: Allele::from_u16(max) })
    }

    pub fn contains(&self, allele: Allele) -> bool {
        self.min <= allele && allele <= self.max
    }

    pub fn width(&self) -> usize {
        (self.max.to_u16() as usize).saturating_sub(self.min.to_u16() as usize) + 1
    }

    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Allele {
        let (lo, hi) = (self.min.to_u16(), self.max.to_u16());
        if lo >= hi {
            return self.min;
        }
        Allele::from_u16(rng.gen_range(lo..=hi))
    }
}

/// Valid phenotype bounds for every locus backed by the catalog.
///
/// A locus is absent when its trait category is missing or empty. This is a
/// view recomputed from the catalog, never persisted alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlleleRanges {
    ranges: BTreeMap<Locus, AlleleRange>,
}

impl AlleleRanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, locus: Locus, range: AlleleRange) {
        self.ranges.insert(locus, range);
    }

    pub fn get(&self, locus: Locus) -> Option<&AlleleRange> {
        self.ranges.get(&locus)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Locus, &AlleleRange)> {
        self.ranges.iter().map(|(l, r)| (*l, r))
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Draw a DNA whose every allele lies within its locus range. Reserved
    /// loci span the full allele space; loci without a range stay zeroed.
    pub fn random_dna<R: Rng + ?Sized>(&self, rng: &mut R) -> Dna {
        let mut dna = Dna::new();
        dna.set_version(DNA_VERSION);
        for locus in Locus::ALL {
            let range = if locus.is_reserved() {
                Some(&AlleleRange::FULL)
            } else {
                self.get(locus)
            };
            if let Some(range) = range {
                dna.set_random_genotype(locus, range, rng);
            }
        }
        dna
    }
}
